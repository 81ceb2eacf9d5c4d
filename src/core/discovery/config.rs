//! Discovery Configuration
//!
//! Ports, timeouts and the reference resource used by the scanner and the
//! protocol probe. Every field has a documented default; a TOML file only
//! needs to name the fields it overrides.

use super::types::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Loopback address every discovered endpoint lives on
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// Endpoint returned by the resolver when no source is configured
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:10808";

/// Local proxy discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Host probed for listening proxies
    /// Default: 127.0.0.1
    pub host: String,

    /// Port tried before the range in fast mode
    /// Default: 10808
    pub preferred_port: u16,

    /// First port of the scan range (inclusive)
    /// Default: 1081
    pub range_start: u16,

    /// Last port of the scan range (inclusive)
    /// Default: 1088
    pub range_end: u16,

    /// TCP connect timeout per candidate port
    /// Default: 1500ms
    pub connect_timeout_ms: u32,

    /// Socket timeout for one reference fetch through a candidate proxy
    /// Default: 5000ms
    pub probe_timeout_ms: u32,

    /// Fetch attempts per protocol per port
    /// Default: 1
    pub probe_attempts: u32,

    /// Always-reachable resource fetched through each candidate
    pub reference_url: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            host: LOOPBACK_HOST.to_string(),
            preferred_port: 10808,
            range_start: 1081,
            range_end: 1088,
            connect_timeout_ms: 1500,
            probe_timeout_ms: 5000,
            probe_attempts: 1,
            reference_url: "https://www.google.com/generate_204".to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Shorter timeouts for interactive startup on a fast local machine
    pub fn quick() -> Self {
        Self {
            connect_timeout_ms: 500,
            probe_timeout_ms: 3000,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, DiscoveryError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.host.trim().is_empty() {
            return Err(DiscoveryError::InvalidConfig("host must not be empty".into()));
        }
        if self.preferred_port == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "preferred_port must be positive".into(),
            ));
        }
        if self.range_start == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "range_start must be positive".into(),
            ));
        }
        if self.range_start > self.range_end {
            return Err(DiscoveryError::InvalidConfig(format!(
                "range_start {} is greater than range_end {}",
                self.range_start, self.range_end
            )));
        }
        if self.connect_timeout_ms == 0 || self.probe_timeout_ms == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "timeouts must be positive".into(),
            ));
        }
        if self.probe_attempts == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "probe_attempts must be at least 1".into(),
            ));
        }
        url::Url::parse(&self.reference_url).map_err(|e| {
            DiscoveryError::InvalidConfig(format!(
                "reference_url {:?} is not a valid URL: {}",
                self.reference_url, e
            ))
        })?;
        Ok(())
    }

    /// Fast-mode candidates: preferred port, then the ascending range, no duplicates
    pub fn candidate_ports(&self) -> Vec<u16> {
        let mut ports = vec![self.preferred_port];
        ports.extend(self.range_ports().filter(|p| *p != self.preferred_port));
        ports
    }

    /// Exhaustive-mode candidates: the range only
    pub fn range_ports(&self) -> impl Iterator<Item = u16> {
        self.range_start..=self.range_end
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms as u64)
    }
}
