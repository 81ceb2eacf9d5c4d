use clap::Parser;
use std::path::PathBuf;

use crate::core::discovery::{DiscoveryConfig, DiscoveryError};

#[derive(Parser, Debug)]
#[command(name = "proxyscout")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Find a usable local HTTP or SOCKS5 forward proxy")]
pub struct Cli {
    /// Scan the whole range and report every working proxy
    #[arg(short = 'a', long = "all", conflicts_with = "resolve")]
    pub all: bool,

    /// Skip discovery and print the configured proxy
    #[arg(short = 'r', long = "resolve")]
    pub resolve: bool,

    /// With --resolve, also route a reference fetch through the configured proxy
    #[arg(long = "verify", requires = "resolve")]
    pub verify: bool,

    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// TOML file with discovery settings
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port tried before the range
    #[arg(long = "preferred-port", value_name = "PORT")]
    pub preferred_port: Option<u16>,

    /// Inclusive scan range, e.g. 1081-1088
    #[arg(long = "range", value_name = "START-END", value_parser = parse_port_range)]
    pub range: Option<PortRange>,

    /// TCP connect timeout per port in milliseconds
    #[arg(long = "connect-timeout-ms", value_name = "MS")]
    pub connect_timeout_ms: Option<u32>,

    /// Socket timeout per protocol probe in milliseconds
    #[arg(long = "probe-timeout-ms", value_name = "MS")]
    pub probe_timeout_ms: Option<u32>,

    /// Resource fetched through each candidate proxy
    #[arg(long = "reference-url", value_name = "URL")]
    pub reference_url: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Config file (or defaults) with command-line overrides applied
    pub fn discovery_config(&self) -> Result<DiscoveryConfig, DiscoveryError> {
        let mut config = match &self.config {
            Some(path) => DiscoveryConfig::load(path)?,
            None => DiscoveryConfig::default(),
        };

        if let Some(port) = self.preferred_port {
            config.preferred_port = port;
        }
        if let Some(range) = &self.range {
            config.range_start = range.start;
            config.range_end = range.end;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = ms;
        }
        if let Some(ms) = self.probe_timeout_ms {
            config.probe_timeout_ms = ms;
        }
        if let Some(url) = &self.reference_url {
            config.reference_url = url.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Inclusive `START-END` port range argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

fn parse_port_range(value: &str) -> Result<PortRange, String> {
    let (start, end) = value
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got {:?}", value))?;
    let start: u16 = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid range start: {}", e))?;
    let end: u16 = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid range end: {}", e))?;
    Ok(PortRange { start, end })
}
