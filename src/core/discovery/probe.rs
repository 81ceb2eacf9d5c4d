//! Protocol Classification
//!
//! Decides whether a listening local port is an HTTP forward proxy, a SOCKS5
//! proxy, or neither, by routing a real fetch of the reference resource
//! through it:
//! - HTTP is always attempted first; the first protocol that relays the fetch wins
//! - Each protocol gets a fixed attempt budget with a short socket timeout
//! - Every failure cause collapses into [`ProbeFailure`]; callers only see
//!   [`ProbeOutcome::None`]

use super::client::{default_probe_client, ProbeClient};
use super::config::DiscoveryConfig;
use super::types::{
    DiscoveryError, ProbeAttempt, ProbeFailure, ProbeOutcome, ProxyEndpoint, ProxyScheme,
};
use crate::core::debug_logger::get_debug_logger;
use std::time::Instant;

/// Drives the delegate client to classify ports
pub struct ProtocolProbe {
    client: Box<dyn ProbeClient>,
    host: String,
    reference_url: String,
    attempts: u32,
}

impl ProtocolProbe {
    /// Probe using the build's default client (isahc when available)
    pub fn new(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        Ok(Self::with_client(config, default_probe_client()?))
    }

    /// Probe with an injected client
    pub fn with_client(config: &DiscoveryConfig, client: Box<dyn ProbeClient>) -> Self {
        Self {
            client,
            host: config.host.clone(),
            reference_url: config.reference_url.clone(),
            attempts: config.probe_attempts.max(1),
        }
    }

    /// Classify `port`: HTTP first, then SOCKS5, first success wins
    pub async fn classify(&self, port: u16, probe_timeout_ms: u32) -> ProbeOutcome {
        for scheme in ProxyScheme::PROBE_ORDER {
            if self.probe_protocol(port, scheme, probe_timeout_ms).await.is_ok() {
                return ProbeOutcome::from_scheme(scheme);
            }
        }
        ProbeOutcome::None
    }

    /// Run the reference fetch through `port` speaking `scheme` only
    pub async fn probe_protocol(
        &self,
        port: u16,
        scheme: ProxyScheme,
        probe_timeout_ms: u32,
    ) -> ProbeAttempt {
        let endpoint = ProxyEndpoint::new(scheme, self.host.clone(), port);
        self.verify_endpoint(&endpoint, probe_timeout_ms).await
    }

    /// Check an arbitrary endpoint, e.g. one resolved from configuration
    pub async fn verify_endpoint(
        &self,
        endpoint: &ProxyEndpoint,
        probe_timeout_ms: u32,
    ) -> ProbeAttempt {
        let start = Instant::now();
        let mut last_failure = ProbeFailure::new("no attempt made");

        for _ in 0..self.attempts {
            match self
                .client
                .fetch_via(endpoint, &self.reference_url, probe_timeout_ms)
                .await
            {
                Ok(response) if is_relayed_status(response.status_code) => {
                    let attempt = ProbeAttempt {
                        endpoint: endpoint.clone(),
                        result: Ok(response.status_code),
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    };
                    get_debug_logger().probe_result(&attempt);
                    return attempt;
                }
                Ok(response) => {
                    last_failure =
                        ProbeFailure::new(format!("status {}", response.status_code));
                }
                Err(e) => {
                    last_failure = ProbeFailure::new(e);
                }
            }
        }

        let attempt = ProbeAttempt {
            endpoint: endpoint.clone(),
            result: Err(last_failure),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        get_debug_logger().probe_result(&attempt);
        attempt
    }
}

/// A 2xx/3xx answer for the reference resource means the proxy relayed it.
/// 4xx/5xx typically come from the proxy itself (407, 502, 503) or from a
/// plain web server answering the proxied request line.
fn is_relayed_status(status: u16) -> bool {
    (200..400).contains(&status)
}
