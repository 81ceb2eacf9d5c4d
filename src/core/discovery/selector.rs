//! Proxy Selection
//!
//! Orchestrates [`PortScanner`] and [`ProtocolProbe`] in two modes:
//! - **Fast**: candidates in priority order (preferred port, then the ascending
//!   range); stop at the first port that classifies as usable
//! - **Exhaustive**: every port in the range, both protocols on every open
//!   port, results accumulated per protocol with no short-circuit
//!
//! Both modes are strictly sequential.

use super::config::DiscoveryConfig;
use super::probe::ProtocolProbe;
use super::resolver::{ConfigSource, ProxyUrlResolver, ResolvedSource};
use super::scanner::PortScanner;
use super::types::{
    DiscoveryError, ExhaustiveReport, PortState, ProbeAttempt, ProbeOutcome, ProxyEndpoint,
    ProxyScheme, SelectedProxy,
};
use crate::core::debug_logger::get_debug_logger;
use serde::Serialize;

/// Where the proxy handed to the caller came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProxyOrigin {
    Discovered(ProbeOutcome),
    Configured(ResolvedSource),
}

/// Proxy URL chosen by [`ProxySelector::discover_or_resolve`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyChoice {
    pub url: String,
    pub origin: ProxyOrigin,
}

pub struct ProxySelector {
    config: DiscoveryConfig,
    scanner: PortScanner,
    probe: ProtocolProbe,
}

impl ProxySelector {
    /// Selector with the default probe client
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        config.validate()?;
        let probe = ProtocolProbe::new(&config)?;
        Ok(Self::with_probe(config, probe))
    }

    /// Selector with an injected probe (tests, embedding)
    pub fn with_probe(config: DiscoveryConfig, probe: ProtocolProbe) -> Self {
        let scanner = PortScanner::new(config.host.clone());
        Self {
            config,
            scanner,
            probe,
        }
    }

    /// First usable proxy in priority order, or `None` when every candidate fails
    pub async fn select_fast(&self) -> Option<SelectedProxy> {
        let logger = get_debug_logger();
        let timeout = self.config.connect_timeout();

        for port in self.config.candidate_ports() {
            if self.scanner.check_port(port, timeout).await == PortState::Closed {
                continue;
            }

            let outcome = self.probe.classify(port, self.config.probe_timeout_ms).await;
            if let Some(scheme) = outcome.scheme() {
                let selected = SelectedProxy {
                    endpoint: ProxyEndpoint::new(scheme, self.config.host.clone(), port),
                    outcome,
                };
                logger.selection("fast", Some(&selected.url()));
                return Some(selected);
            }
        }

        logger.selection("fast", None);
        None
    }

    /// Scan the whole range and collect every (port, protocol) pair that works
    pub async fn select_exhaustive(&self) -> ExhaustiveReport {
        let logger = get_debug_logger();
        let mut report = ExhaustiveReport::new(self.config.host.clone());
        let candidates: Vec<u16> = self.config.range_ports().collect();

        let open_ports = self
            .scanner
            .open_ports(&candidates, self.config.connect_timeout())
            .await;

        for &port in &open_ports {
            for scheme in ProxyScheme::PROBE_ORDER {
                let attempt = self
                    .probe
                    .probe_protocol(port, scheme, self.config.probe_timeout_ms)
                    .await;
                if attempt.is_ok() {
                    report.record(scheme, port);
                }
            }
        }
        report.open_ports = open_ports;

        logger.selection(
            "exhaustive",
            report.best().map(|endpoint| endpoint.url()).as_deref(),
        );
        report
    }

    /// Fast-mode discovery, falling back to the configured proxy when nothing
    /// usable is listening locally
    pub async fn discover_or_resolve<S: ConfigSource>(
        &self,
        resolver: &ProxyUrlResolver<S>,
    ) -> ProxyChoice {
        if let Some(selected) = self.select_fast().await {
            return ProxyChoice {
                url: selected.url(),
                origin: ProxyOrigin::Discovered(selected.outcome),
            };
        }

        let resolved = resolver.resolve_detailed();
        ProxyChoice {
            url: resolved.url,
            origin: ProxyOrigin::Configured(resolved.source),
        }
    }

    /// Probe the configured proxy itself instead of scanning local ports
    pub async fn verify_configured<S: ConfigSource>(
        &self,
        resolver: &ProxyUrlResolver<S>,
    ) -> Result<ProbeAttempt, DiscoveryError> {
        let resolved = resolver.resolve_detailed();
        let endpoint = ProxyEndpoint::parse(&resolved.url)?;
        Ok(self
            .probe
            .verify_endpoint(&endpoint, self.config.probe_timeout_ms)
            .await)
    }
}
