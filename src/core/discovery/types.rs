// Core types for local proxy discovery
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv6Addr;

/// Forward-proxy protocol a local port can speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyScheme {
    Http,
    Socks5,
}

impl ProxyScheme {
    /// Probe order used by classification: HTTP first, then SOCKS5
    pub const PROBE_ORDER: [ProxyScheme; 2] = [ProxyScheme::Http, ProxyScheme::Socks5];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification result for a single port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    /// Port relayed the reference fetch as an HTTP forward proxy
    HttpOk,
    /// Port relayed the reference fetch as a SOCKS5 proxy
    Socks5Ok,
    /// Neither protocol worked
    None,
}

impl ProbeOutcome {
    pub fn from_scheme(scheme: ProxyScheme) -> Self {
        match scheme {
            ProxyScheme::Http => ProbeOutcome::HttpOk,
            ProxyScheme::Socks5 => ProbeOutcome::Socks5Ok,
        }
    }

    pub fn scheme(&self) -> Option<ProxyScheme> {
        match self {
            ProbeOutcome::HttpOk => Some(ProxyScheme::Http),
            ProbeOutcome::Socks5Ok => Some(ProxyScheme::Socks5),
            ProbeOutcome::None => None,
        }
    }
}

/// TCP reachability of a candidate port.
///
/// Refused, unreachable and timed-out connects all map to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
}

/// A (scheme, host, port) proxy address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub scheme: ProxyScheme,
    pub host: String,
    pub port: u16,
}

impl ProxyEndpoint {
    pub fn new(scheme: ProxyScheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into(),
            port,
        }
    }

    /// Endpoint on the IPv4 loopback address
    pub fn loopback(scheme: ProxyScheme, port: u16) -> Self {
        Self::new(scheme, super::config::LOOPBACK_HOST, port)
    }

    /// `host:port`, with IPv6 literals bracketed
    pub fn authority(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Render as `scheme://host:port`
    pub fn url(&self) -> String {
        format!("{}://{}", self.scheme, self.authority())
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// Coarse probe failure; the reason is kept for logs only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub reason: String,
}

impl ProbeFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Result of driving one reference fetch through one endpoint
#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    pub endpoint: ProxyEndpoint,
    /// HTTP status of the reference resource on success
    pub result: Result<u16, ProbeFailure>,
    pub elapsed_ms: u64,
}

impl ProbeAttempt {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fast-mode winner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedProxy {
    pub endpoint: ProxyEndpoint,
    pub outcome: ProbeOutcome,
}

impl SelectedProxy {
    pub fn url(&self) -> String {
        self.endpoint.url()
    }
}

/// Full-range diagnostic result of exhaustive mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExhaustiveReport {
    pub host: String,
    /// Ports that accepted a TCP connection, in scan order
    pub open_ports: Vec<u16>,
    pub http_ports: BTreeSet<u16>,
    pub socks5_ports: BTreeSet<u16>,
}

impl ExhaustiveReport {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.http_ports.is_empty() && self.socks5_ports.is_empty()
    }

    pub fn record(&mut self, scheme: ProxyScheme, port: u16) {
        match scheme {
            ProxyScheme::Http => self.http_ports.insert(port),
            ProxyScheme::Socks5 => self.socks5_ports.insert(port),
        };
    }

    pub fn endpoints(&self, scheme: ProxyScheme) -> Vec<ProxyEndpoint> {
        let ports = match scheme {
            ProxyScheme::Http => &self.http_ports,
            ProxyScheme::Socks5 => &self.socks5_ports,
        };
        ports
            .iter()
            .map(|port| ProxyEndpoint::new(scheme, self.host.clone(), *port))
            .collect()
    }

    /// Lowest HTTP port, else lowest SOCKS5 port
    pub fn best(&self) -> Option<ProxyEndpoint> {
        ProxyScheme::PROBE_ORDER
            .iter()
            .find_map(|scheme| self.endpoints(*scheme).into_iter().next())
    }
}

/// Errors raised at the edges of the engine (configuration, client setup).
///
/// Scan and probe failures never surface here; they degrade to
/// `PortState::Closed` and `ProbeOutcome::None`.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Invalid discovery configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid proxy endpoint: {0}")]
    InvalidEndpoint(#[from] super::endpoint::EndpointError),
    #[error("Failed to read config file: {0}")]
    ConfigFile(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Failed to create probe client: {0}")]
    ClientInit(String),
}
