//! Local Proxy Discovery Module
//!
//! Finds a usable forward proxy on the local machine without per-run setup:
//! - TCP reachability scan of candidate ports
//! - Behavioral HTTP/SOCKS5 classification through a delegate fetch client
//! - Fast (first usable) and exhaustive (full diagnostic) selection
//! - Configured-proxy resolution from an ordered chain of sources, no I/O

pub mod client;
pub mod config;
pub mod endpoint;
pub mod probe;
pub mod resolver;
pub mod scanner;
pub mod selector;
pub mod types;

// Re-export public API
pub use client::{default_probe_client, ProbeClient, ProbeResponse};
pub use config::{DiscoveryConfig, DEFAULT_PROXY_URL, LOOPBACK_HOST};
pub use endpoint::{parse_proxy_url, EndpointError};
pub use probe::ProtocolProbe;
pub use resolver::{
    ConfigSource, EnvSource, MapSource, ProxyUrlResolver, ResolvedProxy, ResolvedSource,
    RESOLUTION_CHAIN,
};
pub use scanner::PortScanner;
pub use selector::{ProxyChoice, ProxyOrigin, ProxySelector};
pub use types::*;

// Re-export client implementations conditionally
#[cfg(feature = "probe-client")]
pub use client::IsahcProbeClient;

#[cfg(not(feature = "probe-client"))]
pub use client::UnavailableProbeClient;
