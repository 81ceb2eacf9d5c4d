//! Configured proxy resolution
//!
//! Resolves the proxy endpoint from configuration alone, with no network I/O.
//! Sources are consulted in a fixed priority order (highest first):
//!
//! 1. `PROXYSCOUT_PROXY` - explicit override
//! 2. `HTTPS_PROXY` - secure-traffic proxy
//! 3. `HTTP_PROXY` - generic proxy
//! 4. `ALL_PROXY` - catch-all proxy
//! 5. `SOCKS_PROXY` - SOCKS-specific proxy
//!
//! Each key is looked up upper-case first, then lower-case. Empty or
//! whitespace-only values count as absent. When nothing is set the default
//! `http://127.0.0.1:10808` is returned.

use super::config::DEFAULT_PROXY_URL;
use crate::core::debug_logger::get_debug_logger;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::env;

/// Resolution chain, highest priority first
pub const RESOLUTION_CHAIN: [&str; 5] = [
    "PROXYSCOUT_PROXY",
    "HTTPS_PROXY",
    "HTTP_PROXY",
    "ALL_PROXY",
    "SOCKS_PROXY",
];

/// Named key/value lookups the resolver reads from
pub trait ConfigSource {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// In-memory source for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl ConfigSource for MapSource {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Which link of the chain produced the value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResolvedSource {
    /// The key actually read, in the case it was found (`HTTPS_PROXY` or `https_proxy`)
    Key(String),
    /// No source configured
    Default,
}

impl std::fmt::Display for ResolvedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedSource::Key(key) => write!(f, "{}", key),
            ResolvedSource::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProxy {
    pub url: String,
    pub source: ResolvedSource,
}

pub struct ProxyUrlResolver<S: ConfigSource = EnvSource> {
    source: S,
}

impl ProxyUrlResolver<EnvSource> {
    /// Resolver over the process environment
    pub fn from_env() -> Self {
        Self::new(EnvSource)
    }
}

impl<S: ConfigSource> ProxyUrlResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// First present, non-empty value in the chain, else the default
    pub fn resolve(&self) -> String {
        self.resolve_detailed().url
    }

    pub fn resolve_detailed(&self) -> ResolvedProxy {
        let resolved = self.first_configured().unwrap_or_else(|| ResolvedProxy {
            url: DEFAULT_PROXY_URL.to_string(),
            source: ResolvedSource::Default,
        });
        get_debug_logger().resolver_source(&resolved.source.to_string(), &resolved.url);
        resolved
    }

    /// Same proxy for both plain and secure traffic
    pub fn derive_client_proxy_map(&self) -> BTreeMap<String, String> {
        let url = self.resolve();
        let mut map = BTreeMap::new();
        map.insert("http".to_string(), url.clone());
        map.insert("https".to_string(), url);
        map
    }

    fn first_configured(&self) -> Option<ResolvedProxy> {
        RESOLUTION_CHAIN.iter().find_map(|key| {
            [key.to_string(), key.to_lowercase()]
                .into_iter()
                .find_map(|name| {
                    self.source
                        .lookup(&name)
                        .filter(|value| !value.trim().is_empty())
                        .map(|url| ResolvedProxy {
                            url,
                            source: ResolvedSource::Key(name),
                        })
                })
        })
    }
}
