//! Common test utilities: mock probe client, loopback listeners, env isolation

use proxyscout::core::discovery::{
    DiscoveryConfig, ProbeClient, ProbeResponse, ProxyEndpoint, ProxyScheme, RESOLUTION_CHAIN,
};
use std::collections::HashMap;
use std::env;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

/// Probe client returning canned results per (scheme, port); unknown pairs fail
#[derive(Default)]
pub struct MockProbeClient {
    responses: HashMap<(ProxyScheme, u16), Result<u16, String>>,
    calls: Arc<Mutex<Vec<(ProxyScheme, u16)>>>,
}

impl MockProbeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference fetch through `scheme://127.0.0.1:port` returns `status`
    pub fn respond(mut self, scheme: ProxyScheme, port: u16, status: u16) -> Self {
        self.responses.insert((scheme, port), Ok(status));
        self
    }

    pub fn fail(mut self, scheme: ProxyScheme, port: u16, error: &str) -> Self {
        self.responses.insert((scheme, port), Err(error.to_string()));
        self
    }

    /// Shared view of every (scheme, port) fetched, in call order
    pub fn call_log(&self) -> Arc<Mutex<Vec<(ProxyScheme, u16)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl ProbeClient for MockProbeClient {
    async fn fetch_via(
        &self,
        proxy: &ProxyEndpoint,
        _resource: &str,
        _timeout_ms: u32,
    ) -> Result<ProbeResponse, String> {
        self.calls.lock().unwrap().push((proxy.scheme, proxy.port));
        self.responses
            .get(&(proxy.scheme, proxy.port))
            .cloned()
            .unwrap_or_else(|| Err("connection refused by mock".to_string()))
            .map(|status_code| ProbeResponse { status_code })
    }
}

/// Listener on an ephemeral loopback port; the port stays open while it lives
pub fn open_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A loopback port nothing listens on
pub fn closed_port() -> u16 {
    let (listener, port) = open_listener();
    drop(listener);
    port
}

/// Loopback port that accepts every connection and closes it immediately
#[cfg(feature = "probe-client")]
pub fn closing_listener() -> u16 {
    let (listener, port) = open_listener();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            drop(stream);
        }
    });
    port
}

/// `count` listeners on consecutive loopback ports
pub fn consecutive_listeners(count: u16) -> Vec<TcpListener> {
    for _ in 0..100 {
        let (first, start) = open_listener();
        if start > u16::MAX - count {
            continue;
        }
        let mut listeners = vec![first];
        for offset in 1..count {
            match TcpListener::bind(("127.0.0.1", start + offset)) {
                Ok(listener) => listeners.push(listener),
                Err(_) => break,
            }
        }
        if listeners.len() == count as usize {
            return listeners;
        }
    }
    panic!("could not bind {} consecutive loopback ports", count);
}

pub fn port_of(listener: &TcpListener) -> u16 {
    listener.local_addr().unwrap().port()
}

/// Config tuned for tests: short timeouts, caller-chosen ports
pub fn test_config(preferred_port: u16, range_start: u16, range_end: u16) -> DiscoveryConfig {
    DiscoveryConfig {
        preferred_port,
        range_start,
        range_end,
        connect_timeout_ms: 300,
        probe_timeout_ms: 300,
        ..DiscoveryConfig::default()
    }
}

/// Clears every resolution-chain variable and restores them on drop
pub struct IsolatedEnv {
    saved: Vec<(String, Option<String>)>,
}

impl IsolatedEnv {
    pub fn new() -> Self {
        let mut saved = Vec::new();
        for key in RESOLUTION_CHAIN {
            for name in [key.to_string(), key.to_lowercase()] {
                saved.push((name.clone(), env::var(&name).ok()));
                env::remove_var(&name);
            }
        }
        Self { saved }
    }

    pub fn set(&self, key: &str, value: &str) {
        env::set_var(key, value);
    }
}

impl Drop for IsolatedEnv {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }
    }
}
