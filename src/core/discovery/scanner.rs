//! TCP reachability checks for candidate proxy ports.

use super::config::LOOPBACK_HOST;
use super::types::PortState;
use crate::core::debug_logger::get_debug_logger;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Connects to candidate ports one at a time and reports which are listening
pub struct PortScanner {
    host: String,
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new(LOOPBACK_HOST)
    }
}

impl PortScanner {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Single bounded connect; the socket is dropped as soon as it opens.
    pub async fn check_port(&self, port: u16, timeout: Duration) -> PortState {
        let start = Instant::now();
        let connect = TcpStream::connect((self.host.as_str(), port));

        let state = match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(_stream)) => PortState::Open,
            Ok(Err(_)) | Err(_) => PortState::Closed,
        };

        get_debug_logger().scan_port(port, state, start.elapsed().as_millis() as u64);
        state
    }

    /// Ports from `candidates` that accepted a connection, in candidate order
    pub async fn open_ports(&self, candidates: &[u16], timeout: Duration) -> Vec<u16> {
        let mut open = Vec::new();
        for &port in candidates {
            if self.check_port(port, timeout).await == PortState::Open {
                open.push(port);
            }
        }
        open
    }
}
