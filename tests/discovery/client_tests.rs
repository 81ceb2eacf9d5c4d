/*!
Tests for the isahc-backed probe client against real loopback sockets.

A listener that accepts and hangs up is neither an HTTP proxy nor a SOCKS5
proxy, so every fetch through it must fail quickly instead of hanging.
*/

use proxyscout::core::discovery::{
    IsahcProbeClient, ProbeClient, ProbeOutcome, ProtocolProbe, ProxyEndpoint, ProxyScheme,
};
use std::time::{Duration, Instant};

use crate::common::{closed_port, closing_listener, test_config};

const REFERENCE: &str = "http://proxyscout.invalid/generate_204";
const TIMEOUT_MS: u32 = 2000;

#[tokio::test]
async fn test_fetch_via_hangup_is_error_for_both_schemes() {
    let port = closing_listener();
    let client = IsahcProbeClient::new().unwrap();

    for scheme in ProxyScheme::PROBE_ORDER {
        let endpoint = ProxyEndpoint::loopback(scheme, port);
        let start = Instant::now();
        let result = client.fetch_via(&endpoint, REFERENCE, TIMEOUT_MS).await;

        assert!(result.is_err(), "{} fetch should fail: {:?}", scheme, result.map(|r| r.status_code));
        assert!(start.elapsed() < Duration::from_millis(TIMEOUT_MS as u64 + 1000));
    }
}

#[tokio::test]
async fn test_fetch_via_refused_port_is_error() {
    let client = IsahcProbeClient::new().unwrap();
    let endpoint = ProxyEndpoint::loopback(ProxyScheme::Socks5, closed_port());

    let result = client.fetch_via(&endpoint, REFERENCE, TIMEOUT_MS).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_classify_hangup_port_through_real_client() {
    let port = closing_listener();
    let config = test_config(port, port, port);
    let probe = ProtocolProbe::with_client(&config, Box::new(IsahcProbeClient::new().unwrap()));

    let outcome = probe.classify(port, config.probe_timeout_ms).await;
    assert_eq!(outcome, ProbeOutcome::None);
}
