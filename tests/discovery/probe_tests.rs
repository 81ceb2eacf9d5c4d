/*!
Tests for protocol classification.

The delegate client is mocked per (scheme, port); classification must try
HTTP before SOCKS5, stop at the first success and collapse every failure
into `ProbeOutcome::None`.
*/

use proxyscout::core::discovery::{
    DiscoveryConfig, ProbeOutcome, ProtocolProbe, ProxyEndpoint, ProxyScheme,
};

use crate::common::MockProbeClient;

fn probe_with(client: MockProbeClient) -> ProtocolProbe {
    ProtocolProbe::with_client(&DiscoveryConfig::default(), Box::new(client))
}

#[tokio::test]
async fn test_classify_http_proxy() {
    let client = MockProbeClient::new().respond(ProxyScheme::Http, 10808, 204);
    let calls = client.call_log();
    let probe = probe_with(client);

    assert_eq!(probe.classify(10808, 500).await, ProbeOutcome::HttpOk);
    // SOCKS5 is never attempted once HTTP succeeds
    assert_eq!(*calls.lock().unwrap(), vec![(ProxyScheme::Http, 10808)]);
}

#[tokio::test]
async fn test_classify_socks5_after_http_failure() {
    let client = MockProbeClient::new()
        .fail(ProxyScheme::Http, 1083, "Empty reply from server")
        .respond(ProxyScheme::Socks5, 1083, 204);
    let calls = client.call_log();
    let probe = probe_with(client);

    assert_eq!(probe.classify(1083, 500).await, ProbeOutcome::Socks5Ok);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![(ProxyScheme::Http, 1083), (ProxyScheme::Socks5, 1083)]
    );
}

#[tokio::test]
async fn test_classify_none_when_both_fail() {
    let probe = probe_with(MockProbeClient::new());
    assert_eq!(probe.classify(1085, 500).await, ProbeOutcome::None);
}

#[tokio::test]
async fn test_both_protocols_working_reports_http_only() {
    let client = MockProbeClient::new()
        .respond(ProxyScheme::Http, 7890, 204)
        .respond(ProxyScheme::Socks5, 7890, 204);
    let probe = probe_with(client);

    assert_eq!(probe.classify(7890, 500).await, ProbeOutcome::HttpOk);
}

#[tokio::test]
async fn test_error_status_counts_as_failure() {
    // A web server that is not a proxy answers the request line itself
    let client = MockProbeClient::new()
        .respond(ProxyScheme::Http, 1084, 404)
        .respond(ProxyScheme::Socks5, 1084, 502);
    let probe = probe_with(client);

    assert_eq!(probe.classify(1084, 500).await, ProbeOutcome::None);
}

#[tokio::test]
async fn test_probe_protocol_reports_failure_reason() {
    let client = MockProbeClient::new().fail(ProxyScheme::Socks5, 1086, "SOCKS handshake failed");
    let probe = probe_with(client);

    let attempt = probe.probe_protocol(1086, ProxyScheme::Socks5, 500).await;
    assert!(!attempt.is_ok());
    assert_eq!(attempt.endpoint.url(), "socks5://127.0.0.1:1086");
    assert_eq!(attempt.result.unwrap_err().reason, "SOCKS handshake failed");
}

#[tokio::test]
async fn test_attempt_budget_is_respected() {
    let config = DiscoveryConfig {
        probe_attempts: 3,
        ..DiscoveryConfig::default()
    };
    let client = MockProbeClient::new();
    let calls = client.call_log();
    let probe = ProtocolProbe::with_client(&config, Box::new(client));

    let attempt = probe.probe_protocol(1082, ProxyScheme::Http, 500).await;
    assert!(!attempt.is_ok());
    assert_eq!(calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_default_budget_is_single_attempt() {
    let client = MockProbeClient::new();
    let calls = client.call_log();
    let probe = probe_with(client);

    probe.classify(1082, 500).await;
    // one HTTP fetch, one SOCKS5 fetch
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_verify_configured_endpoint() {
    let client = MockProbeClient::new().respond(ProxyScheme::Http, 8080, 200);
    let probe = probe_with(client);

    let endpoint = ProxyEndpoint::parse("http://127.0.0.1:8080").unwrap();
    let attempt = probe.verify_endpoint(&endpoint, 500).await;
    assert_eq!(attempt.result, Ok(200));
}
