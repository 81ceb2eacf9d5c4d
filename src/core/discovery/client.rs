//! Probe Client Implementations
//!
//! The engine never speaks HTTP-proxy or SOCKS5 itself. It hands a proxy
//! endpoint and a resource URL to a [`ProbeClient`], which performs the real
//! fetch and reports whether a response came back.

use super::types::{DiscoveryError, ProxyEndpoint};

#[cfg(feature = "probe-client")]
use super::types::ProxyScheme;
#[cfg(feature = "probe-client")]
use isahc::config::{Configurable, RedirectPolicy};
#[cfg(feature = "probe-client")]
use isahc::{AsyncReadResponseExt, HttpClient, Request};
#[cfg(feature = "probe-client")]
use std::time::Duration;

/// Response metadata from a fetch relayed through a proxy
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// HTTP status code of the reference resource
    pub status_code: u16,
}

/// Delegate client that fetches a resource through a given proxy
#[async_trait::async_trait]
pub trait ProbeClient: Send + Sync {
    /// Fetch `resource` routed through `proxy`
    ///
    /// # Returns
    /// * `Ok(ProbeResponse)` - A response was obtained through the proxy
    /// * `Err(String)` - Any transport, handshake or protocol failure
    ///
    /// # Implementation Requirements
    /// * Must route the request through `proxy` using `proxy.scheme`
    /// * Must not fall back to a direct connection
    /// * Must give up after `timeout_ms`
    async fn fetch_via(
        &self,
        proxy: &ProxyEndpoint,
        resource: &str,
        timeout_ms: u32,
    ) -> Result<ProbeResponse, String>;
}

/// Production probe client backed by isahc (libcurl)
#[cfg(feature = "probe-client")]
pub struct IsahcProbeClient {
    client: HttpClient,
}

#[cfg(feature = "probe-client")]
impl IsahcProbeClient {
    pub fn new() -> Result<Self, DiscoveryError> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::None)
            .build()
            .map_err(|e| DiscoveryError::ClientInit(e.to_string()))?;
        Ok(Self { client })
    }

    /// curl proxy URI for an endpoint; SOCKS5 uses `socks5h` so name
    /// resolution happens on the proxy side
    fn proxy_uri(proxy: &ProxyEndpoint) -> Result<isahc::http::Uri, String> {
        let scheme = match proxy.scheme {
            ProxyScheme::Http => "http",
            ProxyScheme::Socks5 => "socks5h",
        };
        format!("{}://{}", scheme, proxy.authority())
            .parse::<isahc::http::Uri>()
            .map_err(|e| format!("Invalid proxy URI: {}", e))
    }
}

#[cfg(feature = "probe-client")]
#[async_trait::async_trait]
impl ProbeClient for IsahcProbeClient {
    async fn fetch_via(
        &self,
        proxy: &ProxyEndpoint,
        resource: &str,
        timeout_ms: u32,
    ) -> Result<ProbeResponse, String> {
        let timeout = Duration::from_millis(timeout_ms as u64);

        let request = Request::get(resource)
            .proxy(Some(Self::proxy_uri(proxy)?))
            .timeout(timeout)
            .connect_timeout(timeout)
            .header(
                "User-Agent",
                format!("proxyscout/{}", env!("CARGO_PKG_VERSION")),
            )
            .body(Vec::new())
            .map_err(|e| format!("Probe request creation failed: {}", e))?;

        let mut response = self
            .client
            .send_async(request)
            .await
            .map_err(|e| format!("Probe request failed: {}", e))?;

        let status_code = response.status().as_u16();

        // Drain the body so the transfer completes through the proxy
        response
            .consume()
            .await
            .map_err(|e| format!("Failed to read probe response: {}", e))?;

        Ok(ProbeResponse { status_code })
    }
}

/// Stand-in when the `probe-client` feature is disabled; every fetch fails
#[cfg(not(feature = "probe-client"))]
#[derive(Default)]
pub struct UnavailableProbeClient;

#[cfg(not(feature = "probe-client"))]
impl UnavailableProbeClient {
    pub fn new() -> Result<Self, DiscoveryError> {
        Ok(Self)
    }
}

#[cfg(not(feature = "probe-client"))]
#[async_trait::async_trait]
impl ProbeClient for UnavailableProbeClient {
    async fn fetch_via(
        &self,
        _proxy: &ProxyEndpoint,
        _resource: &str,
        _timeout_ms: u32,
    ) -> Result<ProbeResponse, String> {
        Err("probe client unavailable (built without probe-client feature)".to_string())
    }
}

/// Default delegate for the current build
pub fn default_probe_client() -> Result<Box<dyn ProbeClient>, DiscoveryError> {
    #[cfg(feature = "probe-client")]
    let client: Box<dyn ProbeClient> = Box::new(IsahcProbeClient::new()?);
    #[cfg(not(feature = "probe-client"))]
    let client: Box<dyn ProbeClient> = Box::new(UnavailableProbeClient::new()?);
    Ok(client)
}
