//! Proxy URL Parsing
//!
//! Turns configured proxy strings (`http://host:port`, `socks5h://host`,
//! bare `host:port`) into a typed [`ProxyEndpoint`].

use super::types::{ProxyEndpoint, ProxyScheme};
use url::Url;

const DEFAULT_HTTP_PROXY_PORT: u16 = 80;
const DEFAULT_SOCKS_PROXY_PORT: u16 = 1080;

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid URL format: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Missing host in URL")]
    MissingHost,
    #[error("Unsupported proxy scheme: {0}")]
    UnsupportedScheme(String),
}

/// Parse a proxy URL into an endpoint
///
/// # Examples
/// - `http://10.0.0.5:8080` → http, 10.0.0.5, 8080
/// - `socks5h://127.0.0.1:1086` → socks5, 127.0.0.1, 1086
/// - `127.0.0.1:10808` → http, 127.0.0.1, 10808 (scheme defaults to http)
/// - `socks5://proxy.lan` → socks5, proxy.lan, 1080
///
/// `https://` proxies are treated as HTTP forward proxies since the engine
/// only distinguishes HTTP-style from SOCKS5-style relays.
pub fn parse_proxy_url(raw: &str) -> Result<ProxyEndpoint, EndpointError> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)?;

    let scheme = match url.scheme().to_ascii_lowercase().as_str() {
        "http" | "https" => ProxyScheme::Http,
        "socks5" | "socks5h" => ProxyScheme::Socks5,
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };

    let host = match url.host() {
        Some(url::Host::Ipv6(addr)) => addr.to_string(),
        Some(host) => host.to_string(),
        None => return Err(EndpointError::MissingHost),
    };
    if host.is_empty() {
        return Err(EndpointError::MissingHost);
    }

    let port = url.port_or_known_default().unwrap_or(match scheme {
        ProxyScheme::Http => DEFAULT_HTTP_PROXY_PORT,
        ProxyScheme::Socks5 => DEFAULT_SOCKS_PROXY_PORT,
    });

    Ok(ProxyEndpoint::new(scheme, host, port))
}

impl ProxyEndpoint {
    /// See [`parse_proxy_url`]
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        parse_proxy_url(raw)
    }
}
