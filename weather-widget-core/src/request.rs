//! Upstream URL construction, including optional CORS relay rewriting.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::form_urlencoded;

use crate::config::WeatherConfig;

/// Base used when requests go through the same-origin development proxy.
pub const PROXY_BASE_URL: &str = "/api/data/2.5";

/// Placeholder a relay template may contain for the encoded upstream URL.
pub const RELAY_PLACEHOLDER: &str = "{url}";

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Compose the URL for `endpoint` with `params` serialized in the given order.
///
/// A key given twice keeps its first position and its last value.
pub fn build_url<I, K, V>(endpoint: &str, params: I, config: &WeatherConfig) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let base = if config.use_proxy {
        PROXY_BASE_URL
    } else {
        config.base_url.trim()
    };
    let base = base.strip_suffix('/').unwrap_or(base);
    let endpoint = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{endpoint}")
    };

    let api_url = format!("{base}{endpoint}?{}", serialize_query(params));

    match config.relay() {
        Some(relay) if !config.use_proxy => wrap_in_relay(relay, &api_url),
        _ => api_url,
    }
}

fn serialize_query<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in params {
        let (key, value) = (key.as_ref(), value.as_ref());
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => pairs.push((key.to_string(), value.to_string())),
        }
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn wrap_in_relay(relay: &str, api_url: &str) -> String {
    if relay.contains(RELAY_PLACEHOLDER) {
        return relay.replacen(RELAY_PLACEHOLDER, &encode_component(api_url), 1);
    }

    if relay.ends_with('=') || relay.contains("?url=") {
        format!("{relay}{}", encode_component(api_url))
    } else {
        format!("{relay}{api_url}")
    }
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}
