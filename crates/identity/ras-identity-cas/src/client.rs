//! HTTP transport and URL construction for the CAS endpoints.

use crate::config::CasConfig;
use crate::error::{CasError, CasResult};
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::time::Duration;
use url::Url;

/// Raw validation response; the status is informational only
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Transport used to reach the CAS validation endpoint.
///
/// Implemented for [`reqwest::Client`]; tests and callers with special
/// network requirements can supply their own.
#[async_trait]
pub trait CasHttpClient: Send + Sync {
    /// Issue a GET and read the complete body.
    async fn get(&self, url: &Url) -> CasResult<HttpResponse>;
}

#[async_trait]
impl CasHttpClient for reqwest::Client {
    async fn get(&self, url: &Url) -> CasResult<HttpResponse> {
        let response = reqwest::Client::get(self, url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

pub(crate) fn default_client(timeout_seconds: u64) -> CasResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?;
    Ok(client)
}

/// Query component escaping: everything but ASCII alphanumerics and `-_.~`
/// is percent-encoded, and spaces become `+`.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn query_escape(value: &str) -> String {
    value
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_ESCAPE).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// `<login_url>?service=<service_url>`, appended verbatim to the configured
/// login URL
pub fn login_url(config: &CasConfig) -> CasResult<String> {
    parse_endpoint("login", &config.login_url)?;
    Ok(format!(
        "{}{}service={}",
        config.login_url,
        query_separator(&config.login_url),
        query_escape(&config.service_url)
    ))
}

/// `<validate_url>?service=<service_url>&ticket=<ticket>`
pub fn validation_url(config: &CasConfig, ticket: &str) -> CasResult<Url> {
    parse_endpoint("validation", &config.validate_url)?;
    let raw = format!(
        "{}{}service={}&ticket={}",
        config.validate_url,
        query_separator(&config.validate_url),
        query_escape(&config.service_url),
        query_escape(ticket)
    );
    parse_endpoint("validation", &raw)
}

fn query_separator(endpoint: &str) -> char {
    if endpoint.contains('?') { '&' } else { '?' }
}

fn parse_endpoint(kind: &str, raw: &str) -> CasResult<Url> {
    Url::parse(raw)
        .map_err(|e| CasError::ConfigError(format!("invalid {} URL '{}': {}", kind, raw, e)))
}
