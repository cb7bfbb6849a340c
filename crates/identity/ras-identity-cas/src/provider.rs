//! CAS identity provider implementation.

use crate::client::{CasHttpClient, default_client, login_url};
use crate::config::CasConfig;
use crate::error::{CasError, CasResult};
use crate::session::CasSession;
use async_trait::async_trait;
use ras_identity_core::{AuthProvider, Token, VerifiedIdentity};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// CAS provider that implements AuthProvider
#[derive(Clone)]
pub struct CasProvider {
    config: CasConfig,
    http_client: Option<Arc<dyn CasHttpClient>>,
    fallback_client: OnceLock<Arc<dyn CasHttpClient>>,
}

impl CasProvider {
    /// Provider for the default CAS server, redirecting back to `service_url`
    pub fn new(service_url: impl Into<String>) -> Self {
        Self::from_config(CasConfig::new(service_url))
    }

    pub fn from_config(config: CasConfig) -> Self {
        Self {
            config,
            http_client: None,
            fallback_client: OnceLock::new(),
        }
    }

    /// Replace the HTTP transport used for ticket validation
    pub fn with_http_client(mut self, client: Arc<dyn CasHttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    /// Configured transport, or a shared `reqwest` client with the configured
    /// timeout
    pub fn client(&self) -> CasResult<Arc<dyn CasHttpClient>> {
        if let Some(client) = &self.http_client {
            return Ok(Arc::clone(client));
        }
        if let Some(client) = self.fallback_client.get() {
            return Ok(Arc::clone(client));
        }

        let client: Arc<dyn CasHttpClient> =
            Arc::new(default_client(self.config.http_timeout_seconds)?);
        Ok(Arc::clone(self.fallback_client.get_or_init(|| client)))
    }
}

#[async_trait]
impl AuthProvider for CasProvider {
    type Session = CasSession;
    type Error = CasError;

    fn name(&self) -> &str {
        &self.config.provider_name
    }

    fn set_name(&mut self, name: String) {
        self.config.provider_name = name;
    }

    /// CAS has no state parameter, so `_state` is not forwarded.
    fn begin_auth(&self, _state: &str) -> CasResult<CasSession> {
        let url = login_url(&self.config)?;
        debug!("Generated login URL for provider {}", self.name());
        Ok(CasSession::new(url))
    }

    async fn fetch_user(&self, session: &CasSession) -> CasResult<VerifiedIdentity> {
        session.user().cloned().ok_or(CasError::NoIdentity)
    }

    async fn refresh_token(&self, _refresh_token: &str) -> CasResult<Token> {
        Err(CasError::Unsupported(
            "Refresh token is not provided by cas".to_string(),
        ))
    }

    fn refresh_token_available(&self) -> bool {
        false
    }

    fn unmarshal_session(&self, data: &str) -> CasResult<CasSession> {
        CasSession::unmarshal(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ras_identity_core::AuthSession;

    const CALLBACK: &str = "http://localhost/auth/cas/callback";

    fn create_test_provider() -> CasProvider {
        CasProvider::from_config(
            CasConfig::new(CALLBACK)
                .with_login_url("https://cas.example/cas/login")
                .with_validate_url("https://cas.example/cas/serviceValidate"),
        )
    }

    #[test]
    fn test_name() {
        let provider = CasProvider::new(CALLBACK);
        assert_eq!(provider.name(), "cas");
    }

    #[test]
    fn test_set_name() {
        let mut provider = CasProvider::new(CALLBACK);
        provider.set_name("juliaIsBetter".to_string());
        assert_eq!(provider.name(), "juliaIsBetter");
    }

    #[test]
    fn test_begin_auth() {
        let provider = create_test_provider();
        let expected = "https://cas.example/cas/login?service=http%3A%2F%2Flocalhost%2Fauth%2Fcas%2Fcallback";

        for state in ["xyz", "", "another-state"] {
            let session = provider.begin_auth(state).unwrap();
            assert_eq!(session.auth_url().unwrap(), expected);
            assert!(session.user().is_none());
        }
    }

    #[test]
    fn test_begin_auth_with_default_server() {
        let provider = CasProvider::new(CALLBACK);
        let session = provider.begin_auth("xyz").unwrap();
        assert_eq!(
            session.auth_url().unwrap(),
            "https://secure.its.yale.edu/cas/login?service=http%3A%2F%2Flocalhost%2Fauth%2Fcas%2Fcallback"
        );
    }

    #[test]
    fn test_begin_auth_rejects_bad_login_url() {
        let provider =
            CasProvider::from_config(CasConfig::new(CALLBACK).with_login_url("::not a url::"));
        assert!(matches!(provider.begin_auth("xyz"), Err(CasError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let provider = create_test_provider();
        let result = provider.refresh_token("").await;
        assert!(matches!(result, Err(CasError::Unsupported(_))));
    }

    #[test]
    fn test_refresh_token_available() {
        let mut provider = create_test_provider();
        assert!(!provider.refresh_token_available());

        provider.set_name("other".to_string());
        assert!(!provider.refresh_token_available());
    }

    #[tokio::test]
    async fn test_fetch_user() {
        let provider = create_test_provider();

        let err = provider.fetch_user(&CasSession::default()).await.unwrap_err();
        assert!(matches!(err, CasError::NoIdentity));

        let data = serde_json::json!({
            "auth_url": "https://cas.example/cas/login?service=x",
            "user": {
                "provider_id": "cas",
                "subject": "foobar",
                "email": null,
                "display_name": null,
                "metadata": null
            }
        })
        .to_string();
        let session = provider.unmarshal_session(&data).unwrap();

        let user = provider.fetch_user(&session).await.unwrap();
        assert_eq!(user.subject, "foobar");
    }

    #[test]
    fn test_unmarshal_session_round_trip() {
        let provider = create_test_provider();
        let session = provider.begin_auth("xyz").unwrap();

        let restored = provider
            .unmarshal_session(&session.marshal().unwrap())
            .unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn test_begin_auth_login_url_with_query() {
        let provider = CasProvider::from_config(
            CasConfig::new(CALLBACK).with_login_url("https://cas.example/cas/login?renew=true"),
        );
        let session = provider.begin_auth("xyz").unwrap();
        assert_eq!(
            session.auth_url().unwrap(),
            "https://cas.example/cas/login?renew=true&service=http%3A%2F%2Flocalhost%2Fauth%2Fcas%2Fcallback"
        );
    }

    #[test]
    fn test_begin_auth_keeps_login_url_verbatim() {
        let provider = CasProvider::from_config(
            CasConfig::new("http://localhost/~app/cb").with_login_url("https://cas.example"),
        );
        let session = provider.begin_auth("xyz").unwrap();
        assert_eq!(
            session.auth_url().unwrap(),
            "https://cas.example?service=http%3A%2F%2Flocalhost%2F~app%2Fcb"
        );
    }

    #[test]
    fn test_fallback_client_is_shared() {
        let provider = create_test_provider();
        let first = provider.client().unwrap();
        let second = provider.client().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
