//! Core identity provider traits and types.
//!
//! A provider starts an authentication attempt and hands back a typed session.
//! The session is carried across the redirect to the identity server and,
//! once the callback arrives, authorizes itself against the provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub provider_id: String,
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl VerifiedIdentity {
    /// Identity carrying only a provider and subject, as returned by minimal
    /// protocols.
    pub fn new(provider_id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            subject: subject.into(),
            email: None,
            display_name: None,
            metadata: None,
        }
    }
}

/// Token returned by providers that support refresh grants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
}

/// Lookup of the query parameters delivered to the callback endpoint.
pub trait Params: Send + Sync {
    fn get(&self, key: &str) -> Option<&str>;
}

impl Params for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl Params for Vec<(String, String)> {
    fn get(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync + Sized {
    type Session: AuthSession<Provider = Self>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Name used to look this provider up, unique per configured instance
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Start an authentication attempt. `state` is an opaque value that
    /// protocols with a state parameter forward to the identity server.
    fn begin_auth(&self, state: &str) -> Result<Self::Session, Self::Error>;

    async fn fetch_user(&self, session: &Self::Session) -> Result<VerifiedIdentity, Self::Error>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, Self::Error>;

    fn refresh_token_available(&self) -> bool;

    /// Rebuild a session from the output of [`AuthSession::marshal`].
    fn unmarshal_session(&self, data: &str) -> Result<Self::Session, Self::Error>;
}

#[async_trait]
pub trait AuthSession: Send + Sync + Sized {
    type Provider: AuthProvider<Session = Self>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// URL the browser must be redirected to
    fn auth_url(&self) -> Result<&str, Self::Error>;

    /// Complete the attempt using the callback parameters.
    ///
    /// Returns the credential that was exchanged for the identity.
    async fn authorize(
        &mut self,
        provider: &Self::Provider,
        params: &dyn Params,
    ) -> Result<String, Self::Error>;

    fn marshal(&self) -> Result<String, Self::Error>;
}
