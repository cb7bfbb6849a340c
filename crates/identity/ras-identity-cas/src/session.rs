//! CAS session: carries one authentication attempt across the redirect.

use crate::client::validation_url;
use crate::error::{CasError, CasResult};
use crate::provider::CasProvider;
use crate::response::{AuthenticationSuccess, ServiceResponse};
use async_trait::async_trait;
use ras_identity_core::{AuthProvider, AuthSession, Params, VerifiedIdentity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// State of a single CAS login.
///
/// Pending until a ticket validates, after which `user` holds the principal.
/// A rejected ticket leaves the session as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasSession {
    auth_url: String,
    user: Option<VerifiedIdentity>,
}

impl CasSession {
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            user: None,
        }
    }

    pub fn user(&self) -> Option<&VerifiedIdentity> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Rebuild a session from [`AuthSession::marshal`] output.
    pub fn unmarshal(data: &str) -> CasResult<Self> {
        serde_json::from_str(data).map_err(CasError::DeserializationError)
    }
}

impl fmt::Display for CasSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&data)
    }
}

impl FromStr for CasSession {
    type Err = CasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::unmarshal(s)
    }
}

fn identity_from_success(provider_id: &str, success: AuthenticationSuccess) -> VerifiedIdentity {
    let mut identity = VerifiedIdentity::new(provider_id, success.user);
    if !success.attributes.is_empty() {
        identity.metadata = Some(serde_json::json!({ "attributes": success.attributes }));
    }
    identity
}

#[async_trait]
impl AuthSession for CasSession {
    type Provider = CasProvider;
    type Error = CasError;

    fn auth_url(&self) -> CasResult<&str> {
        if self.auth_url.is_empty() {
            return Err(CasError::NoAuthUrl);
        }
        Ok(&self.auth_url)
    }

    /// Validate the callback's service ticket with the CAS server.
    ///
    /// The decision is made on the response body alone; CAS commonly answers
    /// rejected tickets with a 401 that still carries a well-formed failure.
    async fn authorize(
        &mut self,
        provider: &CasProvider,
        params: &dyn Params,
    ) -> CasResult<String> {
        let ticket = params
            .get("ticket")
            .filter(|ticket| !ticket.is_empty())
            .ok_or(CasError::MissingTicket)?
            .to_string();

        let url = validation_url(provider.config(), &ticket)?;
        let client = provider.client()?;

        debug!("Validating service ticket for provider {}", provider.name());
        let response = client.get(&url).await?;

        let service_response = ServiceResponse::parse(&response.body).inspect_err(|e| {
            error!(
                status = response.status,
                "Failed to parse CAS validation response: {}", e
            );
        })?;

        match service_response {
            ServiceResponse::Success(success) => {
                let identity = identity_from_success(provider.name(), success);
                info!(
                    "Service ticket validated for subject {} via provider {}",
                    identity.subject,
                    provider.name()
                );
                self.user = Some(identity);
                Ok(ticket)
            }
            ServiceResponse::Failure(failure) => {
                warn!(
                    status = response.status,
                    code = %failure.code,
                    reason = %failure.reason,
                    "CAS rejected service ticket"
                );
                Err(CasError::ValidationFailed {
                    code: failure.code,
                    reason: failure.reason,
                })
            }
        }
    }

    fn marshal(&self) -> CasResult<String> {
        serde_json::to_string(self).map_err(CasError::SerializationError)
    }
}
