//! CAS (Central Authentication Service) identity provider.
//!
//! Redirects users to a CAS login page, then exchanges the single-use service
//! ticket CAS hands back for the authenticated principal. Sessions serialize
//! to a flat JSON string so callers can carry them across the redirect, for
//! example in an encrypted cookie.

mod client;
mod config;
mod error;
mod provider;
mod response;
mod session;


pub use client::{CasHttpClient, HttpResponse, login_url, query_escape, validation_url};
pub use config::{CasConfig, DEFAULT_LOGIN_URL, DEFAULT_PROVIDER_NAME, DEFAULT_VALIDATE_URL};
pub use error::{CasError, CasResult};
pub use provider::CasProvider;
pub use response::{AuthenticationFailure, AuthenticationSuccess, CAS_NAMESPACE, ServiceResponse};
pub use session::CasSession;

// Re-export common types for convenience
pub use ras_identity_core::{AuthProvider, AuthSession, Params, Token, VerifiedIdentity};
