//! Identity boundary.
//!
//! liftlog does not authenticate anyone itself. An authenticating reverse
//! proxy (forward-auth) puts the opaque user id in a trusted header; when a
//! proxy secret is configured the proxy must also prove itself with it.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

use super::error::ApiError;
use crate::config::AuthConfig;
use crate::AppState;

/// Header the proxy uses to send the shared secret
pub const PROXY_SECRET_HEADER: &str = "x-auth-secret";

const MAX_USER_ID_LENGTH: usize = 255;

/// Resolve the user id for a request, if it carries a trustworthy one.
pub fn resolve_identity(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
    if let Some(secret) = &config.proxy_secret {
        let provided = headers
            .get(PROXY_SECRET_HEADER)
            .map(|h| h.as_bytes())
            .unwrap_or_default();
        let expected = secret.as_bytes();

        // Only compare if lengths match (constant-time check)
        if provided.len() != expected.len() || !bool::from(provided.ct_eq(expected)) {
            if headers.contains_key(config.user_header.as_str()) {
                warn!("Identity header present without a valid proxy secret; ignoring it");
            }
            return None;
        }
    }

    let from_header = headers
        .get(config.user_header.as_str())
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_USER_ID_LENGTH)
        .map(str::to_string);

    from_header.or_else(|| config.dev_user.clone())
}

/// The request's identity, possibly absent. Never rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Identity(resolve_identity(&parts.headers, &state.config.auth)))
    }
}

/// A required identity; JSON endpoints reject requests without one with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(&parts.headers, &state.config.auth)
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
