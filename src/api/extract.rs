//! Session Extractor
//!
//! Every screen identifies itself with the `x-kiosk-session` header. Requests
//! without it act on the kiosk's default session.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::api::error::ApiError;
use crate::kiosk::DEFAULT_SESSION;

/// Header naming the caller's session
pub const SESSION_HEADER: &str = "x-kiosk-session";

const MAX_SESSION_ID_LEN: usize = 64;

/// The caller's session id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parse(raw: &str) -> Result<Self, ApiError> {
        let id = raw.trim();
        let valid = !id.is_empty()
            && id.len() <= MAX_SESSION_ID_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(id.to_string()))
        } else {
            Err(ApiError::Validation(format!(
                "Invalid {} header: expected 1-{} letters, digits, '-' or '_'",
                SESSION_HEADER, MAX_SESSION_ID_LEN
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(SESSION_HEADER) {
            None => Ok(Self(DEFAULT_SESSION.to_string())),
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    ApiError::Validation(format!("{} header is not valid text", SESSION_HEADER))
                })?;
                Self::parse(raw)
            }
        }
    }
}
