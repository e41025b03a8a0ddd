//! Bearer-token authentication for the service boundary.
//!
//! Requests are rejected here before any base64 or codec work runs, so
//! the decoder only ever sees input from a known principal.

use std::collections::HashMap;

/// Maps bearer tokens to principal names.
#[derive(Debug, Clone, Default)]
pub struct TokenMap {
    tokens: HashMap<String, String>,
}

/// Why a request failed authentication. All variants surface as 401; the
/// distinction is for logs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,
    #[error("Authorization header is not a bearer token")]
    Malformed,
    #[error("unknown bearer token")]
    Unknown,
}

impl TokenMap {
    /// Parse `token=principal,token2=principal2`, the format of the
    /// `LABELRASTER_API_TOKENS` environment variable.
    pub fn from_spec(spec: &str) -> Result<Self, String> {
        let mut tokens = HashMap::new();
        for pair in spec.split(',').filter(|p| !p.trim().is_empty()) {
            let (token, principal) = pair
                .split_once('=')
                .ok_or_else(|| format!("token entry {pair:?} is not token=principal"))?;
            let (token, principal) = (token.trim(), principal.trim());
            if token.is_empty() || principal.is_empty() {
                return Err(format!("token entry {pair:?} has an empty side"));
            }
            tokens.insert(token.to_owned(), principal.to_owned());
        }
        if tokens.is_empty() {
            return Err("no API tokens configured".into());
        }
        Ok(Self { tokens })
    }

    /// Resolve an `Authorization` header value to a principal.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<&str, AuthError> {
        let header = authorization.ok_or(AuthError::Missing)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(AuthError::Malformed)?;
        self.tokens
            .get(token.trim())
            .map(String::as_str)
            .ok_or(AuthError::Unknown)
    }
}
