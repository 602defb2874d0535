//! Static bearer-token guard for the Libris API.
//!
//! Identity itself is owned by an external provider; this crate only checks
//! that a request carries one of the configured API tokens.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingCredentials,

    #[error("Authorization header must use the Bearer scheme")]
    MalformedHeader,

    #[error("invalid API token")]
    InvalidToken,
}

/// Set of accepted bearer tokens. An empty guard admits every request.
#[derive(Debug, Clone, Default)]
pub struct TokenGuard {
    tokens: Arc<HashSet<String>>,
}

impl TokenGuard {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<HashSet<_>>();

        Self {
            tokens: Arc::new(tokens),
        }
    }

    pub fn is_open(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check the raw `Authorization` header value.
    pub fn authorize(&self, header: Option<&str>) -> Result<(), AuthError> {
        if self.is_open() {
            return Ok(());
        }

        let header = header.ok_or(AuthError::MissingCredentials)?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedHeader)?;

        if self.tokens.contains(token) {
            Ok(())
        } else {
            tracing::debug!(target: "libris-authz", "rejected unknown API token");
            Err(AuthError::InvalidToken)
        }
    }
}
