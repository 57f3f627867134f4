use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Credential;

pub mod gotrue;

pub use gotrue::GoTrueClient;

/// Identifier of an account in the identity provider; every owned row is keyed by it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The account behind a verified credential
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The provider answered with an error; `message` is its own detail text
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected identity provider response: {0}")]
    Decode(String),
}

impl IdentityError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, IdentityError::Provider { status: 404, .. })
    }
}

/// The service of record for authentication
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a live credential to exactly one user
    async fn resolve_caller(&self, credential: &Credential) -> Result<AuthUser, IdentityError>;

    /// Administratively remove the user's authentication identity
    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError>;
}
