//! Integrations backend surface
//!
//! The backend owns the OAuth client secret and the token exchange. This side
//! only asks it for an authorization URL and, later, for whatever credentials
//! the callback stored for the identity pair.

pub mod client;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

pub use client::HttpBackend;

/// Identity pair supplied by the host, sent with every backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub org: String,
}

impl Identity {
    pub fn new(user: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            org: org.into(),
        }
    }

    /// Form fields for backend requests.
    pub fn form(&self) -> [(&'static str, &str); 2] {
        [("user_id", self.user.as_str()), ("org_id", self.org.as_str())]
    }
}

/// Backend endpoints used by the handshake.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Ask the backend for the provider's authorization URL.
    async fn authorize(&self, identity: &Identity) -> Result<String, BackendError>;

    /// Fetch the credential payload stored for `identity`.
    /// `Value::Null` when nothing has been stored yet.
    async fn credentials(&self, identity: &Identity) -> Result<Value, BackendError>;
}
