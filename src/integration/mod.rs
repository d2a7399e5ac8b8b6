//! Host-owned integration parameters and the derived connection status

pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use store::{IntegrationStore, MemoryStore, ParamsUpdater};

/// Integration parameters as the host stores them:
/// `{ type?, credentials?, ...other fields }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationParams(Map<String, Value>);

impl IntegrationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object. Anything else is rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Configured integration tag (`type` field).
    pub fn integration_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn credentials(&self) -> Option<&Value> {
        self.0.get("credentials")
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// `{ ...self, credentials, type: tag }`. Unrelated fields survive.
    pub fn with_credentials(&self, credentials: Value, tag: &str) -> Self {
        let mut next = self.clone();
        next.insert("credentials", credentials);
        next.insert("type", Value::String(tag.to_string()));
        next
    }

    /// True iff these parameters describe a connected `tag` integration.
    pub fn is_connected_to(&self, tag: &str) -> bool {
        self.integration_type() == Some(tag)
            && self.credentials().map_or(false, credentials_present)
    }
}

/// Whether a credential payload counts as present.
///
/// Null, `false`, zero, empty strings and empty collections are all "not yet
/// available".
pub fn credentials_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Locally derived status of this integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    /// Collapse the two local flags. `connected` wins over `connecting`.
    pub fn from_flags(connected: bool, connecting: bool) -> Self {
        if connected {
            ConnectionStatus::Connected
        } else if connecting {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
        }
    }
}
