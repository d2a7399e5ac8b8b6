//! Error types for the connect flow

use thiserror::Error;

/// Failure talking to the integrations backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Network or transport failure before a response arrived
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered with a non-success status
    #[error("HTTP {status} for {url}: {}", .detail.as_deref().unwrap_or("(no detail)"))]
    Status {
        url: String,
        status: u16,
        detail: Option<String>,
    },

    /// Endpoint URL could not be built from the configured base
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BackendError {
    /// Server-supplied `detail` field, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Terminal failure of one connect attempt.
#[derive(Error, Debug)]
pub enum HandshakeError {
    #[error("Authorization start failed: {0}")]
    Authorize(#[source] BackendError),

    #[error("Credential fetch failed: {0}")]
    Credentials(#[source] BackendError),
}

impl HandshakeError {
    /// Message shown to the user: server detail, else a generic fallback.
    pub fn user_message(&self, display_name: &str) -> String {
        match self {
            HandshakeError::Authorize(e) => e.detail().map(String::from).unwrap_or_else(|| {
                format!("Failed to start {} authorization.", display_name)
            }),
            HandshakeError::Credentials(e) => e
                .detail()
                .map(String::from)
                .unwrap_or_else(|| format!("Failed to fetch {} credentials.", display_name)),
        }
    }
}

/// Failure loading HubSpot contacts with stored credentials.
#[derive(Error, Debug)]
pub enum ContactsError {
    #[error("Invalid credentials format: {0}")]
    InvalidCredentials(String),

    #[error("Missing access token in credentials")]
    MissingAccessToken,

    #[error("Invalid HubSpot API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_detail() {
        let err = HandshakeError::Authorize(BackendError::Status {
            url: "http://localhost/authorize".to_string(),
            status: 400,
            detail: Some("invalid org".to_string()),
        });
        assert_eq!(err.user_message("HubSpot"), "invalid org");
    }

    #[test]
    fn test_user_message_fallbacks() {
        let authorize = HandshakeError::Authorize(BackendError::Status {
            url: "http://localhost/authorize".to_string(),
            status: 500,
            detail: None,
        });
        assert_eq!(
            authorize.user_message("HubSpot"),
            "Failed to start HubSpot authorization."
        );

        let credentials = HandshakeError::Credentials(BackendError::InvalidUrl(
            url::ParseError::EmptyHost,
        ));
        assert_eq!(
            credentials.user_message("HubSpot"),
            "Failed to fetch HubSpot credentials."
        );
    }
}
