//! HTTP client for the integrations backend
//!
//! Wraps reqwest::Client and maps non-success responses to `BackendError`
//! carrying the backend's `detail` message.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{Backend, Identity};
use crate::error::BackendError;

/// reqwest-backed `Backend` talking to `{base}/integrations/{provider}/...`.
pub struct HttpBackend {
    http: reqwest::Client,
    base: Url,
    provider: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, provider: &str) -> Result<Self, BackendError> {
        let mut base = Url::parse(base_url)?;
        // Url::join drops the last path segment unless it ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            provider: provider.to_string(),
        })
    }

    fn endpoint(&self, action: &str) -> Result<Url, BackendError> {
        Ok(self
            .base
            .join(&format!("integrations/{}/{}", self.provider, action))?)
    }

    /// POST the identity pair as form fields and return the raw body.
    async fn post_form(&self, action: &str, identity: &Identity) -> Result<String, BackendError> {
        let url = self.endpoint(action)?;
        tracing::debug!("Backend POST {}", url);

        let resp = self
            .http
            .post(url.clone())
            .form(&identity.form())
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.to_string(),
                source,
            })?;

        let resp = check_response(resp, url.as_str()).await?;
        resp.text().await.map_err(|source| BackendError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn authorize(&self, identity: &Identity) -> Result<String, BackendError> {
        let body = self.post_form("authorize", identity).await?;
        Ok(match decode_body(&body) {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    async fn credentials(&self, identity: &Identity) -> Result<Value, BackendError> {
        let body = self.post_form("credentials", identity).await?;
        Ok(decode_body(&body))
    }
}

/// Response bodies are JSON when the backend serialises them, raw text otherwise.
fn decode_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Check HTTP response status code and extract the backend's `detail` on failure.
async fn check_response(
    resp: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .and_then(|d| match d {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        });

    Err(BackendError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn identity() -> Identity {
        Identity::new("user-1", "org-1")
    }

    fn form_matcher() -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_id".into(), "user-1".into()),
            Matcher::UrlEncoded("org_id".into(), "org-1".into()),
        ])
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  \n"), Value::Null);
        assert_eq!(decode_body("\"tok\""), Value::String("tok".into()));
        assert_eq!(decode_body("tok_raw"), Value::String("tok_raw".into()));
        assert_eq!(
            decode_body(r#"{"access_token":"a"}"#),
            serde_json::json!({"access_token": "a"})
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = HttpBackend::new("http://localhost:8000/api", "hubspot").unwrap();
        assert_eq!(
            backend.endpoint("authorize").unwrap().as_str(),
            "http://localhost:8000/api/integrations/hubspot/authorize"
        );

        let backend = HttpBackend::new("http://localhost:8000", "hubspot").unwrap();
        assert_eq!(
            backend.endpoint("credentials").unwrap().as_str(),
            "http://localhost:8000/integrations/hubspot/credentials"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url", "hubspot"),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_authorize_posts_identity_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/integrations/hubspot/authorize")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(form_matcher())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("\"https://app.hubspot.com/oauth/authorize?client_id=x\"")
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url(), "hubspot").unwrap();
        let url = backend.authorize(&identity()).await.unwrap();
        assert_eq!(url, "https://app.hubspot.com/oauth/authorize?client_id=x");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_detail_extracted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/integrations/hubspot/credentials")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "HubSpot credentials not found. Please re-authorize."}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url(), "hubspot").unwrap();
        let err = backend.credentials(&identity()).await.unwrap_err();
        match &err {
            BackendError::Status { status, .. } => assert_eq!(*status, 404),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.detail(),
            Some("HubSpot credentials not found. Please re-authorize.")
        );
    }

    #[tokio::test]
    async fn test_error_without_json_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/integrations/hubspot/authorize")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url(), "hubspot").unwrap();
        let err = backend.authorize(&identity()).await.unwrap_err();
        assert!(err.detail().is_none());
    }

    #[tokio::test]
    async fn test_blank_detail_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/integrations/hubspot/authorize")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "  "}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url(), "hubspot").unwrap();
        let err = backend.authorize(&identity()).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 400, .. }));
        assert!(err.detail().is_none());
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Grab a free port, then release it so nothing is listening
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let backend = HttpBackend::new(&format!("http://127.0.0.1:{}", port), "hubspot").unwrap();
        let err = backend.authorize(&identity()).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport { .. }));
        assert!(err.detail().is_none());
    }
}
