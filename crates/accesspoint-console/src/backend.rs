//! HTTP seam between the controllers and the access backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ConsoleError, LOOKUP_PATH};

/// A response whose body parsed as JSON, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonReply {
    pub status: u16,
    /// Reason phrase for `status`, empty if unknown.
    pub status_text: String,
    pub body: Value,
}

impl JsonReply {
    pub fn new(status: u16, body: Value) -> Self {
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            body,
        }
    }

    /// 2xx, including partial-success statuses such as 207.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Requests the console makes against the backend.
///
/// An `Err` means no JSON response was obtained (connection failure,
/// unreadable or non-JSON body). HTTP error statuses with a JSON body are
/// returned as `Ok` and interpreted by the controllers.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/get-user-ips/{username}`.
    async fn lookup_user_ips(&self, username: &str) -> Result<JsonReply, ConsoleError>;

    /// `POST` a JSON body to a form action.
    async fn submit(&self, action: &str, body: &Value) -> Result<JsonReply, ConsoleError>;
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for std::sync::Arc<T> {
    async fn lookup_user_ips(&self, username: &str) -> Result<JsonReply, ConsoleError> {
        (**self).lookup_user_ips(username).await
    }

    async fn submit(&self, action: &str, body: &Value) -> Result<JsonReply, ConsoleError> {
        (**self).submit(action, body).await
    }
}

/// [`Backend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend client. Relative form actions resolve against
    /// `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ConsoleError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConsoleError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Origin-relative lookup URL with `username` encoded as one segment.
    fn lookup_url(&self, username: &str) -> Result<Url, ConsoleError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| ConsoleError::InvalidUrl(self.base_url.to_string()))?
            .clear()
            .extend(LOOKUP_PATH.split('/').filter(|s| !s.is_empty()))
            .push(username);
        Ok(url)
    }

    fn action_url(&self, action: &str) -> Result<Url, ConsoleError> {
        self.base_url
            .join(action)
            .map_err(|e| ConsoleError::InvalidUrl(format!("{}: {}", action, e)))
    }

    async fn read_json(response: reqwest::Response) -> Result<JsonReply, ConsoleError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).inspect_err(|e| {
            warn!(status = %status, error = %e, "response body is not JSON");
        })?;
        Ok(JsonReply::new(status.as_u16(), body))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn lookup_user_ips(&self, username: &str) -> Result<JsonReply, ConsoleError> {
        let url = self.lookup_url(username)?;
        debug!(%url, "looking up user IPs");

        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn submit(&self, action: &str, body: &Value) -> Result<JsonReply, ConsoleError> {
        let url = self.action_url(action)?;
        debug!(%url, "submitting form");

        let response = self.http.post(url).json(body).send().await?;
        Self::read_json(response).await
    }
}
