//! HTTP client for the chat backend.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::ChatBackend;
use super::types::{
    CostResponse, HealthResponse, HistoryResponse, Message, SendMessageRequest,
    SendMessageResponse,
};
use crate::error::{Error, Result};
use crate::session::SessionCookie;

/// Backend client.
///
/// Every request goes out with the session cookie jar attached, so the
/// `session_id` cookie round-trips without the caller handling it. No retry,
/// no request timeout.
///
/// # Example
///
/// ```rust,no_run
/// use kuakua_chat::api::{ChatBackend, HttpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("http://localhost:8000", None)?;
/// let history = backend.history().await?;
/// println!("{} messages", history.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: reqwest::Client,
    session: SessionCookie,
}

impl HttpBackend {
    /// Create a client for `base_url`, optionally persisting the session
    /// cookie to `cookie_file`.
    ///
    /// A path on the base URL is kept as a prefix for every endpoint:
    /// `http://host/chat` posts to `http://host/chat/api/chat/message`.
    pub fn new(base_url: impl AsRef<str>, cookie_file: Option<PathBuf>) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let session = SessionCookie::new(base_url.clone(), cookie_file);
        let http = reqwest::Client::builder()
            .cookie_provider(session.jar())
            .build()?;
        Ok(Self {
            base_url,
            http,
            session,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session cookie store backing this client.
    pub fn session(&self) -> &SessionCookie {
        &self.session
    }

    /// Resolve an endpoint path relative to the base URL.
    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn history(&self) -> Result<Vec<Message>> {
        let response = self.http.get(self.url("api/chat/history")).send().await?;
        let body: HistoryResponse = Self::handle_response(response).await?;
        debug!(
            name: "api.history.fetched",
            count = body.messages.len(),
            "History fetched"
        );
        Ok(body.messages)
    }

    async fn cost(&self) -> Result<f64> {
        let response = self.http.get(self.url("api/chat/cost")).send().await?;
        let body: CostResponse = Self::handle_response(response).await?;
        debug!(name: "api.cost.fetched", total_cost = body.total_cost, "Cost fetched");
        Ok(body.total_cost)
    }

    async fn post_message(&self, content: &str) -> Result<SendMessageResponse> {
        let req = SendMessageRequest {
            content: content.to_string(),
        };
        let response = self
            .http
            .post(self.url("api/chat/message"))
            .json(&req)
            .send()
            .await?;
        let body: SendMessageResponse = Self::handle_response(response).await?;
        debug!(
            name: "api.message.posted",
            returned = body.messages.len(),
            total_cost = body.total_cost,
            "Message posted"
        );
        Ok(body)
    }

    async fn remember_session(&self, session_id: &str) {
        self.session.store(session_id).await;
    }

    async fn health(&self) -> Result<HealthResponse> {
        let response = self.http.get(self.base_url.clone()).send().await?;
        Self::handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = HttpBackend::new("not a url", None).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_paths_resolve_against_base() {
        let backend = HttpBackend::new("http://localhost:8000", None).unwrap();
        assert_eq!(
            backend.url("api/chat/cost").as_str(),
            "http://localhost:8000/api/chat/cost"
        );
    }

    #[test]
    fn test_base_path_is_kept_as_prefix() {
        let backend = HttpBackend::new("http://localhost:8000/kuakua", None).unwrap();
        assert_eq!(backend.base_url().as_str(), "http://localhost:8000/kuakua/");
        assert_eq!(
            backend.url("api/chat/history").as_str(),
            "http://localhost:8000/kuakua/api/chat/history"
        );

        let trailing = HttpBackend::new("http://localhost:8000/kuakua/", None).unwrap();
        assert_eq!(trailing.base_url(), backend.base_url());
    }
}
