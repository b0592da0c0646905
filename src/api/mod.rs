//! Chat backend API.
//!
//! The panel talks to the backend only through [`ChatBackend`], so it can be
//! driven by the real HTTP client or by a scripted stand-in.
//!
//! - [`types`]: wire types
//! - [`client`]: reqwest implementation with a credentialed cookie jar

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::HttpBackend;
pub use types::{HealthResponse, Message, MessageRole, SendMessageResponse};

/// Operations the chat panel needs from the backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Fetch the conversation so far.
    async fn history(&self) -> Result<Vec<Message>>;

    /// Fetch the cumulative cost.
    async fn cost(&self) -> Result<f64>;

    /// Post one user message.
    async fn post_message(&self, content: &str) -> Result<SendMessageResponse>;

    /// Remember the session id so later requests carry it.
    async fn remember_session(&self, session_id: &str);

    /// Probe the backend root endpoint.
    async fn health(&self) -> Result<HealthResponse>;
}
