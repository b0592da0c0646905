//! Wire types for the chat backend.
//!
//! These mirror the backend's JSON bodies one-to-one.

use serde::{Deserialize, Serialize};

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Reply produced by the backend.
    Assistant,
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Whether the user wrote this message.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// `GET /api/chat/history` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,
}

/// `GET /api/chat/cost` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostResponse {
    /// Cumulative spend reported by the backend.
    pub total_cost: f64,
}

/// `POST /api/chat/message` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Trimmed user input.
    pub content: String,
}

/// `POST /api/chat/message` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// Session the backend filed this message under.
    pub session_id: String,
    /// New messages, normally the echoed user turn and the reply.
    pub messages: Vec<Message>,
    /// Cumulative spend after this message.
    pub total_cost: f64,
}

/// `GET /` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
