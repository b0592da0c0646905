//! Chat panel state and the operations that change it.

use tracing::{error, info};

use crate::api::{ChatBackend, Message, SendMessageResponse};
use crate::error::{Error, Result};

/// Result of the initial history + cost fetch.
///
/// Both requests have to succeed for anything to be applied, so the outcome
/// is one value rather than two independent options.
#[derive(Debug)]
pub enum InitialLoad {
    /// Both requests succeeded.
    Loaded {
        /// Conversation so far.
        messages: Vec<Message>,
        /// Cumulative cost.
        total_cost: f64,
    },
    /// At least one request failed.
    Failed(Error),
}

impl InitialLoad {
    /// Request history and cost concurrently and join them.
    pub async fn fetch<B: ChatBackend + ?Sized>(backend: &B) -> Self {
        match futures::try_join!(backend.history(), backend.cost()) {
            Ok((messages, total_cost)) => Self::Loaded {
                messages,
                total_cost,
            },
            Err(e) => Self::Failed(e),
        }
    }
}

/// Post one message and remember the session the backend filed it under.
///
/// This is the network half of a send; it does not touch panel state, so it
/// can be polled while the panel keeps handling input.
pub async fn dispatch<B: ChatBackend + ?Sized>(
    backend: &B,
    content: String,
) -> Result<SendMessageResponse> {
    let response = backend.post_message(&content).await?;
    backend.remember_session(&response.session_id).await;
    Ok(response)
}

/// View state of the chat panel.
///
/// Owned by whoever mounts the panel; nothing here is global.
#[derive(Debug, Default)]
pub struct ChatPanel {
    messages: Vec<Message>,
    input: String,
    is_loading: bool,
    total_cost: f64,
    error: Option<String>,
    scroll_pending: bool,
}

impl ChatPanel {
    /// Create an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether a send is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Latest cost reported by the backend.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Error banner text, if the last operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether submitting now would send anything.
    pub fn can_send(&self) -> bool {
        !self.is_loading && !self.input.trim().is_empty()
    }

    /// Consume the pending scroll-to-end request raised by a message change.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }

    /// Load history and cost from the backend.
    pub async fn load<B: ChatBackend + ?Sized>(&mut self, backend: &B) {
        let load = InitialLoad::fetch(backend).await;
        self.apply_initial_load(load);
    }

    /// Apply a joined initial load: both values or neither.
    pub fn apply_initial_load(&mut self, load: InitialLoad) {
        match load {
            InitialLoad::Loaded {
                messages,
                total_cost,
            } => {
                info!(
                    name: "chat.history.loaded",
                    count = messages.len(),
                    total_cost,
                    "Chat history and cost loaded"
                );
                self.messages = messages;
                self.total_cost = total_cost;
                self.error = None;
                self.scroll_pending = true;
            }
            InitialLoad::Failed(e) => {
                error!(
                    name: "chat.history.load_failed",
                    error = %e,
                    "Error loading chat history or cost"
                );
                self.error = Some(format!("Could not load the conversation: {e}"));
            }
        }
    }

    /// Start a send.
    ///
    /// Returns the trimmed content to post, or `None` when the input is blank
    /// or a send is already in flight. On `Some`, the input is cleared and the
    /// loading flag is set; the caller must eventually call
    /// [`complete_send`](Self::complete_send).
    pub fn begin_send(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }

        let content = self.input.trim().to_string();
        self.input.clear();
        self.is_loading = true;
        Some(content)
    }

    /// Finish a send started with [`begin_send`](Self::begin_send).
    pub fn complete_send(&mut self, outcome: Result<SendMessageResponse>) {
        match outcome {
            Ok(response) => {
                info!(
                    name: "chat.message.sent",
                    returned = response.messages.len(),
                    total_cost = response.total_cost,
                    "Message sent"
                );
                if !response.messages.is_empty() {
                    self.messages.extend(response.messages);
                    self.scroll_pending = true;
                }
                self.total_cost = response.total_cost;
                self.error = None;
            }
            Err(e) => {
                error!(name: "chat.message.send_failed", error = %e, "Error sending message");
                self.error = Some(format!("Message not sent: {e}"));
            }
        }
        self.is_loading = false;
    }

    /// Submit the current input and wait for the reply.
    ///
    /// Returns `false` without touching the backend when the send is guarded
    /// off.
    pub async fn send<B: ChatBackend + ?Sized>(&mut self, backend: &B) -> bool {
        let Some(content) = self.begin_send() else {
            return false;
        };
        let outcome = dispatch(backend, content).await;
        self.complete_send(outcome);
        true
    }

    /// Re-read the cumulative cost.
    pub async fn refresh_cost<B: ChatBackend + ?Sized>(&mut self, backend: &B) {
        match backend.cost().await {
            Ok(total_cost) => {
                self.total_cost = total_cost;
                self.error = None;
            }
            Err(e) => {
                error!(name: "chat.cost.refresh_failed", error = %e, "Error refreshing cost");
                self.error = Some(format!("Could not refresh the cost: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::api::HealthResponse;

    fn api_error(status: u16) -> Error {
        Error::Api {
            status,
            message: "boom".into(),
        }
    }

    /// Backend that replays canned answers and counts calls.
    #[derive(Default)]
    struct ScriptedBackend {
        history: Option<Vec<Message>>,
        cost: Option<f64>,
        posts: Mutex<VecDeque<Option<SendMessageResponse>>>,
        post_calls: AtomicUsize,
        posted: Mutex<Vec<String>>,
        sessions: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn with_post(self, response: Option<SendMessageResponse>) -> Self {
            self.posts.lock().unwrap().push_back(response);
            self
        }

        fn post_calls(&self) -> usize {
            self.post_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn history(&self) -> Result<Vec<Message>> {
            self.history.clone().ok_or_else(|| api_error(500))
        }

        async fn cost(&self) -> Result<f64> {
            self.cost.ok_or_else(|| api_error(500))
        }

        async fn post_message(&self, content: &str) -> Result<SendMessageResponse> {
            self.post_calls.fetch_add(1, Ordering::SeqCst);
            self.posted.lock().unwrap().push(content.to_string());
            self.posts
                .lock()
                .unwrap()
                .pop_front()
                .flatten()
                .ok_or_else(|| api_error(500))
        }

        async fn remember_session(&self, session_id: &str) {
            self.sessions.lock().unwrap().push(session_id.to_string());
        }

        async fn health(&self) -> Result<HealthResponse> {
            Ok(HealthResponse {
                status: "ok".into(),
                message: "scripted".into(),
            })
        }
    }

    fn reply(user: &str, assistant: &str, total_cost: f64) -> SendMessageResponse {
        SendMessageResponse {
            session_id: "abc".into(),
            messages: vec![Message::user(user), Message::assistant(assistant)],
            total_cost,
        }
    }

    #[tokio::test]
    async fn test_initial_load_applies_both_values() {
        let backend = ScriptedBackend {
            history: Some(vec![Message::assistant("hi")]),
            cost: Some(0.0),
            ..Default::default()
        };
        let mut panel = ChatPanel::new();

        panel.load(&backend).await;

        assert_eq!(panel.messages(), &[Message::assistant("hi")]);
        assert!(panel.total_cost().abs() < f64::EPSILON);
        assert!(panel.error().is_none());
        assert!(panel.take_scroll_request());
    }

    #[tokio::test]
    async fn test_initial_load_is_all_or_nothing() {
        let backend = ScriptedBackend {
            history: None,
            cost: Some(3.5),
            ..Default::default()
        };
        let mut panel = ChatPanel::new();

        panel.load(&backend).await;

        assert!(panel.messages().is_empty());
        assert!(panel.total_cost().abs() < f64::EPSILON);
        assert!(panel.error().is_some());
        assert!(!panel.take_scroll_request());
    }

    #[tokio::test]
    async fn test_cost_failure_discards_history() {
        let backend = ScriptedBackend {
            history: Some(vec![Message::assistant("hi")]),
            cost: None,
            ..Default::default()
        };
        let mut panel = ChatPanel::new();

        panel.load(&backend).await;

        assert!(panel.messages().is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_never_posts() {
        let backend = ScriptedBackend::default();
        let mut panel = ChatPanel::new();

        for blank in ["", "   ", "\t\n"] {
            panel.set_input(blank);
            assert!(!panel.can_send());
            assert!(!panel.send(&backend).await);
        }

        assert_eq!(backend.post_calls(), 0);
    }

    #[tokio::test]
    async fn test_send_appends_reply_and_stores_session() {
        let backend = ScriptedBackend::default().with_post(Some(reply("hello", "hey!", 0.02)));
        let mut panel = ChatPanel::new();
        panel.set_input("  hello  ");

        assert!(panel.send(&backend).await);

        assert_eq!(backend.posted.lock().unwrap().as_slice(), ["hello"]);
        assert_eq!(backend.sessions.lock().unwrap().as_slice(), ["abc"]);
        assert_eq!(
            panel.messages(),
            &[Message::user("hello"), Message::assistant("hey!")]
        );
        assert!((panel.total_cost() - 0.02).abs() < f64::EPSILON);
        assert!(!panel.is_loading());
        assert!(panel.input().is_empty());
        assert!(panel.take_scroll_request());
    }

    #[tokio::test]
    async fn test_messages_are_concatenated_batches() {
        let backend = ScriptedBackend {
            history: Some(vec![Message::assistant("welcome back")]),
            cost: Some(0.01),
            ..Default::default()
        }
        .with_post(Some(reply("one", "first", 0.02)))
        .with_post(Some(reply("two", "second", 0.03)));
        let mut panel = ChatPanel::new();
        panel.load(&backend).await;

        for text in ["one", "two"] {
            panel.set_input(text);
            panel.send(&backend).await;
        }

        let contents: Vec<&str> = panel.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            ["welcome back", "one", "first", "two", "second"]
        );
        assert!((panel.total_cost() - 0.03).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_failed_send_clears_loading_and_keeps_state() {
        let backend = ScriptedBackend::default().with_post(None);
        let mut panel = ChatPanel::new();
        panel.set_input("hello");

        assert!(panel.send(&backend).await);

        assert!(!panel.is_loading());
        assert!(panel.messages().is_empty());
        assert!(panel.input().is_empty());
        assert!(panel.error().is_some());
        assert!(backend.sessions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_second_submit_while_loading_is_ignored() {
        let mut panel = ChatPanel::new();
        panel.set_input("first");
        assert_eq!(panel.begin_send().as_deref(), Some("first"));
        assert!(panel.is_loading());

        panel.set_input("second");
        assert!(!panel.can_send());
        assert!(panel.begin_send().is_none());
        assert_eq!(panel.input(), "second");

        panel.complete_send(Ok(reply("first", "ok", 0.5)));
        assert!(!panel.is_loading());
        assert_eq!(panel.begin_send().as_deref(), Some("second"));
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut panel = ChatPanel::new();
        panel.apply_initial_load(InitialLoad::Failed(api_error(502)));
        assert!(panel.error().is_some());

        panel.set_input("hello");
        panel.begin_send();
        panel.complete_send(Ok(reply("hello", "hey!", 0.02)));
        assert!(panel.error().is_none());
    }

    #[tokio::test]
    async fn test_refresh_cost_replaces_value() {
        let backend = ScriptedBackend {
            cost: Some(1.25),
            ..Default::default()
        };
        let mut panel = ChatPanel::new();

        panel.refresh_cost(&backend).await;

        assert!((panel.total_cost() - 1.25).abs() < f64::EPSILON);
    }
}
