//! KuaKua chat front-end
//!
//! A terminal chat client for the KuaKua praising-chat backend. It shows the
//! running conversation and the running cost, sends user messages, and
//! renders the assistant's replies. Conversation management, cost
//! accounting and sessions all live in the backend.
//!
//! # Architecture
//!
//! - **HTTP client**: reqwest with a cookie jar so the session cookie
//!   round-trips on every request
//! - **Chat panel**: owned view state plus the history, cost and message calls
//! - **Shell**: full-screen terminal frame and the stdin event loop
//!
//! # Modules
//!
//! - [`api`]: backend wire types, the [`api::ChatBackend`] trait and its HTTP
//!   implementation
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`error`]: error type and result alias
//! - [`panel`]: chat panel state and render model
//! - [`session`]: session cookie storage
//! - [`shell`]: terminal rendering and event loop

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod config;
pub mod error;
pub mod panel;
pub mod session;
pub mod shell;

pub use error::{Error, Result};
