//! Session cookie storage.
//!
//! The backend issues a session id on the first successful post and expects it
//! back as the `session_id` cookie. [`SessionCookie`] owns the cookie jar the
//! HTTP client sends from, and can persist the id to a file so a restarted
//! client picks up the same conversation.
//!
//! # Example
//!
//! ```rust
//! use kuakua_chat::session::SessionCookie;
//! use url::Url;
//!
//! let base = Url::parse("http://localhost:8000").unwrap();
//! let cookie = SessionCookie::new(base, None);
//! cookie.set("abc");
//! assert_eq!(cookie.current().as_deref(), Some("abc"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;

/// Name of the cookie the backend reads.
pub const SESSION_COOKIE: &str = "session_id";

/// Cookie jar holding the backend session id.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    jar: Arc<Jar>,
    url: Url,
    file: Option<PathBuf>,
}

impl SessionCookie {
    /// Create an empty store scoped to the backend's origin.
    pub fn new(url: Url, file: Option<PathBuf>) -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            url,
            file,
        }
    }

    /// The jar to hand to the HTTP client as its cookie provider.
    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Persistence file, if configured.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Put the session id into the jar without touching the file.
    pub fn set(&self, session_id: &str) {
        self.jar.add_cookie_str(
            &format!("{SESSION_COOKIE}={session_id}; Path=/"),
            &self.url,
        );
    }

    /// Store the session id in the jar and, if configured, on disk.
    ///
    /// A failed file write is logged; the in-memory cookie is still set.
    pub async fn store(&self, session_id: &str) {
        self.set(session_id);

        if let Some(path) = &self.file {
            match tokio::fs::write(path, session_id).await {
                Ok(()) => debug!(
                    name: "session.cookie.persisted",
                    path = %path.display(),
                    "Session cookie persisted"
                ),
                Err(e) => warn!(
                    name: "session.cookie.persist_failed",
                    path = %path.display(),
                    error = %e,
                    "Failed to persist session cookie"
                ),
            }
        }
    }

    /// Seed the jar from the persistence file.
    ///
    /// Returns the restored id. A missing file is not an error.
    pub async fn restore(&self) -> Result<Option<String>> {
        let Some(path) = &self.file else {
            return Ok(None);
        };

        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session_id = raw.trim();
        if session_id.is_empty() {
            return Ok(None);
        }

        self.set(session_id);
        debug!(
            name: "session.cookie.restored",
            path = %path.display(),
            "Session cookie restored"
        );
        Ok(Some(session_id.to_string()))
    }

    /// The session id the jar would send to the backend.
    pub fn current(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.to_string())
        })
    }
}
