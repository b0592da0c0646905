//! Chat panel: conversation state, the three backend calls, and the render
//! model.
//!
//! # Example
//!
//! ```rust,no_run
//! use kuakua_chat::api::HttpBackend;
//! use kuakua_chat::panel::ChatPanel;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new("http://localhost:8000", None)?;
//! let mut panel = ChatPanel::new();
//! panel.load(&backend).await;
//!
//! panel.set_input("I finished my first marathon!");
//! panel.send(&backend).await;
//! println!("{}", panel.view().cost_line);
//! # Ok(())
//! # }
//! ```

mod state;
pub mod view;

pub use state::{ChatPanel, InitialLoad, dispatch};
pub use view::{Alignment, Bubble, PanelView, Tone, format_cost};
