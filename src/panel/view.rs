//! Render model for the chat panel.
//!
//! [`PanelView`] is a plain snapshot of what the panel should show; the shell
//! turns it into terminal output. Keeping it free of I/O makes the render
//! contract directly testable.

use super::state::ChatPanel;
use crate::api::Message;

/// Horizontal placement of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Colour family of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// User messages.
    Accent,
    /// Assistant messages.
    Neutral,
}

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub text: String,
    pub alignment: Alignment,
    pub tone: Tone,
}

impl From<&Message> for Bubble {
    fn from(message: &Message) -> Self {
        let (alignment, tone) = if message.is_user() {
            (Alignment::Right, Tone::Accent)
        } else {
            (Alignment::Left, Tone::Neutral)
        };
        Self {
            text: message.content.clone(),
            alignment,
            tone,
        }
    }
}

/// Snapshot of everything the panel displays.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    /// `Total Cost: $X.XX`
    pub cost_line: String,
    /// Bubbles in conversation order.
    pub bubbles: Vec<Bubble>,
    /// Error banner, if any.
    pub error: Option<String>,
    /// Current input text.
    pub input: String,
    pub input_disabled: bool,
    pub send_disabled: bool,
    /// `Send`, or `Sending...` while a send is in flight.
    pub send_label: &'static str,
}

/// Format a cost the way the panel shows it.
///
/// Two decimals, with values exactly halfway between two cents rounded up
/// (`0.125` shows as `0.13`), the way a browser's `toFixed(2)` does.
pub fn format_cost(total_cost: f64) -> String {
    // Only odd multiples of 1/8 sit exactly on a half cent; `{:.2}` would
    // send those to the even neighbour.
    let eighths = total_cost * 8.0;
    let rounded = if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        (total_cost * 100.0).round() / 100.0
    } else {
        total_cost
    };
    format!("Total Cost: ${rounded:.2}")
}

impl ChatPanel {
    /// Build the render model for the current state.
    pub fn view(&self) -> PanelView {
        PanelView {
            cost_line: format_cost(self.total_cost()),
            bubbles: self.messages().iter().map(Bubble::from).collect(),
            error: self.error().map(str::to_string),
            input: self.input().to_string(),
            input_disabled: self.is_loading(),
            send_disabled: !self.can_send(),
            send_label: if self.is_loading() {
                "Sending..."
            } else {
                "Send"
            },
        }
    }
}
