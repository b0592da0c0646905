//! Application shell.
//!
//! Draws the full-screen frame (header, cost line, message viewport, input
//! line) and runs the event loop that feeds stdin into the chat panel.
//!
//! Frame layout, top to bottom:
//!
//! ```text
//!                 KuaKua Qun
//!          Your Supportive Chat Space
//! ──────────────────────────────────────────
//! Total Cost: $0.02
//! ──────────────────────────────────────────
//!  hi
//!                                    hello
//!  hey!
//!
//! ──────────────────────────────────────────
//! > _                                 [Send]
//! /cost /status /up /down /quit  (// sends a leading /)
//! ```

mod layout;
mod screen;

pub use layout::{Row, ScrollState, layout, sanitize, wrap};
pub use screen::Screen;

use console::{Style, measure_text_width, pad_str, style};
use futures::FutureExt;
use futures::future::{BoxFuture, OptionFuture};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::api::{ChatBackend, SendMessageResponse};
use crate::config::UiConfig;
use crate::error::Result;
use crate::panel::{ChatPanel, PanelView, Tone, dispatch};

/// Title, subtitle and the rule under them; dropped first on short screens.
const HEADER_ROWS: usize = 3;
/// Header, cost line and two rules.
const CHROME_TOP: usize = HEADER_ROWS + 2;
/// Banner, separator, input line and hint line.
const CHROME_BOTTOM: usize = 4;

const MIN_WIDTH: usize = 20;
/// Cost line, one viewport row and the bottom chrome.
const MIN_HEIGHT: usize = CHROME_TOP + CHROME_BOTTOM + 1 - HEADER_ROWS;
/// Used when the screen cannot report its size.
const FALLBACK_SIZE: (u16, u16) = (24, 80);

const HINT: &str = "/cost /status /up /down /quit  (// sends a leading /)";

/// Something the user asked the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the input with this text (if any) and submit.
    Submit(String),
    RefreshCost,
    Status,
    ScrollUp,
    ScrollDown,
    Quit,
}

impl Command {
    /// Parse one input line.
    ///
    /// Only the known commands are intercepted; anything else is chat text,
    /// and a doubled `//` sends the line with a single leading slash. An empty
    /// line submits whatever input is being held, which is how text typed
    /// during an in-flight send gets sent afterwards.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "/quit" | "/exit" => Self::Quit,
            "/cost" => Self::RefreshCost,
            "/status" => Self::Status,
            "/up" => Self::ScrollUp,
            "/down" => Self::ScrollDown,
            _ if trimmed.starts_with("//") => Self::Submit(trimmed[1..].to_string()),
            _ => Self::Submit(line.to_string()),
        }
    }
}

/// Frame renderer for one screen.
#[derive(Debug)]
pub struct Shell<S: Screen> {
    screen: S,
    title: String,
    subtitle: String,
    pinned_width: Option<u16>,
    pinned_height: Option<u16>,
    width: usize,
    height: usize,
    scroll: ScrollState,
    notice: Option<String>,
}

impl<S: Screen> Shell<S> {
    /// Create a shell drawing to `screen`.
    ///
    /// Width and height follow the screen unless the config pins them.
    pub fn new(config: &UiConfig, screen: S) -> Self {
        let mut shell = Self {
            screen,
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            pinned_width: config.width,
            pinned_height: config.height,
            width: 0,
            height: 0,
            scroll: ScrollState::default(),
            notice: None,
        };
        shell.fit();
        shell
    }

    /// The screen frames are drawn on.
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Rows available to the message viewport.
    pub fn viewport_height(&self) -> usize {
        self.height.saturating_sub(CHROME_TOP + CHROME_BOTTOM).max(1)
    }

    /// Transient line shown in place of the command hint.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Scroll the viewport by half a page.
    pub fn page(&mut self, panel: &ChatPanel, down: bool) {
        let rows = layout(&panel.view().bubbles, self.width).len();
        let half = isize::try_from(self.viewport_height() / 2).unwrap_or(1);
        let delta = if down { half } else { -half };
        self.scroll.scroll_by(delta, rows, self.viewport_height());
    }

    /// Render the panel as styled lines, exactly one per screen row.
    pub fn render(&mut self, panel: &mut ChatPanel) -> Vec<String> {
        let view = panel.view();
        let rows = layout(&view.bubbles, self.width);
        let height = self.viewport_height();

        if panel.take_scroll_request() {
            self.scroll.scroll_to_end(rows.len(), height);
        }

        let rule = "─".repeat(self.width);
        let mut lines = vec![
            style(self.center(&self.title)).bold().to_string(),
            self.center(&self.subtitle),
            rule.clone(),
            style(&view.cost_line).bold().to_string(),
            rule.clone(),
        ];

        let window = self.scroll.window(rows.len(), height);
        let shown = window.len();
        lines.extend(rows[window].iter().map(paint));
        lines.extend(std::iter::repeat_n(String::new(), height - shown));

        lines.push(match &view.error {
            Some(error) => style(error).red().to_string(),
            None => String::new(),
        });
        lines.push(rule);
        lines.push(self.input_line(&view));
        lines.push(
            style(self.notice.take().unwrap_or_else(|| HINT.to_string()))
                .dim()
                .to_string(),
        );

        // Short screens lose the header before anything else.
        let excess = lines.len().saturating_sub(self.height);
        lines.drain(..excess.min(HEADER_ROWS));
        lines
    }

    /// Redraw the whole frame.
    pub fn draw(&mut self, panel: &mut ChatPanel) -> Result<()> {
        self.fit();
        let lines = self.render(panel);
        self.screen.show(&lines)?;
        Ok(())
    }

    fn fit(&mut self) {
        let (rows, cols) = self.screen.size().unwrap_or(FALLBACK_SIZE);
        self.width = usize::from(self.pinned_width.unwrap_or(cols)).max(MIN_WIDTH);
        self.height = usize::from(self.pinned_height.unwrap_or(rows)).max(MIN_HEIGHT);
    }

    fn center(&self, text: &str) -> String {
        pad_str(text, self.width, console::Alignment::Center, None).into_owned()
    }

    fn input_line(&self, view: &PanelView) -> String {
        let button = format!("[{}]", view.send_label);
        let used = 2 + measure_text_width(&view.input) + button.len();
        let button = if view.send_disabled {
            style(button).dim()
        } else {
            style(button).bold()
        };
        let prompt = if view.input_disabled { "…" } else { ">" };
        let gap = self.width.saturating_sub(used).max(1);
        format!("{prompt} {}{}{button}", sanitize(&view.input), " ".repeat(gap))
    }
}

fn paint(row: &Row) -> String {
    let tone = match row.tone {
        Some(Tone::Accent) => Style::new().white().bright().on_blue(),
        Some(Tone::Neutral) => Style::new().black().on_white(),
        None => return String::new(),
    };
    format!("{}{}", " ".repeat(row.indent), tone.apply_to(&row.text))
}

/// Mount the panel and run until `/quit` or end of `input`.
///
/// Sends run in the background of the loop: lines typed while a send is in
/// flight go through the panel's loading guard instead of racing it. A send
/// still in flight when input ends is finished before returning.
pub async fn run<B, S, R>(backend: &B, shell: &mut Shell<S>, input: R) -> Result<()>
where
    B: ChatBackend + ?Sized,
    S: Screen,
    R: AsyncBufRead + Unpin,
{
    let mut panel = ChatPanel::new();
    shell.set_notice("Loading conversation...");
    shell.draw(&mut panel)?;

    panel.load(backend).await;
    shell.draw(&mut panel)?;

    let mut lines = input.lines();
    let mut in_flight: Option<BoxFuture<'_, Result<SendMessageResponse>>> = None;

    loop {
        tokio::select! {
            Some(outcome) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                in_flight = None;
                panel.complete_send(outcome);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!(name: "shell.input.closed", "Input closed");
                    break;
                };

                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Submit(text) => {
                        if !text.trim().is_empty() {
                            panel.set_input(text);
                        }
                        if let Some(content) = panel.begin_send() {
                            in_flight = Some(dispatch(backend, content).boxed());
                        } else if panel.is_loading() {
                            shell.set_notice("Still sending, press Enter again once the reply arrives");
                        }
                    }
                    Command::RefreshCost => panel.refresh_cost(backend).await,
                    Command::Status => match backend.health().await {
                        Ok(health) => shell.set_notice(format!("{}: {}", health.status, health.message)),
                        Err(e) => {
                            warn!(name: "shell.status.failed", error = %e, "Backend status check failed");
                            shell.set_notice(format!("Backend unreachable: {e}"));
                        }
                    },
                    Command::ScrollUp => shell.page(&panel, false),
                    Command::ScrollDown => shell.page(&panel, true),
                }
            }
        }

        shell.draw(&mut panel)?;
    }

    if let Some(pending) = in_flight.take() {
        debug!(name: "shell.send.draining", "Waiting for the reply in flight");
        panel.complete_send(pending.await);
        shell.draw(&mut panel)?;
    }

    info!(name: "shell.exited", messages = panel.messages().len(), "Chat closed");
    Ok(())
}
