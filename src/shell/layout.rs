//! Terminal layout: bubble wrapping, alignment and the scroll viewport.

use std::ops::Range;

use console::{measure_text_width, pad_str, strip_ansi_codes};

use crate::panel::{Alignment, Bubble, Tone};

/// Bubbles never take more than this share of the frame width (percent).
const BUBBLE_MAX_WIDTH_PCT: usize = 70;

/// Narrowest bubble body, whatever the frame width.
const MIN_BUBBLE_WIDTH: usize = 10;

/// One laid-out transcript row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Columns of blank space before the bubble.
    pub indent: usize,
    /// Bubble body, padded to the bubble's width. Empty for spacer rows.
    pub text: String,
    /// `None` for spacer rows.
    pub tone: Option<Tone>,
}

impl Row {
    fn spacer() -> Self {
        Self {
            indent: 0,
            text: String::new(),
            tone: None,
        }
    }

    /// Columns the row occupies on screen, indent included.
    pub fn width(&self) -> usize {
        self.indent + measure_text_width(&self.text)
    }
}

/// Make message text safe to print: escape sequences are removed, tabs become
/// spaces and any other control character is dropped.
pub fn sanitize(text: &str) -> String {
    strip_ansi_codes(text)
        .chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

fn char_width(c: char) -> usize {
    let mut buf = [0; 4];
    measure_text_width(c.encode_utf8(&mut buf))
}

/// Greedy word wrap to `width` display columns; words wider than a line are
/// split. Wide glyphs (CJK, emoji) count as two columns.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(2);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut used = 0;

        for word in paragraph.split_whitespace() {
            let word_width = measure_text_width(word);

            if used > 0 && used + 1 + word_width > width {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }

            if word_width <= width {
                if used > 0 {
                    line.push(' ');
                    used += 1;
                }
                line.push_str(word);
                used += word_width;
                continue;
            }

            // Too wide for a line of its own: hard-split by columns.
            if used > 0 {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            for c in word.chars() {
                let w = char_width(c);
                if used + w > width {
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                }
                line.push(c);
                used += w;
            }
        }

        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Lay out bubbles for a frame `width` columns wide.
///
/// Each bubble is one column of padding either side of its wrapped text, and
/// bubbles are separated by a spacer row.
pub fn layout(bubbles: &[Bubble], width: usize) -> Vec<Row> {
    let max_body = (width * BUBBLE_MAX_WIDTH_PCT / 100)
        .saturating_sub(2)
        .max(MIN_BUBBLE_WIDTH);
    let mut rows = Vec::new();

    for (i, bubble) in bubbles.iter().enumerate() {
        if i > 0 {
            rows.push(Row::spacer());
        }

        let lines = wrap(&sanitize(&bubble.text), max_body);
        let body = lines
            .iter()
            .map(|l| measure_text_width(l))
            .max()
            .unwrap_or(0);
        let outer = body + 2;
        let indent = match bubble.alignment {
            Alignment::Left => 0,
            Alignment::Right => width.saturating_sub(outer),
        };

        for line in lines {
            let padded = pad_str(&line, body, console::Alignment::Left, None);
            rows.push(Row {
                indent,
                text: format!(" {padded} "),
                tone: Some(bubble.tone),
            });
        }
    }

    rows
}

/// Vertical scroll position of the message viewport.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollState {
    top: usize,
}

impl ScrollState {
    /// Pin the viewport to the last row.
    pub fn scroll_to_end(&mut self, total: usize, height: usize) {
        self.top = total.saturating_sub(height);
    }

    /// Move by `delta` rows, clamped to the transcript.
    pub fn scroll_by(&mut self, delta: isize, total: usize, height: usize) {
        let max_top = total.saturating_sub(height);
        self.top = self.top.saturating_add_signed(delta).min(max_top);
    }

    /// Rows visible in a viewport `height` rows tall.
    pub fn window(self, total: usize, height: usize) -> Range<usize> {
        let top = self.top.min(total.saturating_sub(height));
        top..(top + height).min(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bubble(text: &str, alignment: Alignment) -> Bubble {
        Bubble {
            text: text.into(),
            alignment,
            tone: match alignment {
                Alignment::Left => Tone::Neutral,
                Alignment::Right => Tone::Accent,
            },
        }
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("you are doing great today", 10),
            ["you are", "doing", "great", "today"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        assert_eq!(wrap("one\ntwo", 20), ["one", "two"]);
    }

    #[test]
    fn test_wrap_counts_wide_glyphs_as_two_columns() {
        assert_eq!(wrap("你好世界加油", 4), ["你好", "世界", "加油"]);
        assert_eq!(wrap("加油 ok", 7), ["加油 ok"]);
        assert_eq!(wrap("加油 ok", 6), ["加油", "ok"]);
    }

    #[test]
    fn test_wide_text_stays_inside_bubble() {
        let text = "你真的很棒，今天也辛苦了，继续加油吧！".repeat(3);
        let rows = layout(&[bubble(&text, Alignment::Right)], 40);

        assert!(rows.len() > 1);
        for row in &rows {
            assert_eq!(row.width(), 40);
        }
    }

    #[test]
    fn test_sanitize_drops_escape_sequences_and_controls() {
        assert_eq!(sanitize("\x1b[2J\x1b[31mboom\x1b[0m\x07"), "boom");
        assert_eq!(sanitize("a\tb\nc"), "a b\nc");

        let rows = layout(&[bubble("\x1b[2Jhi", Alignment::Left)], 40);
        assert_eq!(rows[0].text, " hi ");
    }

    #[test]
    fn test_user_bubble_hugs_right_edge() {
        let rows = layout(&[bubble("hello", Alignment::Right)], 40);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, " hello ");
        assert_eq!(rows[0].width(), 40);
        assert_eq!(rows[0].tone, Some(Tone::Accent));
    }

    #[test]
    fn test_assistant_bubble_hugs_left_edge() {
        let rows = layout(&[bubble("hey!", Alignment::Left)], 40);
        assert_eq!(rows[0].indent, 0);
        assert_eq!(rows[0].tone, Some(Tone::Neutral));
    }

    #[test]
    fn test_bubbles_capped_and_separated() {
        let long = "word ".repeat(40);
        let rows = layout(
            &[bubble(&long, Alignment::Left), bubble("ok", Alignment::Right)],
            50,
        );

        let widest = rows.iter().map(Row::width).max().unwrap();
        assert!(widest <= 35);
        assert!(rows.iter().any(|r| r.tone.is_none()));
        assert_eq!(rows.last().unwrap().text, " ok ");
    }

    #[test]
    fn test_scroll_to_end_shows_last_rows() {
        let mut scroll = ScrollState::default();
        scroll.scroll_to_end(30, 10);
        assert_eq!(scroll.window(30, 10), 20..30);

        scroll.scroll_by(-5, 30, 10);
        assert_eq!(scroll.window(30, 10), 15..25);

        scroll.scroll_by(100, 30, 10);
        assert_eq!(scroll.window(30, 10), 20..30);
    }

    #[test]
    fn test_short_transcript_fits_viewport() {
        let mut scroll = ScrollState::default();
        scroll.scroll_to_end(3, 10);
        assert_eq!(scroll.window(3, 10), 0..3);
    }
}
