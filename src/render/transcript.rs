//! Transcript: Ring-buffered markup lines with a pixel scroll model.
//!
//! This is the in-memory display surface. It stores rendered markup line
//! by line, discards the oldest lines once a scrollback limit is reached,
//! and models the viewer's scroll position in pixels so the renderer's
//! stick-to-bottom policy has something concrete to measure against.

use std::collections::VecDeque;

use super::surface::Surface;

/// Default scrollback limit, in lines.
const DEFAULT_MAX_LINES: usize = 10_000;

/// Default rendered height of one line, in pixels.
const DEFAULT_LINE_HEIGHT: u32 = 16;

/// Default viewport height, in pixels.
const DEFAULT_VIEWPORT_HEIGHT: u32 = 480;

/// Ring buffer of markup lines with a bounded scrollback.
///
/// The last line is the one currently being appended to; a newline in the
/// appended markup starts a new line and may push the oldest one out.
#[derive(Debug)]
pub struct Transcript {
    /// Markup lines, oldest first.
    lines: VecDeque<String>,
    /// Maximum number of lines to retain.
    max_lines: usize,
    /// Rendered height of a single line in pixels.
    line_height: u32,
    /// Visible height of the surface in pixels.
    viewport_height: u32,
    /// Current scroll offset from the top of the content, in pixels.
    scroll_top: u32,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES, DEFAULT_LINE_HEIGHT, DEFAULT_VIEWPORT_HEIGHT)
    }
}

impl Transcript {
    /// Create a transcript with the given scrollback limit and geometry.
    pub fn new(max_lines: usize, line_height: u32, viewport_height: u32) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(String::new());

        Self {
            lines,
            max_lines: max_lines.max(1),
            line_height: line_height.max(1),
            viewport_height,
            scroll_top: 0,
        }
    }

    /// Get the number of lines currently held, including the open one.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Total content height in pixels.
    #[allow(clippy::cast_possible_truncation)]
    pub fn content_height(&self) -> u32 {
        (self.lines.len() as u32).saturating_mul(self.line_height)
    }

    /// Iterate over the stored markup lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Check if the viewer is at the bottom of the content.
    pub fn at_bottom(&self) -> bool {
        self.scroll_top >= self.max_scroll()
    }

    /// Drop the oldest lines until the scrollback limit is respected.
    ///
    /// The scroll offset is pulled back by the trimmed height so the
    /// content under the viewport does not jump.
    fn trim(&mut self) {
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
            self.scroll_top = self.scroll_top.saturating_sub(self.line_height);
        }
    }
}

impl Surface for Transcript {
    fn append(&mut self, markup: &str) {
        let mut segments = markup.split('\n');

        // First segment extends the open line; the rest start new lines.
        if let (Some(first), Some(line)) = (segments.next(), self.lines.back_mut()) {
            line.push_str(first);
        }
        for segment in segments {
            self.lines.push_back(segment.to_string());
        }

        self.trim();
    }

    fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    fn max_scroll(&self) -> u32 {
        self.content_height().saturating_sub(self.viewport_height)
    }

    fn scroll_to(&mut self, offset: u32) {
        self.scroll_top = offset.min(self.max_scroll());
    }
}
