//! Indent-aware text sink used by the renderers.
//!
//! [`IndentedEmitter`] accumulates the output of one file render into a
//! `String`. It tracks an indent depth and prefixes the first write of
//! every line with two spaces per level. Single-line constructs such as a
//! field declaration followed by an inline option list suspend indentation
//! with [`IndentedEmitter::without_indent`] so that continuation writes do
//! not pick up a prefix mid-line.

/// Indentation unit: two spaces per level.
const INDENT: &str = "  ";

/// Text sink with stack-discipline indentation.
#[derive(Debug, Default)]
pub struct IndentedEmitter {
    buf: String,
    depth: usize,
    at_line_start: bool,
}

impl IndentedEmitter {
    /// Creates an empty emitter positioned at the start of a line.
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            at_line_start: true,
        }
    }

    /// Increments the indent depth.
    pub fn indent(&mut self) {
        self.depth += 1;
    }

    /// Decrements the indent depth, clamped at zero.
    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Runs `body` with the indent depth forced to zero, restoring the
    /// prior depth on every exit path.
    pub fn without_indent<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::take(&mut self.depth);
        let result = body(self);
        self.depth = saved;
        result
    }

    /// Appends `text` to the current line, indent-prefixed if it starts a
    /// new line.
    pub fn write(&mut self, text: &str) {
        self.write_prefix();
        self.buf.push_str(text);
    }

    /// Writes `text` terminated by a newline, prefixed by the current
    /// indent if it starts a new line.
    pub fn write_line(&mut self, text: &str) {
        self.write_prefix();
        self.buf.push_str(text);
        self.buf.push('\n');
        self.at_line_start = true;
    }

    /// Emits a separator line with no indentation.
    pub fn blank_line(&mut self) {
        self.buf.push('\n');
        self.at_line_start = true;
    }

    /// Consumes the emitter, terminating any unfinished line.
    pub fn into_string(mut self) -> String {
        if !self.at_line_start && !self.buf.is_empty() {
            self.buf.push('\n');
        }
        self.buf
    }

    fn write_prefix(&mut self) {
        if self.at_line_start {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.at_line_start = false;
        }
    }
}
