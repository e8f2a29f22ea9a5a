//! Debug tracing for a single conversion.
//!
//! A [`Trace`] is owned by whoever runs a conversion stage. When disabled,
//! every call is a no-op, so stages can trace unconditionally.

use std::fmt::Display;

use owo_colors::OwoColorize;

/// Per-conversion trace sink writing to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trace {
    enabled: bool,
}

impl Trace {
    /// Create a trace sink. Nothing is printed unless `enabled` is set.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A sink that never prints.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Returns true if this sink prints.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Print one event line: position in the input, event label, detail.
    pub fn event(&self, position: usize, label: &str, detail: impl Display) {
        if !self.enabled {
            return;
        }
        eprintln!("{:<8} {:>12}: {detail}", position, label.cyan());
    }

    /// Print a warning about tolerated input.
    ///
    /// # Example
    /// ```ignore
    /// trace.warn("tree builder", "unclosed <p> at end of input");
    /// ```
    pub fn warn(&self, component: &str, message: &str) {
        if !self.enabled {
            return;
        }
        let line = format!("[html2creole {component}] warning: {message}");
        eprintln!("{}", line.yellow());
    }

    /// Print a titled multi-line block, framed by rulers.
    pub fn block(&self, title: &str, body: &str) {
        if !self.enabled {
            return;
        }
        eprintln!("{}", "_".repeat(79));
        eprintln!("  {}", title.bold());
        eprintln!("{}", "=".repeat(79));
        eprintln!("{body}");
        eprintln!("{}", "*".repeat(79));
    }
}
