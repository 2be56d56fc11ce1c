//! Terminal color detection and formatting.
//!
//! Colors are disabled when NO_COLOR is set or when either output stream is
//! not a terminal, so agent logs stay free of escape codes.

use std::env;
use std::io::{self, IsTerminal};

/// ANSI color formatting, gated on terminal support.
#[derive(Debug, Clone, Copy)]
pub struct ColorSupport {
    enabled: bool,
}

impl ColorSupport {
    /// Detect color support automatically.
    pub fn detect() -> Self {
        let enabled = env::var("NO_COLOR").is_err()
            && io::stderr().is_terminal()
            && io::stdout().is_terminal();
        Self { enabled }
    }

    /// Force colors off, mainly for tests.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }
}
