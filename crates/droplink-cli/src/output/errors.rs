//! Error message formatting with actionable suggestions.
//!
//! Renders a [`LinkError`] for the terminal: the main message, the
//! per-artifact breakdown of a failed run, a suggestion when one exists,
//! and the underlying cause chain.

use std::error::Error;

use droplink_core::LinkError;

use super::colors::ColorSupport;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    /// Create a formatter with explicit color support.
    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error with context and suggestions
    pub fn format_error(&self, error: &LinkError) -> String {
        let mut output = String::new();

        // Main error message
        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        // Per-artifact breakdown of a failed run
        if let LinkError::LinkRun { failures, .. } = error {
            for failure in failures {
                output.push_str(&format!(
                    "  {} {}: {}\n",
                    self.colors.red("✗"),
                    failure.artifact,
                    failure.error
                ));
            }
        }

        // Add a suggestion if one applies
        if let Some(suggestion) = self.suggestion_for(error) {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        // Add source chain if available
        let mut source = error.source();
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }

        output
    }

    /// Suggestion for the error itself, or for the first failed artifact
    /// that has one.
    fn suggestion_for<'e>(&self, error: &'e LinkError) -> Option<&'e str> {
        if let Some(suggestion) = error.suggestion() {
            return Some(suggestion);
        }
        if let LinkError::LinkRun { failures, .. } = error {
            return failures.iter().find_map(|f| f.error.suggestion());
        }
        None
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
