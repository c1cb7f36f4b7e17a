//! Structural validation results.
//!
//! [`Shape::check`](crate::Shape::check) never fails; it appends
//! [`Diagnostic`]s to a [`Diagnostics`] collector, which mirrors each one
//! to `tracing` and stops recording once its error cap is reached.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// The shape is degenerate and will render as nothing.
    Error,
    /// The shape renders but probably not as intended.
    Warning,
    /// Informational.
    Note,
}

/// A diagnostic message with severity and the shape path it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Human readable description.
    pub message: String,
    /// Path of the offending node, e.g. `and.a/cylinder`.
    pub context: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(severity: Severity, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            context: context.into(),
        }
    }
}

/// Default maximum number of recorded errors.
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Collector for diagnostics with a cap on recorded errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    max_errors: usize,
    errors: usize,
    capped: bool,
}

impl Diagnostics {
    /// Empty collector that records at most `max_errors` errors.
    pub fn new(max_errors: usize) -> Self {
        Self {
            items: Vec::new(),
            max_errors,
            errors: 0,
            capped: false,
        }
    }

    /// Record a diagnostic, logging it at the matching level.
    pub fn push(&mut self, d: Diagnostic) {
        if self.capped {
            return;
        }
        match d.severity {
            Severity::Error => {
                if self.errors >= self.max_errors {
                    self.capped = true;
                    warn!(max_errors = self.max_errors, "diagnostic error cap reached");
                    return;
                }
                self.errors += 1;
                error!(context = %d.context, "{}", d.message);
            }
            Severity::Warning => warn!(context = %d.context, "{}", d.message),
            Severity::Note => debug!(context = %d.context, "{}", d.message),
        }
        self.items.push(d);
    }

    /// Record an error.
    pub fn error(&mut self, context: &str, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Error, message, context));
    }

    /// Record a warning.
    pub fn warning(&mut self, context: &str, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Warning, message, context));
    }

    /// Record a note.
    pub fn note(&mut self, context: &str, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Note, message, context));
    }

    /// Whether no errors were recorded.
    pub fn is_ok(&self) -> bool {
        self.errors == 0 && !self.capped
    }

    /// Number of recorded errors.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Whether the error cap was hit and later diagnostics were dropped.
    pub fn capped(&self) -> bool {
        self.capped
    }

    /// Recorded diagnostics in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of recorded diagnostics of any severity.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the recorded diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

/// Validate that a value is finite, recording an error otherwise.
pub(crate) fn finite(diag: &mut Diagnostics, ctx: &str, what: &str, v: f64) -> bool {
    if v.is_finite() {
        true
    } else {
        diag.error(ctx, format!("{what} is not finite ({v})"));
        false
    }
}

/// Validate that a radius-like value is finite and strictly positive.
pub(crate) fn positive(diag: &mut Diagnostics, ctx: &str, what: &str, v: f64) -> bool {
    if v.is_finite() && v > 0.0 {
        true
    } else {
        diag.error(ctx, format!("{what} must be positive, got {v}"));
        false
    }
}
