//! Explicit per-call configuration.
//!
//! Passed into every mutating or evaluating entry point instead of being
//! read from process-wide state.

/// Knobs threaded through the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Context {
    /// Run schema assertions after every mutation.
    pub validate: bool,
}

impl Context {
    /// No validation. What a shipped build uses.
    pub const fn release() -> Self {
        Self { validate: false }
    }

    /// Validate after every mutation.
    pub const fn debug() -> Self {
        Self { validate: true }
    }

    pub const fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}
