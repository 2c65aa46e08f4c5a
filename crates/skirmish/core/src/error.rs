//! Common error infrastructure for skirmish-core.
//!
//! Each area defines its own error enum next to the code that produces it
//! (`ComponentError`, `HandlerError`, `ChainError`, `ResolveError`). This module
//! provides the shared classification used by embedders to decide whether a
//! failure should be logged, retried or treated as a configuration bug.
//!
//! Stale references (an action that left its queue, an actor that no longer
//! exists) are not errors at all: lookups return `Option`/`bool`.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The world changed under the caller; trying again later may succeed.
    Recoverable,

    /// The request itself is invalid and should not be retried unchanged.
    ///
    /// Examples: removing a component another component depends on.
    Validation,

    /// A handler or chain misbehaved; the pass was aborted.
    Internal,

    /// The actor composition is broken (a required component cannot be built).
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or broken configuration.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all skirmish-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Keep `error_code` stable; it is used in logs and tests
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
