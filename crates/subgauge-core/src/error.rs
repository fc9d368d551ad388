//! Shared error type across subgauge crates.

use thiserror::Error;

/// Why a target produced no `Up` record in a cycle (stable label values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Fetch exceeded its deadline.
    Timeout,
    /// Endpoint answered with a non-2xx status.
    Status,
    /// Connection, TLS, or body read failure.
    Transport,
    /// Target string is not a usable URL.
    InvalidUrl,
    /// Page did not contain the expected template or a required attribute.
    Structural,
    /// An attribute was present but out of range (sid known, no record kept).
    InvalidField,
    /// Quota rejected with a known sid; a `Down` record is published.
    Validation,
    /// The per-target task died before finishing.
    Panic,
}

impl FailureKind {
    /// Label value used in logs and the failure counter.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Status => "status",
            FailureKind::Transport => "transport",
            FailureKind::InvalidUrl => "invalid_url",
            FailureKind::Structural => "structural",
            FailureKind::InvalidField => "invalid_field",
            FailureKind::Validation => "validation",
            FailureKind::Panic => "panic",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, SubgaugeError>;

/// Process-level errors (configuration and bootstrap).
///
/// Per-target failures never become a `SubgaugeError`; they are counted and
/// logged by the refresher.
#[derive(Debug, Error)]
pub enum SubgaugeError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl SubgaugeError {
    /// Short stable code for startup diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            SubgaugeError::Config(_) => "CONFIG",
            SubgaugeError::UnsupportedVersion => "UNSUPPORTED_VERSION",
            SubgaugeError::Internal(_) => "INTERNAL",
        }
    }
}
