//! Subscription page extraction.
//!
//! An `Extractor` turns raw page bytes into an `ExtractedRecord`. Errors are
//! split into structural failures (sid unknown) and field validation
//! failures (sid known). Only a rejected quota with a known sid leads to a
//! published `Down` record; see `ExtractError::rejected_sid`.

mod template;

use thiserror::Error;

use crate::error::FailureKind;
use crate::record::ExtractedRecord;

pub use template::TemplateExtractor;

/// Upper bound on the raw body echoed into logs after a failed extraction.
pub const PREVIEW_LIMIT: usize = 500;

/// Numeric attributes of the subscription template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Downloaded,
    Uploaded,
    Quota,
    Expiry,
}

impl Field {
    /// HTML attribute carrying this field.
    pub fn attr(self) -> &'static str {
        match self {
            Field::Downloaded => "data-downloadbyte",
            Field::Uploaded => "data-uploadbyte",
            Field::Quota => "data-totalbyte",
            Field::Expiry => "data-expire",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("template#subscription-data not found")]
    TemplateNotFound,
    #[error("data-sid attribute missing or empty")]
    MissingSid,
    #[error("attribute {} not found", .0.attr())]
    MissingField(Field),
    #[error("{}: invalid integer value {value:?}", field.attr())]
    NotAnInteger { field: Field, value: String },
    #[error("{} out of range for sid {sid} (got {value})", field.attr())]
    Invalid { sid: String, field: Field, value: i64 },
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::Invalid { field: Field::Quota, .. } => FailureKind::Validation,
            ExtractError::Invalid { .. } => FailureKind::InvalidField,
            _ => FailureKind::Structural,
        }
    }

    /// Sid of a subscription whose quota was rejected, if that is the failure.
    pub fn rejected_sid(&self) -> Option<&str> {
        match self {
            ExtractError::Invalid { sid, field: Field::Quota, .. } => Some(sid),
            _ => None,
        }
    }
}

/// Structured extraction from one fetched document.
pub trait Extractor: Send + Sync {
    fn extract(&self, body: &[u8]) -> Result<ExtractedRecord, ExtractError>;
}

/// Lossy UTF-8 view of at most `PREVIEW_LIMIT` bytes, suffixed with `...`
/// when the body was cut.
pub fn body_preview(body: &[u8]) -> String {
    let head = body.get(..PREVIEW_LIMIT).unwrap_or(body);
    let mut out = String::from_utf8_lossy(head).into_owned();
    if body.len() > PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}
