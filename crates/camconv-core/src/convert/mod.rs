//! Conversion pipeline: parse with the source grammar, validate against the
//! target, format with the target grammar.
//!
//! Every stage is a pure function of its input. Identity conversions run the
//! full pipeline and double as a normalization check.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, ConversionError, ParseError};
use crate::model::{CredentialRecord, Field, Protocol, ValidationIssue};
use crate::protocols::common::is_blank_or_comment;
use crate::validate::validate;

pub mod batch;
pub mod document;

pub use batch::{
    BatchEntry, BatchOptions, BatchResult, Segment, convert_batch, convert_batch_auto,
    convert_batch_auto_with, convert_batch_with, split_detected, split_records,
};
pub use document::render_document;

/// Successful conversion of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Record as parsed from the source text.
    pub record: CredentialRecord,
    /// Record rendered in the target syntax.
    pub text: String,
    /// Non-blocking findings (defaulted key, generated label, dropped flags).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationIssue>,
}

/// Outcome for a single record.
pub type ConversionResult = Result<Conversion, ConversionError>;

/// Convert one record of `source` text into `target` syntax.
///
/// # Examples
/// ```
/// use camconv_core::{Protocol, convert_one};
///
/// let text = "C: 192.168.1.1 12000 user1 pass1";
/// let conversion = convert_one(text, Protocol::Cccam, Protocol::Newcamd)?;
/// assert_eq!(conversion.text, "N: 192.168.1.1 12000 user1 pass1 0102030405060708091011121314");
/// assert_eq!(conversion.warnings.len(), 1);
/// # Ok::<(), camconv_core::ConversionError>(())
/// ```
pub fn convert_one(text: &str, source: Protocol, target: Protocol) -> ConversionResult {
    debug!(%source, %target, "converting record");
    let record = source.parse(text)?;
    convert_record(record, target)
}

/// Validate and format an already-built record, e.g. one composed by a caller.
pub fn convert_record(record: CredentialRecord, target: Protocol) -> ConversionResult {
    let (errors, warnings): (Vec<_>, Vec<_>) = validate(&record, target)
        .into_iter()
        .partition(ValidationIssue::is_error);
    if !errors.is_empty() {
        return Err(ConversionError::validation(errors));
    }

    let text = target.format(&record)?;
    Ok(Conversion {
        record,
        text,
        warnings,
    })
}

/// Source name selecting per-record protocol detection.
pub const AUTO_SOURCE: &str = "auto";

/// Source/target pair resolved from protocol names.
///
/// Resolution fails fast, before any input is looked at. A source of
/// [`AUTO_SOURCE`] leaves `source` unset and detects it per record.
///
/// # Examples
/// ```
/// use camconv_core::{ConfigurationError, ConversionRequest};
///
/// let err = ConversionRequest::new("cccam", "Foo").unwrap_err();
/// assert!(matches!(err, ConfigurationError::UnknownProtocol { .. }));
///
/// let request = ConversionRequest::new("auto", "oscam")?;
/// assert_eq!(request.source, None);
/// # Ok::<(), ConfigurationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: Option<Protocol>,
    pub target: Protocol,
}

impl ConversionRequest {
    pub fn new(source: &str, target: &str) -> Result<Self, ConfigurationError> {
        let source = if source.trim().eq_ignore_ascii_case(AUTO_SOURCE) {
            None
        } else {
            Some(source.parse()?)
        };
        Ok(Self {
            source,
            target: target.parse()?,
        })
    }

    /// Convert one record; without a fixed source its first meaningful line
    /// decides the protocol.
    pub fn convert_one(&self, text: &str) -> ConversionResult {
        let source = match self.source {
            Some(source) => source,
            None => detect_record(text)?,
        };
        convert_one(text, source, self.target)
    }

    pub fn convert_batch(&self, text: &str) -> BatchResult {
        self.convert_batch_with(text, &BatchOptions::default())
    }

    pub fn convert_batch_with(&self, text: &str, options: &BatchOptions) -> BatchResult {
        match self.source {
            Some(source) => convert_batch_with(text, source, self.target, options),
            None => convert_batch_auto_with(text, self.target, options),
        }
    }
}

fn detect_record(text: &str) -> Result<Protocol, ParseError> {
    let Some((idx, line)) = text
        .lines()
        .enumerate()
        .find(|(_, line)| !is_blank_or_comment(line))
    else {
        return Err(ParseError::new(Field::Keyword, "record is empty", 1, 1));
    };
    Protocol::detect(line).ok_or_else(|| {
        ParseError::new(
            Field::Keyword,
            "expected a `C:`, `N:` or `M:` line or a `[section]` header",
            idx + 1,
            line.chars().take_while(|c| c.is_whitespace()).count() + 1,
        )
    })
}
