use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Field, Protocol, ValidationIssue};

/// Malformed source text.
///
/// `line` and `column` are 1-based. Grammars report them relative to the
/// record text they were given; the batch runner rebases lines onto the
/// whole input.
///
/// # Examples
/// ```
/// use camconv_core::{Field, Protocol};
///
/// let err = Protocol::Cccam.parse("C: host port user pass").unwrap_err();
/// assert_eq!(err.field, Field::Port);
/// assert!(err.to_string().contains("port"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("line {line}, column {column}: invalid {field}: {message}")]
pub struct ParseError {
    pub field: Field,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(field: Field, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            field,
            message: message.into(),
            line,
            column,
        }
    }
}

/// Target protocol cannot represent a mandatory field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("cannot format {field} as {protocol}: {message}")]
pub struct FormatError {
    pub protocol: Protocol,
    pub field: Field,
    pub message: String,
}

impl FormatError {
    pub fn new(protocol: Protocol, field: Field, message: impl Into<String>) -> Self {
        Self {
            protocol,
            field,
            message: message.into(),
        }
    }
}

/// Unsupported protocol requested; raised before any parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigurationError {
    #[error("unsupported protocol '{name}' (expected cccam, newcamd, mgcamd or oscam)")]
    UnknownProtocol { name: String },
}

/// Pipeline stage that stopped a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Parse,
    Validation,
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Parse => f.write_str("parse"),
            ErrorKind::Validation => f.write_str("validation"),
            ErrorKind::Format => f.write_str("format"),
        }
    }
}

/// Structured per-record failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} error in {field}: {message}")]
pub struct ConversionError {
    pub kind: ErrorKind,
    /// First offending field.
    pub field: Field,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Every error-severity issue, for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

impl ConversionError {
    /// Build a validation failure from a non-empty list of error issues.
    pub(crate) fn validation(issues: Vec<ValidationIssue>) -> Self {
        let (field, message) = match issues.as_slice() {
            [only] => (only.field, only.message.clone()),
            [first, ..] => (
                first.field,
                issues
                    .iter()
                    .map(|issue| format!("{}: {}", issue.field, issue.message))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            [] => (Field::Record, "record rejected".to_string()),
        };
        Self {
            kind: ErrorKind::Validation,
            field,
            message,
            line: None,
            column: None,
            issues,
        }
    }

    /// Shift the reported line by `offset` lines.
    pub(crate) fn rebase_line(mut self, offset: usize) -> Self {
        self.line = self.line.map(|line| line + offset);
        self
    }
}

impl From<ParseError> for ConversionError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: ErrorKind::Parse,
            field: err.field,
            message: err.message,
            line: Some(err.line),
            column: Some(err.column),
            issues: Vec::new(),
        }
    }
}

impl From<FormatError> for ConversionError {
    fn from(err: FormatError) -> Self {
        Self {
            kind: ErrorKind::Format,
            field: err.field,
            message: err.message,
            line: None,
            column: None,
            issues: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_converts_with_position() {
        let parse = ParseError::new(Field::Port, "port must be numeric", 1, 17);
        let err = ConversionError::from(parse);
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.line, Some(1));
        assert_eq!(err.column, Some(17));
        assert_eq!(err.rebase_line(4).line, Some(5));
    }

    #[test]
    fn validation_error_lists_every_issue() {
        let err = ConversionError::validation(vec![
            ValidationIssue::error(Field::Port, "port 0 is out of range"),
            ValidationIssue::error(Field::Host, "host is empty"),
        ]);
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.field, Field::Port);
        assert_eq!(err.issues.len(), 2);
        assert!(err.message.contains("host: host is empty"));
    }

    #[test]
    fn conversion_error_json_omits_empty_fields() {
        let err = ConversionError::from(FormatError::new(
            Protocol::Oscam,
            Field::Host,
            "host must not contain ','",
        ));
        let value = serde_json::to_value(&err).expect("error json");
        assert_eq!(value["kind"], "format");
        assert!(value.get("line").is_none());
        assert!(value.get("issues").is_none());
    }
}
