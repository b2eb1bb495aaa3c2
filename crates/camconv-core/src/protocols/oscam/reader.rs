use std::collections::HashSet;

use crate::error::ParseError;
use crate::model::Field;
use crate::protocols::common::is_blank_or_comment;
use crate::protocols::common::reader::column_at;

/// One `key = value` line of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<'a> {
    /// Key as written, trimmed.
    pub key: &'a str,
    pub value: &'a str,
    pub line: usize,
    pub key_column: usize,
    pub value_column: usize,
}

impl Setting<'_> {
    pub fn error(&self, field: Field, message: impl Into<String>) -> ParseError {
        ParseError::new(field, message, self.line, self.value_column)
    }

    /// Error pointing `offset` characters into the value.
    pub fn error_at(&self, field: Field, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(field, message, self.line, self.value_column + offset)
    }
}

/// A parsed `[section]` block: header position plus its settings in order.
#[derive(Debug)]
pub struct BlockReader<'a> {
    pub section: &'a str,
    pub header_line: usize,
    settings: Vec<Setting<'a>>,
}

impl<'a> BlockReader<'a> {
    /// Read exactly one block. Comments are skipped anywhere; a blank line
    /// ends the block and anything meaningful after it is a second record.
    pub fn open(text: &'a str) -> Result<Self, ParseError> {
        let mut lines = text.lines().enumerate().map(|(idx, line)| (idx + 1, line));

        let (header_line, section) = loop {
            let Some((line_no, line)) = lines.next() else {
                return Err(ParseError::new(Field::Record, "no record found", 1, 1));
            };
            if is_blank_or_comment(line) {
                continue;
            }
            let section = section_name(line).ok_or_else(|| {
                ParseError::new(
                    Field::Keyword,
                    "expected a `[reader]` section header",
                    line_no,
                    first_column(line),
                )
            })?;
            break (line_no, section);
        };

        let mut settings = Vec::new();
        let mut seen = HashSet::new();
        let mut closed = false;
        for (line_no, line) in lines {
            if line.trim().is_empty() {
                closed = true;
                continue;
            }
            if is_blank_or_comment(line) {
                continue;
            }
            if closed || section_name(line).is_some() {
                return Err(ParseError::new(
                    Field::Record,
                    "expected a single block",
                    line_no,
                    first_column(line),
                ));
            }
            let setting = read_setting(line, line_no)?;
            if !seen.insert(setting.key.to_ascii_lowercase()) {
                return Err(ParseError::new(
                    Field::Setting,
                    format!("duplicate setting '{}'", setting.key),
                    line_no,
                    setting.key_column,
                ));
            }
            settings.push(setting);
        }

        Ok(Self {
            section,
            header_line,
            settings,
        })
    }

    pub fn settings(&self) -> &[Setting<'a>] {
        &self.settings
    }

    /// Error anchored at the section header, for missing settings.
    pub fn header_error(&self, field: Field, message: impl Into<String>) -> ParseError {
        ParseError::new(field, message, self.header_line, 1)
    }
}

/// `[name]` with optional inner whitespace.
pub fn section_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.trim())
}

fn read_setting(line: &str, line_no: usize) -> Result<Setting<'_>, ParseError> {
    let Some((raw_key, raw_value)) = line.split_once('=') else {
        return Err(ParseError::new(
            Field::Setting,
            "expected `key = value`",
            line_no,
            first_column(line),
        ));
    };
    let key = raw_key.trim();
    if key.is_empty() {
        return Err(ParseError::new(
            Field::Setting,
            "setting name is empty",
            line_no,
            first_column(line),
        ));
    }
    let key_offset = raw_key.len() - raw_key.trim_start().len();
    let value = raw_value.trim();
    let value_start = raw_key.len() + 1 + (raw_value.len() - raw_value.trim_start().len());
    Ok(Setting {
        key,
        value,
        line: line_no,
        key_column: column_at(line, key_offset),
        value_column: column_at(line, value_start),
    })
}

fn first_column(line: &str) -> usize {
    column_at(line, line.len() - line.trim_start().len())
}
