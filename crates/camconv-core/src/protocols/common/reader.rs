use crate::error::ParseError;
use crate::model::Field;

/// Whitespace-separated token with its 1-based column in the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub column: usize,
}

/// Tokenizer for the single-line `X: host port user pass ...` formats.
///
/// The reader owns the protocol conventions shared by C-, N- and M-lines:
/// keyword matching, token counts and port decoding. Parsers only map tokens
/// to record fields.
#[derive(Debug)]
pub struct LineReader<'a> {
    line: &'a str,
    line_no: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> LineReader<'a> {
    /// Open a single-record text, requiring the `keyword:` prefix.
    ///
    /// Leading and trailing blank or comment lines are tolerated; a second
    /// record line is not.
    pub fn open(text: &'a str, keyword: char) -> Result<Self, ParseError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !is_blank_or_comment(line));
        let Some((index, line)) = lines.next() else {
            return Err(ParseError::new(Field::Record, "no record found", 1, 1));
        };
        if let Some((extra, _)) = lines.next() {
            return Err(ParseError::new(
                Field::Record,
                "expected a single record line",
                extra + 1,
                1,
            ));
        }
        let line_no = index + 1;

        let body_start = strip_keyword(line, keyword).ok_or_else(|| {
            let column = first_non_space_column(line);
            ParseError::new(
                Field::Keyword,
                format!("expected `{}:` keyword", keyword.to_ascii_uppercase()),
                line_no,
                column,
            )
        })?;

        Ok(Self {
            line,
            line_no,
            tokens: split_tokens(line, body_start),
        })
    }

    /// Require between `min` and `max` value tokens after the keyword.
    pub fn require_count(&self, min: usize, max: usize) -> Result<(), ParseError> {
        let count = self.tokens.len();
        if count >= min && count <= max {
            return Ok(());
        }
        let (field, column) = if count < min {
            // `C: 12000 user pass`: the host slot holds the port.
            if let Some(first) = self.tokens.first().filter(|token| is_numeric(token.text)) {
                return Err(self.error(Field::Host, "host is missing", first.column));
            }
            // `C: host user pass`: the port slot holds the username.
            if let Some(second) = self.tokens.get(1).filter(|token| !is_numeric(token.text)) {
                return Err(self.error(Field::Port, "port is missing", second.column));
            }
            (missing_field(count), self.end_column())
        } else {
            (Field::Record, self.tokens[max].column)
        };
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        Err(self.error(
            field,
            format!("expected {expected} fields after keyword, found {count}"),
            column,
        ))
    }

    pub fn token(&self, index: usize) -> Option<Token<'a>> {
        self.tokens.get(index).copied()
    }

    /// Token text at `index`, empty when absent. Call after `require_count`.
    pub fn value(&self, index: usize) -> &'a str {
        self.tokens.get(index).map_or("", |token| token.text)
    }

    pub fn read_port(&self, index: usize) -> Result<u32, ParseError> {
        let token = self.token(index).ok_or_else(|| {
            self.error(Field::Port, "missing port", self.end_column())
        })?;
        decode_port(token.text).map_err(|message| self.error(Field::Port, message, token.column))
    }

    pub fn error(&self, field: Field, message: impl Into<String>, column: usize) -> ParseError {
        ParseError::new(field, message, self.line_no, column)
    }

    fn end_column(&self) -> usize {
        self.line.chars().count() + 1
    }
}

fn is_numeric(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

fn missing_field(count: usize) -> Field {
    match count {
        0 => Field::Host,
        1 => Field::Port,
        2 => Field::Username,
        _ => Field::Password,
    }
}

/// Decode a port token, enforcing `1..=65535`.
pub fn decode_port(text: &str) -> Result<u32, String> {
    if text.is_empty() {
        return Err("port is empty".to_string());
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("port '{text}' is not numeric"));
    }
    match text.parse::<u32>() {
        Ok(port) if (1..=65535).contains(&port) => Ok(port),
        _ => Err(format!("port {text} is out of range 1..=65535")),
    }
}

/// Blank lines and full-line `#`/`;` comments carry no record.
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Byte offset just past `keyword:` (case-insensitive, spaces around `:`).
pub fn strip_keyword(line: &str, keyword: char) -> Option<usize> {
    let lead = line.len() - line.trim_start().len();
    let mut chars = line[lead..].char_indices();
    let (_, first) = chars.next()?;
    if !first.eq_ignore_ascii_case(&keyword) {
        return None;
    }
    let rest_start = lead + first.len_utf8();
    let rest = &line[rest_start..];
    let spaces = rest.len() - rest.trim_start().len();
    let after_spaces = &rest[spaces..];
    if !after_spaces.starts_with(':') {
        return None;
    }
    Some(rest_start + spaces + 1)
}

fn split_tokens(line: &str, start: usize) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut token_start = None;
    for (offset, ch) in line[start..].char_indices() {
        let idx = start + offset;
        if ch.is_whitespace() {
            if let Some(begin) = token_start.take() {
                tokens.push(Token {
                    text: &line[begin..idx],
                    column: column_at(line, begin),
                });
            }
        } else if token_start.is_none() {
            token_start = Some(idx);
        }
    }
    if let Some(begin) = token_start {
        tokens.push(Token {
            text: &line[begin..],
            column: column_at(line, begin),
        });
    }
    tokens
}

pub fn column_at(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count() + 1
}

fn first_non_space_column(line: &str) -> usize {
    column_at(line, line.len() - line.trim_start().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_is_case_insensitive_and_space_tolerant() {
        let reader = LineReader::open("  c :host 1 u p", 'C').unwrap();
        let texts: Vec<_> = reader.tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, ["host", "1", "u", "p"]);
        assert_eq!(reader.tokens[0].column, 6);
    }

    #[test]
    fn wrong_keyword_is_reported() {
        let err = LineReader::open("N: host 1 u p", 'C').unwrap_err();
        assert_eq!(err.field, Field::Keyword);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn second_record_line_is_rejected() {
        let err = LineReader::open("C: a 1 u p\nC: b 2 u p", 'C').unwrap_err();
        assert_eq!(err.field, Field::Record);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn comments_around_record_are_ignored() {
        let reader = LineReader::open("# header\n\nC: a 1 u p\n", 'C').unwrap();
        assert_eq!(reader.tokens.len(), 4);
        let err = reader.error(Field::Host, "x", 1);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn short_line_names_missing_field() {
        let reader = LineReader::open("C: host 12000 user", 'C').unwrap();
        let err = reader.require_count(4, 5).unwrap_err();
        assert_eq!(err.field, Field::Password);
    }

    #[test]
    fn word_in_port_slot_means_missing_port() {
        let reader = LineReader::open("C: 10.0.0.1 user pass", 'C').unwrap();
        let err = reader.require_count(4, 5).unwrap_err();
        assert_eq!(err.field, Field::Port);
        assert_eq!(err.column, 13);
        assert_eq!(err.message, "port is missing");
    }

    #[test]
    fn leading_port_means_missing_host() {
        let reader = LineReader::open("C: 12000 user pass", 'C').unwrap();
        let err = reader.require_count(4, 5).unwrap_err();
        assert_eq!(err.field, Field::Host);
        assert_eq!(err.column, 4);
    }

    #[test]
    fn port_decoding() {
        assert_eq!(decode_port("1"), Ok(1));
        assert_eq!(decode_port("65535"), Ok(65535));
        assert!(decode_port("0").unwrap_err().contains("out of range"));
        assert!(decode_port("65536").unwrap_err().contains("out of range"));
        assert!(decode_port("99999999999").unwrap_err().contains("out of range"));
        assert!(decode_port("12a").unwrap_err().contains("not numeric"));
    }
}
