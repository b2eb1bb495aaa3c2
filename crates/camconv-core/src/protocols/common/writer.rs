use crate::error::FormatError;
use crate::model::{Field, Protocol};

/// Check that `value` fits a whitespace-delimited slot of `protocol`.
pub fn require_value<'a>(
    protocol: Protocol,
    field: Field,
    value: &'a str,
) -> Result<&'a str, FormatError> {
    if value.is_empty() {
        return Err(FormatError::new(protocol, field, format!("{field} is empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(FormatError::new(
            protocol,
            field,
            format!("{field} contains whitespace"),
        ));
    }
    Ok(value)
}

/// Builder for `X: a b c` lines with a single space between fields.
pub struct LineWriter {
    protocol: Protocol,
    line: String,
}

impl LineWriter {
    pub fn new(protocol: Protocol, keyword: char) -> Self {
        let mut line = String::with_capacity(64);
        line.push(keyword);
        line.push(':');
        Self { protocol, line }
    }

    pub fn field(mut self, field: Field, value: &str) -> Result<Self, FormatError> {
        let value = require_value(self.protocol, field, value)?;
        self.line.push(' ');
        self.line.push_str(value);
        Ok(self)
    }

    pub fn port(mut self, port: u32) -> Result<Self, FormatError> {
        if !(1..=65535).contains(&port) {
            return Err(FormatError::new(
                self.protocol,
                Field::Port,
                format!("port {port} is out of range 1..=65535"),
            ));
        }
        self.line.push(' ');
        self.line.push_str(&port.to_string());
        Ok(self)
    }

    pub fn finish(self) -> String {
        self.line
    }
}
