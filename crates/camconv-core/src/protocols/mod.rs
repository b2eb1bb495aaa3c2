//! Protocol grammars.
//!
//! Each protocol follows the same layered structure:
//! - `layout`: keywords, field slots, limits and defaults (source of truth)
//! - `reader`: tokenizing and protocol conventions (shared by the line formats)
//! - `parser`: text to [`CredentialRecord`]
//! - `writer`: [`CredentialRecord`] to text
//!
//! Grammars are pure: no I/O, no shared state. [`Protocol::parse`] and
//! [`Protocol::format`] dispatch over the closed protocol set.

pub mod cccam;
pub(crate) mod common;
pub mod mgcamd;
pub mod newcamd;
pub mod oscam;

use crate::error::{FormatError, ParseError};
use crate::model::{CredentialRecord, Protocol};

pub use cccam::CccamGrammar;
pub use mgcamd::MgcamdGrammar;
pub use newcamd::NewcamdGrammar;
pub use oscam::OscamGrammar;

/// Parse/format capability pair implemented by every protocol.
pub trait Grammar {
    const PROTOCOL: Protocol;

    /// Parse exactly one record in this protocol's syntax.
    fn parse(text: &str) -> Result<CredentialRecord, ParseError>;

    /// Render `record` in this protocol's syntax, applying its defaults.
    fn format(record: &CredentialRecord) -> Result<String, FormatError>;
}

impl Protocol {
    /// Parse one record with this protocol's grammar.
    ///
    /// # Examples
    /// ```
    /// use camconv_core::Protocol;
    ///
    /// let record = Protocol::Cccam.parse("C: 192.168.1.1 12000 user1 pass1")?;
    /// assert_eq!(record.host, "192.168.1.1");
    /// # Ok::<(), camconv_core::ParseError>(())
    /// ```
    pub fn parse(self, text: &str) -> Result<CredentialRecord, ParseError> {
        match self {
            Protocol::Cccam => CccamGrammar::parse(text),
            Protocol::Newcamd => NewcamdGrammar::parse(text),
            Protocol::Mgcamd => MgcamdGrammar::parse(text),
            Protocol::Oscam => OscamGrammar::parse(text),
        }
    }

    /// Render one record with this protocol's grammar.
    pub fn format(self, record: &CredentialRecord) -> Result<String, FormatError> {
        match self {
            Protocol::Cccam => CccamGrammar::format(record),
            Protocol::Newcamd => NewcamdGrammar::format(record),
            Protocol::Mgcamd => MgcamdGrammar::format(record),
            Protocol::Oscam => OscamGrammar::format(record),
        }
    }

    /// Maximum username/password length accepted by this protocol.
    pub fn max_credential_len(self) -> usize {
        match self {
            Protocol::Cccam => cccam::layout::MAX_CREDENTIAL_LEN,
            Protocol::Newcamd => newcamd::layout::MAX_CREDENTIAL_LEN,
            Protocol::Mgcamd => mgcamd::layout::MAX_CREDENTIAL_LEN,
            Protocol::Oscam => oscam::layout::MAX_CREDENTIAL_LEN,
        }
    }

    /// Line keyword (`C`, `N`, `M`), or `None` for block formats.
    pub fn keyword(self) -> Option<char> {
        match self {
            Protocol::Cccam => Some(cccam::layout::KEYWORD),
            Protocol::Newcamd => Some(newcamd::layout::KEYWORD),
            Protocol::Mgcamd => Some(mgcamd::layout::KEYWORD),
            Protocol::Oscam => None,
        }
    }

    /// Protocol announced by a record's first line: a `C:`, `N:` or `M:`
    /// keyword (case-insensitive, spaces around `:`) or a `[section]` header.
    ///
    /// # Examples
    /// ```
    /// use camconv_core::Protocol;
    ///
    /// assert_eq!(Protocol::detect("  n : h 15000 u p"), Some(Protocol::Newcamd));
    /// assert_eq!(Protocol::detect("[reader]"), Some(Protocol::Oscam));
    /// assert_eq!(Protocol::detect("# comment"), None);
    /// ```
    pub fn detect(line: &str) -> Option<Protocol> {
        if oscam::section_name(line).is_some() {
            return Some(Protocol::Oscam);
        }
        Protocol::ALL.into_iter().find(|protocol| {
            protocol
                .keyword()
                .is_some_and(|keyword| common::strip_keyword(line, keyword).is_some())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{CredentialRecord, Protocol};

    #[test]
    fn grammar_trait_constants_match_dispatch() {
        use super::{CccamGrammar, Grammar, MgcamdGrammar, NewcamdGrammar, OscamGrammar};
        assert_eq!(CccamGrammar::PROTOCOL, Protocol::Cccam);
        assert_eq!(NewcamdGrammar::PROTOCOL, Protocol::Newcamd);
        assert_eq!(MgcamdGrammar::PROTOCOL, Protocol::Mgcamd);
        assert_eq!(OscamGrammar::PROTOCOL, Protocol::Oscam);
    }

    #[test]
    fn each_protocol_reparses_its_own_output() {
        for protocol in Protocol::ALL {
            let record = CredentialRecord::new(protocol, "10.1.2.3", 2000, "name", "secret");
            let text = protocol.format(&record).unwrap();
            let parsed = protocol.parse(&text).unwrap();
            assert_eq!(parsed.host, record.host, "{protocol}");
            assert_eq!(parsed.port, record.port, "{protocol}");
            assert_eq!(parsed.username, record.username, "{protocol}");
            assert_eq!(parsed.password, record.password, "{protocol}");
        }
    }

    #[test]
    fn detect_reads_keyword_or_header() {
        assert_eq!(Protocol::detect("C: h 1 u p"), Some(Protocol::Cccam));
        assert_eq!(Protocol::detect("m:h 1 u p"), Some(Protocol::Mgcamd));
        assert_eq!(Protocol::detect("  [ reader ]  "), Some(Protocol::Oscam));
        assert_eq!(Protocol::detect("X: h 1 u p"), None);
        assert_eq!(Protocol::detect("CN: h 1 u p"), None);
        assert_eq!(Protocol::detect("label = box"), None);
        assert_eq!(Protocol::detect(""), None);
    }

    #[test]
    fn every_rendered_record_is_detected_as_its_protocol() {
        for protocol in Protocol::ALL {
            let record = CredentialRecord::new(protocol, "10.1.2.3", 2000, "name", "secret");
            let text = protocol.format(&record).unwrap();
            let first = text.lines().next().unwrap_or_default();
            assert_eq!(Protocol::detect(first), Some(protocol), "{protocol}");
        }
    }
}
