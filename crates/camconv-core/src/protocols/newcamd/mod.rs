//! NewCamd N-line grammar.
//!
//! `N: host port username password [deskey]`, where the DES key is 14 bytes
//! written as 28 hex digits. The key is mandatory on output: records without
//! one are written with [`DEFAULT_DES_KEY`] and the validator reports the
//! substitution as a warning.

pub mod layout;
pub mod parser;
pub mod writer;

use crate::error::{FormatError, ParseError};
use crate::model::{CredentialRecord, Protocol};

use super::Grammar;

pub use layout::DEFAULT_DES_KEY;
pub use parser::parse_nline;
pub use writer::write_nline;

pub struct NewcamdGrammar;

impl Grammar for NewcamdGrammar {
    const PROTOCOL: Protocol = Protocol::Newcamd;

    fn parse(text: &str) -> Result<CredentialRecord, ParseError> {
        parse_nline(text)
    }

    fn format(record: &CredentialRecord) -> Result<String, FormatError> {
        write_nline(record)
    }
}
