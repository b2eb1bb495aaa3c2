//! MGcamd M-line grammar: `M: host port username password [deskey]`.
//!
//! MGcamd speaks newcamd on the wire, so the optional DES key uses the same
//! 28-hex-digit shape. Unlike N-lines the key is never defaulted.

pub mod layout;
pub mod parser;
pub mod writer;

use crate::error::{FormatError, ParseError};
use crate::model::{CredentialRecord, Protocol};

use super::Grammar;

pub use parser::parse_mline;
pub use writer::write_mline;

pub struct MgcamdGrammar;

impl Grammar for MgcamdGrammar {
    const PROTOCOL: Protocol = Protocol::Mgcamd;

    fn parse(text: &str) -> Result<CredentialRecord, ParseError> {
        parse_mline(text)
    }

    fn format(record: &CredentialRecord) -> Result<String, FormatError> {
        write_mline(record)
    }
}
