//! CCcam C-line grammar.
//!
//! `C: host port username password [yes|no]`. The optional trailing token is
//! the "want emus" switch; it survives CCcam round-trips and is dropped with
//! a warning when converting elsewhere.

pub mod layout;
pub mod parser;
pub mod writer;

use crate::error::{FormatError, ParseError};
use crate::model::{CredentialRecord, Protocol};

use super::Grammar;

pub use parser::parse_cline;
pub use writer::write_cline;

pub struct CccamGrammar;

impl Grammar for CccamGrammar {
    const PROTOCOL: Protocol = Protocol::Cccam;

    fn parse(text: &str) -> Result<CredentialRecord, ParseError> {
        parse_cline(text)
    }

    fn format(record: &CredentialRecord) -> Result<String, FormatError> {
        write_cline(record)
    }
}
