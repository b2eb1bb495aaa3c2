//! OSCam `[reader]` block grammar.
//!
//! A record is a `[reader]` header followed by `key = value` settings. Keys
//! are case-insensitive; values are taken verbatim after trimming. The block
//! ends at a blank line or at the next section header. `device`, `user` and
//! `password` are required; every other setting is kept in
//! [`OscamFlags`](crate::model::OscamFlags), unknown ones included, so
//! OSCam-to-OSCam conversion is lossless.
//!
//! Records without a label are written with [`generated_label`].

pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

use crate::error::{FormatError, ParseError};
use crate::model::{CredentialRecord, Protocol};

use super::Grammar;

pub use parser::parse_reader_block;
pub use reader::section_name;
pub use writer::{generated_label, reader_settings, substitutes_default_key, write_reader_block};

pub struct OscamGrammar;

impl Grammar for OscamGrammar {
    const PROTOCOL: Protocol = Protocol::Oscam;

    fn parse(text: &str) -> Result<CredentialRecord, ParseError> {
        parse_reader_block(text)
    }

    fn format(record: &CredentialRecord) -> Result<String, FormatError> {
        write_reader_block(record)
    }
}
