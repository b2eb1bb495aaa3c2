//! Conventions shared by the single-line C-, N- and M-line grammars.

pub mod reader;
pub mod writer;

pub use reader::{LineReader, decode_port, is_blank_or_comment, strip_keyword};
pub use writer::{LineWriter, require_value};
