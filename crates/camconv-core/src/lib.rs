//! camconv core library for card-sharing client configuration conversion.
//!
//! This crate implements the conversion pipeline used by the CLI: a source
//! grammar (layout/parser/writer) parses one record into a protocol-neutral
//! [`CredentialRecord`], the validator checks it against the target protocol,
//! and the target grammar renders it. Parsing is text-oriented and side-effect
//! free; file and stream I/O live in the CLI.
//!
//! Supported protocols: CCcam C-lines, NewCamd N-lines, MGcamd M-lines and
//! OSCam `[reader]` blocks. Input mixing several protocols can be converted
//! with per-record detection ([`convert_batch_auto`]).
//!
//! Invariants:
//! - Conversion is a pure function of `(text, source, target)`.
//! - Batch results keep input order, whatever the evaluation strategy.
//! - A failed record never aborts a batch.
//!
//! # Examples
//! ```
//! use camconv_core::{Protocol, convert_batch, render_document};
//!
//! let input = "C: 192.168.1.1 12000 user1 pass1\nC: 10.0.0.2 abc user2 pass2\n";
//! let batch = convert_batch(input, Protocol::Cccam, Protocol::Mgcamd);
//! assert_eq!((batch.succeeded, batch.failed), (1, 1));
//!
//! let doc = render_document(&batch, None);
//! assert!(doc.ends_with("M: 192.168.1.1 12000 user1 pass1\n"));
//! ```

mod convert;
mod error;
mod model;
pub mod protocols;
mod validate;

pub use convert::{
    AUTO_SOURCE, BatchEntry, BatchOptions, BatchResult, Conversion, ConversionRequest,
    ConversionResult, Segment, convert_batch, convert_batch_auto, convert_batch_auto_with,
    convert_batch_with, convert_one, convert_record, render_document, split_detected,
    split_records,
};
pub use error::{ConfigurationError, ConversionError, ErrorKind, FormatError, ParseError};
pub use model::{
    CccamFlags, CredentialRecord, Field, MgcamdFlags, NewcamdFlags, OscamFlags, Protocol,
    ProtocolFlags, Severity, ValidationIssue, is_well_formed_des_key,
};
pub use protocols::Grammar;
pub use protocols::newcamd::DEFAULT_DES_KEY;
pub use validate::{dropped_flags, is_plausible_host, validate};
