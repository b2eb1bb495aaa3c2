use super::layout;
use crate::error::ParseError;
use crate::model::{
    CredentialRecord, Field, MgcamdFlags, Protocol, ProtocolFlags, is_well_formed_des_key,
};
use crate::protocols::common::LineReader;

pub fn parse_mline(text: &str) -> Result<CredentialRecord, ParseError> {
    let reader = LineReader::open(text, layout::KEYWORD)?;
    reader.require_count(layout::MIN_FIELDS, layout::MAX_FIELDS)?;
    let port = reader.read_port(layout::PORT)?;

    let des_key = match reader.token(layout::DES_KEY) {
        None => None,
        Some(token) if is_well_formed_des_key(token.text) => Some(token.text.to_string()),
        Some(token) => {
            return Err(reader.error(
                Field::DesKey,
                format!("DES key '{}' must be 28 hex digits", token.text),
                token.column,
            ));
        }
    };

    let record = CredentialRecord::new(
        Protocol::Mgcamd,
        reader.value(layout::HOST),
        port,
        reader.value(layout::USERNAME),
        reader.value(layout::PASSWORD),
    );
    Ok(record.with_flags(ProtocolFlags::Mgcamd(MgcamdFlags { des_key })))
}
