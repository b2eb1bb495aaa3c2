use super::layout;
use crate::error::ParseError;
use crate::model::{
    CredentialRecord, Field, NewcamdFlags, Protocol, ProtocolFlags, is_well_formed_des_key,
};
use crate::protocols::common::LineReader;

pub fn parse_nline(text: &str) -> Result<CredentialRecord, ParseError> {
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
        Protocol::Newcamd,
        reader.value(layout::HOST),
        port,
        reader.value(layout::USERNAME),
        reader.value(layout::PASSWORD),
    );
    Ok(record.with_flags(ProtocolFlags::Newcamd(NewcamdFlags { des_key })))
}

#[cfg(test)]
mod tests {
    use super::parse_nline;
    use crate::model::{Field, Protocol};

    #[test]
    fn parse_valid_nline() {
        let record =
            parse_nline("N: newcamd.server.com 15000 newuser newpass 0102030405060708091011121314")
                .unwrap();
        assert_eq!(record.host, "newcamd.server.com");
        assert_eq!(record.port, 15000);
        assert_eq!(record.source_protocol, Protocol::Newcamd);
        assert_eq!(record.des_key(), Some("0102030405060708091011121314"));
    }

    #[test]
    fn parse_without_key() {
        let record = parse_nline("n:host 15001 u p").unwrap();
        assert_eq!(record.des_key(), None);
    }

    #[test]
    fn parse_short_key() {
        let err = parse_nline("N: host 15000 u p 0102").unwrap_err();
        assert_eq!(err.field, Field::DesKey);
        assert_eq!(err.column, 19);
    }

    #[test]
    fn parse_wrong_keyword() {
        let err = parse_nline("C: host 15000 u p").unwrap_err();
        assert_eq!(err.field, Field::Keyword);
    }
}
