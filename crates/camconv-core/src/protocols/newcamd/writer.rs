use super::layout;
use crate::error::FormatError;
use crate::model::{CredentialRecord, Field, Protocol, is_well_formed_des_key};
use crate::protocols::common::LineWriter;

pub fn write_nline(record: &CredentialRecord) -> Result<String, FormatError> {
    let des_key = record.des_key().unwrap_or(layout::DEFAULT_DES_KEY);
    if !is_well_formed_des_key(des_key) {
        return Err(FormatError::new(
            Protocol::Newcamd,
            Field::DesKey,
            format!("DES key '{des_key}' must be 28 hex digits"),
        ));
    }

    let writer = LineWriter::new(Protocol::Newcamd, layout::KEYWORD)
        .field(Field::Host, &record.host)?
        .port(record.port)?
        .field(Field::Username, &record.username)?
        .field(Field::Password, &record.password)?
        .field(Field::DesKey, des_key)?;
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::write_nline;
    use crate::model::{CredentialRecord, MgcamdFlags, Protocol, ProtocolFlags};

    #[test]
    fn write_substitutes_default_key() {
        let record = CredentialRecord::new(Protocol::Cccam, "192.168.1.1", 12000, "user1", "pass1");
        assert_eq!(
            write_nline(&record).unwrap(),
            "N: 192.168.1.1 12000 user1 pass1 0102030405060708091011121314"
        );
    }

    #[test]
    fn write_carries_mgcamd_key() {
        let record = CredentialRecord::new(Protocol::Mgcamd, "h", 15500, "u", "p").with_flags(
            ProtocolFlags::Mgcamd(MgcamdFlags {
                des_key: Some("1234567890123456789012345678".to_string()),
            }),
        );
        assert_eq!(
            write_nline(&record).unwrap(),
            "N: h 15500 u p 1234567890123456789012345678"
        );
    }
}
