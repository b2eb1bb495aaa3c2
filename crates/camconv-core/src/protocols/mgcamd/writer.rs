use super::layout;
use crate::error::FormatError;
use crate::model::{CredentialRecord, Field, Protocol, is_well_formed_des_key};
use crate::protocols::common::LineWriter;

pub fn write_mline(record: &CredentialRecord) -> Result<String, FormatError> {
    let mut writer = LineWriter::new(Protocol::Mgcamd, layout::KEYWORD)
        .field(Field::Host, &record.host)?
        .port(record.port)?
        .field(Field::Username, &record.username)?
        .field(Field::Password, &record.password)?;
    if let Some(des_key) = record.des_key() {
        if !is_well_formed_des_key(des_key) {
            return Err(FormatError::new(
                Protocol::Mgcamd,
                Field::DesKey,
                format!("DES key '{des_key}' must be 28 hex digits"),
            ));
        }
        writer = writer.field(Field::DesKey, des_key)?;
    }
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::write_mline;
    use crate::model::{CredentialRecord, Field, MgcamdFlags, NewcamdFlags, Protocol, ProtocolFlags};

    #[test]
    fn write_without_key() {
        let record = CredentialRecord::new(Protocol::Cccam, "h", 12000, "u", "p");
        assert_eq!(write_mline(&record).unwrap(), "M: h 12000 u p");
    }

    #[test]
    fn write_carries_newcamd_key() {
        let record = CredentialRecord::new(Protocol::Newcamd, "h", 15000, "u", "p").with_flags(
            ProtocolFlags::Newcamd(NewcamdFlags {
                des_key: Some("0102030405060708091011121314".to_string()),
            }),
        );
        assert_eq!(
            write_mline(&record).unwrap(),
            "M: h 15000 u p 0102030405060708091011121314"
        );
    }

    #[test]
    fn write_rejects_malformed_key() {
        let record = CredentialRecord::new(Protocol::Mgcamd, "h", 15000, "u", "p").with_flags(
            ProtocolFlags::Mgcamd(MgcamdFlags {
                des_key: Some("0102".to_string()),
            }),
        );
        let err = write_mline(&record).unwrap_err();
        assert_eq!(err.field, Field::DesKey);
        assert_eq!(err.protocol, Protocol::Mgcamd);
    }
}
