use super::layout;
use crate::error::FormatError;
use crate::model::{CredentialRecord, Field, Protocol, ProtocolFlags};
use crate::protocols::common::LineWriter;

pub fn write_cline(record: &CredentialRecord) -> Result<String, FormatError> {
    let mut writer = LineWriter::new(Protocol::Cccam, layout::KEYWORD)
        .field(Field::Host, &record.host)?
        .port(record.port)?
        .field(Field::Username, &record.username)?
        .field(Field::Password, &record.password)?;

    if let ProtocolFlags::Cccam(flags) = &record.flags {
        if let Some(want_emus) = flags.want_emus {
            let token = if want_emus { layout::YES } else { layout::NO };
            writer = writer.field(Field::WantEmus, token)?;
        }
    }
    Ok(writer.finish())
}
