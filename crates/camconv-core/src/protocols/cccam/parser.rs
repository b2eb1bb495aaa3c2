use super::layout;
use crate::error::ParseError;
use crate::model::{CccamFlags, CredentialRecord, Field, Protocol, ProtocolFlags};
use crate::protocols::common::LineReader;

pub fn parse_cline(text: &str) -> Result<CredentialRecord, ParseError> {
    let reader = LineReader::open(text, layout::KEYWORD)?;
    reader.require_count(layout::MIN_FIELDS, layout::MAX_FIELDS)?;
    let port = reader.read_port(layout::PORT)?;

    let want_emus = match reader.token(layout::WANT_EMUS) {
        None => None,
        Some(token) if token.text.eq_ignore_ascii_case(layout::YES) => Some(true),
        Some(token) if token.text.eq_ignore_ascii_case(layout::NO) => Some(false),
        Some(token) => {
            return Err(reader.error(
                Field::WantEmus,
                format!("expected `yes` or `no`, found '{}'", token.text),
                token.column,
            ));
        }
    };

    let record = CredentialRecord::new(
        Protocol::Cccam,
        reader.value(layout::HOST),
        port,
        reader.value(layout::USERNAME),
        reader.value(layout::PASSWORD),
    );
    Ok(record.with_flags(ProtocolFlags::Cccam(CccamFlags { want_emus })))
}

#[cfg(test)]
mod tests {
    use super::parse_cline;
    use crate::model::{CccamFlags, Field, Protocol, ProtocolFlags};

    #[test]
    fn parse_valid_cline() {
        let record = parse_cline("C: server1.example.com 12000 user1 pass123").unwrap();
        assert_eq!(record.host, "server1.example.com");
        assert_eq!(record.port, 12000);
        assert_eq!(record.username, "user1");
        assert_eq!(record.password, "pass123");
        assert_eq!(record.source_protocol, Protocol::Cccam);
        assert_eq!(record.flags, ProtocolFlags::Cccam(CccamFlags::default()));
    }

    #[test]
    fn parse_want_emus_token() {
        let record = parse_cline("c: host 12000 u p YES").unwrap();
        assert_eq!(
            record.flags,
            ProtocolFlags::Cccam(CccamFlags {
                want_emus: Some(true)
            })
        );
    }

    #[test]
    fn values_keep_their_case() {
        let record = parse_cline("C: Host.Example 12000 User Pass").unwrap();
        assert_eq!(record.host, "Host.Example");
        assert_eq!(record.username, "User");
        assert_eq!(record.password, "Pass");
    }

    #[test]
    fn parse_non_numeric_port() {
        let err = parse_cline("C: host 12x00 user pass").unwrap_err();
        assert_eq!(err.field, Field::Port);
        assert_eq!(err.column, 9);
        assert!(err.message.contains("not numeric"));
    }

    #[test]
    fn parse_out_of_range_port() {
        let err = parse_cline("C: host 70000 user pass").unwrap_err();
        assert_eq!(err.field, Field::Port);
        assert!(err.message.contains("out of range"));
    }

    #[test]
    fn parse_bad_emus_token() {
        let err = parse_cline("C: host 12000 user pass maybe").unwrap_err();
        assert_eq!(err.field, Field::WantEmus);
    }

    #[test]
    fn parse_too_many_tokens() {
        let err = parse_cline("C: host 12000 user pass yes extra").unwrap_err();
        assert_eq!(err.field, Field::Record);
        assert!(err.message.contains("found 6"));
    }
}
