use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Supported card-sharing configuration formats.
///
/// # Examples
/// ```
/// use camconv_core::Protocol;
///
/// let protocol: Protocol = "NewCamd".parse()?;
/// assert_eq!(protocol, Protocol::Newcamd);
/// assert_eq!(protocol.to_string(), "newcamd");
/// # Ok::<(), camconv_core::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Cccam,
    Newcamd,
    Mgcamd,
    Oscam,
}

impl Protocol {
    /// All protocols in a stable order.
    pub const ALL: [Protocol; 4] = [
        Protocol::Cccam,
        Protocol::Newcamd,
        Protocol::Mgcamd,
        Protocol::Oscam,
    ];

    /// Canonical lowercase identifier.
    pub fn id(self) -> &'static str {
        match self {
            Protocol::Cccam => "cccam",
            Protocol::Newcamd => "newcamd",
            Protocol::Mgcamd => "mgcamd",
            Protocol::Oscam => "oscam",
        }
    }

    /// Product spelling used in rendered document headers.
    pub fn display_name(self) -> &'static str {
        match self {
            Protocol::Cccam => "CCcam",
            Protocol::Newcamd => "NewCamd",
            Protocol::Mgcamd => "MGcamd",
            Protocol::Oscam => "OSCam",
        }
    }

    /// Documentation-level default port. Never dialed.
    pub fn default_port(self) -> u32 {
        match self {
            Protocol::Cccam => 12000,
            Protocol::Newcamd | Protocol::Mgcamd => 15000,
            Protocol::Oscam => 988,
        }
    }

    /// Conventional file extension for a whole configuration document.
    pub fn file_extension(self) -> &'static str {
        match self {
            Protocol::Cccam | Protocol::Newcamd => "cfg",
            Protocol::Mgcamd => "list",
            Protocol::Oscam => "server",
        }
    }

    /// Whether records are one per line (as opposed to OSCam blocks).
    pub fn is_line_format(self) -> bool {
        !matches!(self, Protocol::Oscam)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Protocol {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Protocol::ALL
            .into_iter()
            .find(|protocol| protocol.id().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigurationError::UnknownProtocol {
                name: name.to_string(),
            })
    }
}

/// Canonical, protocol-agnostic credential record.
///
/// Construction never fails; out-of-range values stay representable so the
/// validator can report them. Records are not edited after construction;
/// conversions render new text from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Hostname or IP literal.
    pub host: String,
    /// Server port, valid in `1..=65535`.
    pub port: u32,
    pub username: String,
    pub password: String,
    /// Fields meaningful to a single protocol only.
    pub flags: ProtocolFlags,
    /// Protocol the record was parsed from (or composed for).
    pub source_protocol: Protocol,
}

impl CredentialRecord {
    /// Build a record carrying the empty flag set of `protocol`.
    ///
    /// # Examples
    /// ```
    /// use camconv_core::{CredentialRecord, Protocol};
    ///
    /// let record = CredentialRecord::new(Protocol::Cccam, "10.0.0.1", 12000, "user", "pass");
    /// assert_eq!(record.port, 12000);
    /// assert!(record.des_key().is_none());
    /// ```
    pub fn new(
        protocol: Protocol,
        host: impl Into<String>,
        port: u32,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            flags: ProtocolFlags::empty(protocol),
            source_protocol: protocol,
        }
    }

    /// Replace the flag set.
    pub fn with_flags(mut self, flags: ProtocolFlags) -> Self {
        self.flags = flags;
        self
    }

    /// DES key carried by NewCamd/MGcamd flags or the OSCam `key` setting.
    pub fn des_key(&self) -> Option<&str> {
        match &self.flags {
            ProtocolFlags::Newcamd(flags) => flags.des_key.as_deref(),
            ProtocolFlags::Mgcamd(flags) => flags.des_key.as_deref(),
            ProtocolFlags::Oscam(flags) => flags.key.as_deref(),
            ProtocolFlags::Cccam(_) => None,
        }
    }

    /// OSCam reader label, when the record came from an OSCam block.
    pub fn label(&self) -> Option<&str> {
        match &self.flags {
            ProtocolFlags::Oscam(flags) => flags.label.as_deref(),
            _ => None,
        }
    }

    /// OSCam CAID filter list (empty for every other protocol).
    pub fn caids(&self) -> &[u16] {
        match &self.flags {
            ProtocolFlags::Oscam(flags) => &flags.caids,
            _ => &[],
        }
    }
}

/// Protocol-specific optional fields, keyed by protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum ProtocolFlags {
    Cccam(CccamFlags),
    Newcamd(NewcamdFlags),
    Mgcamd(MgcamdFlags),
    Oscam(OscamFlags),
}

impl ProtocolFlags {
    pub fn empty(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Cccam => ProtocolFlags::Cccam(CccamFlags::default()),
            Protocol::Newcamd => ProtocolFlags::Newcamd(NewcamdFlags::default()),
            Protocol::Mgcamd => ProtocolFlags::Mgcamd(MgcamdFlags::default()),
            Protocol::Oscam => ProtocolFlags::Oscam(OscamFlags::default()),
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            ProtocolFlags::Cccam(_) => Protocol::Cccam,
            ProtocolFlags::Newcamd(_) => Protocol::Newcamd,
            ProtocolFlags::Mgcamd(_) => Protocol::Mgcamd,
            ProtocolFlags::Oscam(_) => Protocol::Oscam,
        }
    }
}

/// Trailing options of a C-line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CccamFlags {
    /// Optional `yes`/`no` token after the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub want_emus: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewcamdFlags {
    /// 14-byte DES key as 28 hex digits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub des_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MgcamdFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub des_key: Option<String>,
}

/// Settings of an OSCam `[reader]` block beyond device and credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscamFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    /// Reader protocol (`cccam`, `newcamd`, ...), kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caids: Vec<u16>,
    /// Group numbers in `1..=64`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cccversion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivity_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_timeout: Option<u32>,
    /// Unrecognised settings in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
}

/// Named fields that errors and validation issues point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Leading `C:` / `N:` / `M:` token or an OSCam section header.
    Keyword,
    /// Record structure as a whole (token count, stray lines).
    Record,
    Host,
    Port,
    Username,
    Password,
    DesKey,
    WantEmus,
    Label,
    Enable,
    ReaderProtocol,
    Caid,
    Group,
    Timeout,
    /// A generic OSCam `key = value` setting.
    Setting,
    /// Protocol flags dropped on conversion.
    Flags,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Keyword => "keyword",
            Field::Record => "record",
            Field::Host => "host",
            Field::Port => "port",
            Field::Username => "username",
            Field::Password => "password",
            Field::DesKey => "des_key",
            Field::WantEmus => "want_emus",
            Field::Label => "label",
            Field::Enable => "enable",
            Field::ReaderProtocol => "reader_protocol",
            Field::Caid => "caid",
            Field::Group => "group",
            Field::Timeout => "timeout",
            Field::Setting => "setting",
            Field::Flags => "flags",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Single finding produced by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub field: Field,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(field: Field, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    pub fn warning(field: Field, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.severity, self.field, self.message)
    }
}

/// Whether `key` is a well-formed 14-byte DES key written as 28 hex digits.
pub fn is_well_formed_des_key(key: &str) -> bool {
    key.len() == 28 && key.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_names_are_case_insensitive() {
        assert_eq!("CCcam".parse::<Protocol>().unwrap(), Protocol::Cccam);
        assert_eq!(" OSCAM ".parse::<Protocol>().unwrap(), Protocol::Oscam);
        assert_eq!("mgcamd".parse::<Protocol>().unwrap(), Protocol::Mgcamd);
    }

    #[test]
    fn unknown_protocol_is_configuration_error() {
        let err = "Foo".parse::<Protocol>().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownProtocol {
                name: "Foo".to_string()
            }
        );
        assert!(err.to_string().contains("Foo"));
    }

    #[test]
    fn records_compare_structurally() {
        let a = CredentialRecord::new(Protocol::Newcamd, "host", 15000, "u", "p");
        let mut b = a.clone();
        assert_eq!(a, b);
        b.flags = ProtocolFlags::Newcamd(NewcamdFlags {
            des_key: Some("0102030405060708091011121314".to_string()),
        });
        assert_ne!(a, b);
    }

    #[test]
    fn des_key_accessor_reads_every_carrier() {
        let key = "0102030405060708091011121314".to_string();
        let mg = CredentialRecord::new(Protocol::Mgcamd, "h", 1, "u", "p").with_flags(
            ProtocolFlags::Mgcamd(MgcamdFlags {
                des_key: Some(key.clone()),
            }),
        );
        assert_eq!(mg.des_key(), Some(key.as_str()));

        let oscam = CredentialRecord::new(Protocol::Oscam, "h", 1, "u", "p").with_flags(
            ProtocolFlags::Oscam(OscamFlags {
                key: Some(key.clone()),
                ..OscamFlags::default()
            }),
        );
        assert_eq!(oscam.des_key(), Some(key.as_str()));
    }

    #[test]
    fn des_key_shape() {
        assert!(is_well_formed_des_key("0102030405060708091011121314"));
        assert!(is_well_formed_des_key("AABBCCDDEEFF00112233445566ff"));
        assert!(!is_well_formed_des_key("01020304"));
        assert!(!is_well_formed_des_key("zz02030405060708091011121314"));
    }
}
