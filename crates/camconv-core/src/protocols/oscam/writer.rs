use std::borrow::Cow;
use std::fmt::Write as _;

use super::layout;
use crate::error::FormatError;
use crate::model::{CredentialRecord, Field, OscamFlags, Protocol, ProtocolFlags};
use crate::protocols::common::require_value;
use crate::protocols::newcamd::DEFAULT_DES_KEY;

/// Reader settings that will be written for `record`.
///
/// OSCam records are written back exactly as parsed. Records from line
/// formats get a reader protocol, key and the usual connection defaults.
pub fn reader_settings(record: &CredentialRecord) -> Cow<'_, OscamFlags> {
    if let ProtocolFlags::Oscam(flags) = &record.flags {
        return Cow::Borrowed(flags);
    }
    let reader_protocol = match record.flags.protocol() {
        Protocol::Cccam => layout::READER_CCCAM,
        _ => layout::READER_NEWCAMD,
    };
    let key = match record.des_key() {
        Some(key) => Some(key.to_string()),
        None if substitutes_default_key(record) => Some(DEFAULT_DES_KEY.to_string()),
        None => None,
    };
    Cow::Owned(OscamFlags {
        label: None,
        enable: Some(true),
        reader_protocol: Some(reader_protocol.to_string()),
        key,
        caids: Vec::new(),
        groups: vec![layout::DEFAULT_GROUP],
        cccversion: (reader_protocol == layout::READER_CCCAM)
            .then(|| layout::DEFAULT_CCCVERSION.to_string()),
        inactivity_timeout: Some(layout::DEFAULT_TIMEOUT_SECS),
        reconnect_timeout: Some(layout::DEFAULT_TIMEOUT_SECS),
        extra: Vec::new(),
    })
}

/// Whether writing `record` as a reader fills in the default DES key.
pub fn substitutes_default_key(record: &CredentialRecord) -> bool {
    matches!(
        record.flags,
        ProtocolFlags::Newcamd(_) | ProtocolFlags::Mgcamd(_)
    ) && record.des_key().is_none()
}

/// Deterministic label for records without one: `{username}_{host}` with
/// every character outside `[A-Za-z0-9_-]` replaced by `_`.
///
/// # Examples
/// ```
/// use camconv_core::{CredentialRecord, Protocol};
/// use camconv_core::protocols::oscam::generated_label;
///
/// let record = CredentialRecord::new(Protocol::Cccam, "192.168.1.1", 12000, "user1", "p");
/// assert_eq!(generated_label(&record), "user1_192_168_1_1");
/// ```
pub fn generated_label(record: &CredentialRecord) -> String {
    format!("{}_{}", record.username, record.host)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn write_reader_block(record: &CredentialRecord) -> Result<String, FormatError> {
    let settings = reader_settings(record);
    let host = require_value(Protocol::Oscam, Field::Host, &record.host)?;
    if host.contains(layout::DEVICE_SEPARATOR) {
        return Err(FormatError::new(
            Protocol::Oscam,
            Field::Host,
            format!("host '{host}' cannot contain ',' in a device setting"),
        ));
    }
    if !(1..=65535).contains(&record.port) {
        return Err(FormatError::new(
            Protocol::Oscam,
            Field::Port,
            format!("port {} is out of range 1..=65535", record.port),
        ));
    }
    let username = require_value(Protocol::Oscam, Field::Username, &record.username)?;
    let password = require_value(Protocol::Oscam, Field::Password, &record.password)?;
    let label = match settings.label.as_deref() {
        Some(label) => require_single_line(Field::Label, label)?.to_string(),
        None => generated_label(record),
    };

    let mut block = format!("[{}]\n", layout::SECTION_READER);
    push_setting(&mut block, layout::KEY_LABEL, &label);
    if let Some(enable) = settings.enable {
        push_setting(&mut block, layout::KEY_ENABLE, if enable { "1" } else { "0" });
    }
    if let Some(reader_protocol) = settings.reader_protocol.as_deref() {
        push_setting(&mut block, layout::KEY_PROTOCOL, reader_protocol);
    }
    push_setting(
        &mut block,
        layout::KEY_DEVICE,
        &format!("{host}{}{}", layout::DEVICE_SEPARATOR, record.port),
    );
    push_setting(&mut block, layout::KEY_USER, username);
    push_setting(&mut block, layout::KEY_PASSWORD, password);
    if let Some(key) = settings.key.as_deref() {
        push_setting(&mut block, layout::KEY_KEY, key);
    }
    if !settings.caids.is_empty() {
        let caids = join_list(settings.caids.iter().map(|caid| format!("{caid:04X}")));
        push_setting(&mut block, layout::KEY_CAID, &caids);
    }
    if !settings.groups.is_empty() {
        let groups = join_list(settings.groups.iter().map(u8::to_string));
        push_setting(&mut block, layout::KEY_GROUP, &groups);
    }
    if let Some(cccversion) = settings.cccversion.as_deref() {
        push_setting(&mut block, layout::KEY_CCCVERSION, cccversion);
    }
    if let Some(timeout) = settings.inactivity_timeout {
        push_setting(&mut block, layout::KEY_INACTIVITY_TIMEOUT, &timeout.to_string());
    }
    if let Some(timeout) = settings.reconnect_timeout {
        push_setting(&mut block, layout::KEY_RECONNECT_TIMEOUT, &timeout.to_string());
    }
    for (key, value) in &settings.extra {
        if value.contains(['\n', '\r']) {
            return Err(FormatError::new(
                Protocol::Oscam,
                Field::Setting,
                format!("`{key}` value must fit on one line"),
            ));
        }
        push_setting(&mut block, key, value);
    }

    // No trailing newline; documents add block separators.
    block.truncate(block.trim_end().len());
    Ok(block)
}

fn push_setting(block: &mut String, key: &str, value: &str) {
    if value.is_empty() {
        let _ = writeln!(block, "{key} =");
    } else {
        let _ = writeln!(block, "{key} = {value}");
    }
}

fn join_list(items: impl Iterator<Item = String>) -> String {
    items
        .collect::<Vec<_>>()
        .join(&layout::LIST_SEPARATOR.to_string())
}

fn require_single_line(field: Field, value: &str) -> Result<&str, FormatError> {
    if value.is_empty() || value.contains(['\n', '\r']) {
        return Err(FormatError::new(
            Protocol::Oscam,
            field,
            format!("{field} must be a single non-empty line"),
        ));
    }
    Ok(value)
}
