use super::layout;
use super::reader::{BlockReader, Setting};
use crate::error::ParseError;
use crate::model::{
    CredentialRecord, Field, OscamFlags, Protocol, ProtocolFlags, is_well_formed_des_key,
};
use crate::protocols::common::decode_port;

pub fn parse_reader_block(text: &str) -> Result<CredentialRecord, ParseError> {
    let block = BlockReader::open(text)?;
    if !block.section.eq_ignore_ascii_case(layout::SECTION_READER) {
        return Err(block.header_error(
            Field::Keyword,
            format!("unsupported section [{}], expected [reader]", block.section),
        ));
    }

    let mut flags = OscamFlags::default();
    let mut device = None;
    let mut username = None;
    let mut password = None;

    for setting in block.settings() {
        match setting.key.to_ascii_lowercase().as_str() {
            layout::KEY_DEVICE => device = Some(setting),
            layout::KEY_USER => username = Some(required(setting, Field::Username)?),
            layout::KEY_PASSWORD => password = Some(required(setting, Field::Password)?),
            layout::KEY_LABEL => flags.label = Some(required(setting, Field::Label)?.to_string()),
            layout::KEY_PROTOCOL => {
                flags.reader_protocol = Some(required(setting, Field::ReaderProtocol)?.to_string())
            }
            layout::KEY_ENABLE => flags.enable = Some(parse_enable(setting)?),
            layout::KEY_KEY => flags.key = Some(parse_key(setting)?),
            layout::KEY_CAID => flags.caids = parse_caids(setting)?,
            layout::KEY_GROUP => flags.groups = parse_groups(setting)?,
            layout::KEY_CCCVERSION => {
                flags.cccversion = Some(required(setting, Field::Setting)?.to_string())
            }
            layout::KEY_INACTIVITY_TIMEOUT => {
                flags.inactivity_timeout = Some(parse_timeout(setting)?)
            }
            layout::KEY_RECONNECT_TIMEOUT => {
                flags.reconnect_timeout = Some(parse_timeout(setting)?)
            }
            _ => flags
                .extra
                .push((setting.key.to_string(), setting.value.to_string())),
        }
    }

    let device = device.ok_or_else(|| {
        block.header_error(Field::Host, "missing `device = host,port` setting")
    })?;
    let (host, port) = parse_device(device, flags.reader_protocol.as_deref())?;
    let username =
        username.ok_or_else(|| block.header_error(Field::Username, "missing `user` setting"))?;
    let password = password
        .ok_or_else(|| block.header_error(Field::Password, "missing `password` setting"))?;

    let record = CredentialRecord::new(Protocol::Oscam, host, port, username, password);
    Ok(record.with_flags(ProtocolFlags::Oscam(flags)))
}

fn required<'a>(setting: &Setting<'a>, field: Field) -> Result<&'a str, ParseError> {
    if setting.value.is_empty() {
        return Err(setting.error(field, format!("`{}` has no value", setting.key)));
    }
    Ok(setting.value)
}

/// `host[,port]`; a missing port falls back to the reader protocol default.
fn parse_device<'a>(
    setting: &Setting<'a>,
    reader_protocol: Option<&str>,
) -> Result<(&'a str, u32), ParseError> {
    let mut parts = setting.value.split(layout::DEVICE_SEPARATOR);
    let host = parts.next().unwrap_or("").trim();
    if host.is_empty() {
        return Err(setting.error(Field::Host, "device host is empty"));
    }
    let port = match parts.next() {
        None => default_port_for(reader_protocol),
        Some(raw) => {
            let offset = setting.value.find(layout::DEVICE_SEPARATOR).unwrap_or(0) + 1;
            let lead = raw.len() - raw.trim_start().len();
            let column = setting.value[..offset + lead].chars().count();
            decode_port(raw.trim())
                .map_err(|message| setting.error_at(Field::Port, message, column))?
        }
    };
    if parts.next().is_some() {
        return Err(setting.error(Field::Setting, "device expects `host,port`"));
    }
    Ok((host, port))
}

fn default_port_for(reader_protocol: Option<&str>) -> u32 {
    let protocol = match reader_protocol.map(str::to_ascii_lowercase).as_deref() {
        Some(layout::READER_CCCAM) => Protocol::Cccam,
        Some(name) if name.starts_with(layout::READER_NEWCAMD) || name == "mgcamd" => {
            Protocol::Newcamd
        }
        _ => Protocol::Oscam,
    };
    protocol.default_port()
}

fn parse_enable(setting: &Setting<'_>) -> Result<bool, ParseError> {
    match setting.value {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(setting.error(Field::Enable, format!("expected 0 or 1, found '{other}'"))),
    }
}

fn parse_key(setting: &Setting<'_>) -> Result<String, ParseError> {
    if !is_well_formed_des_key(setting.value) {
        return Err(setting.error(
            Field::DesKey,
            format!("key '{}' must be 28 hex digits", setting.value),
        ));
    }
    Ok(setting.value.to_string())
}

fn parse_caids(setting: &Setting<'_>) -> Result<Vec<u16>, ParseError> {
    list_items(setting.value)
        .map(|(offset, item)| {
            let valid = (1..=4).contains(&item.len())
                && item.bytes().all(|b| b.is_ascii_hexdigit());
            valid
                .then(|| u16::from_str_radix(item, 16).ok())
                .flatten()
                .ok_or_else(|| {
                    setting.error_at(
                        Field::Caid,
                        format!("CAID '{item}' must be 1 to 4 hex digits"),
                        offset,
                    )
                })
        })
        .collect()
}

fn parse_groups(setting: &Setting<'_>) -> Result<Vec<u8>, ParseError> {
    list_items(setting.value)
        .map(|(offset, item)| match item.parse::<u8>() {
            Ok(group) if (1..=layout::MAX_GROUP).contains(&group) => Ok(group),
            _ => Err(setting.error_at(
                Field::Group,
                format!("group '{item}' must be in 1..={}", layout::MAX_GROUP),
                offset,
            )),
        })
        .collect()
}

fn parse_timeout(setting: &Setting<'_>) -> Result<u32, ParseError> {
    setting.value.parse::<u32>().map_err(|_| {
        setting.error(
            Field::Timeout,
            format!("`{}` must be a number of seconds", setting.key),
        )
    })
}

/// Comma-separated items with their character offset into the value.
fn list_items(value: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    value.split(layout::LIST_SEPARATOR).map(move |raw| {
        let lead = raw.chars().count() - raw.trim_start().chars().count();
        let item = (offset + lead, raw.trim());
        offset += raw.chars().count() + 1;
        item
    })
}
