//! Record checks against a target protocol.
//!
//! Checks run in a fixed order: port, host, credentials, mandatory target
//! flags, then flags the target cannot carry. Errors block a conversion;
//! warnings travel with the converted text.

use std::net::IpAddr;

use crate::model::{
    CredentialRecord, Field, Protocol, ProtocolFlags, ValidationIssue, is_well_formed_des_key,
};
use crate::protocols::newcamd::DEFAULT_DES_KEY;
use crate::protocols::oscam;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_HOST_LABEL_LEN: usize = 63;

/// Validate `record` for conversion into `target`. Never mutates the record.
///
/// # Examples
/// ```
/// use camconv_core::{CredentialRecord, Field, Protocol, Severity, validate};
///
/// let record = CredentialRecord::new(Protocol::Cccam, "10.0.0.1", 0, "user", "pass");
/// let issues = validate(&record, Protocol::Cccam);
/// assert_eq!(issues[0].field, Field::Port);
/// assert_eq!(issues[0].severity, Severity::Error);
/// ```
pub fn validate(record: &CredentialRecord, target: Protocol) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_port(record, &mut issues);
    check_host(record, &mut issues);
    check_credential(Field::Username, &record.username, target, &mut issues);
    check_credential(Field::Password, &record.password, target, &mut issues);
    check_target_flags(record, target, &mut issues);
    check_dropped_flags(record, target, &mut issues);
    issues
}

fn check_port(record: &CredentialRecord, issues: &mut Vec<ValidationIssue>) {
    if !(1..=65535).contains(&record.port) {
        issues.push(ValidationIssue::error(
            Field::Port,
            format!("port {} is out of range 1..=65535", record.port),
        ));
    }
}

fn check_host(record: &CredentialRecord, issues: &mut Vec<ValidationIssue>) {
    let host = record.host.as_str();
    if host.is_empty() {
        issues.push(ValidationIssue::error(Field::Host, "host is empty"));
    } else if !is_plausible_host(host) {
        issues.push(ValidationIssue::error(
            Field::Host,
            format!("'{host}' is neither an IP address nor a valid hostname"),
        ));
    }
}

/// IP literal, or a dotted hostname of `[A-Za-z0-9_-]` labels.
pub fn is_plausible_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    let name = host.strip_suffix('.').unwrap_or(host);
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_HOST_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}

fn check_credential(
    field: Field,
    value: &str,
    target: Protocol,
    issues: &mut Vec<ValidationIssue>,
) {
    if value.is_empty() {
        issues.push(ValidationIssue::error(field, format!("{field} is empty")));
        return;
    }
    if let Some(bad) = value.chars().find(|c| c.is_whitespace() || c.is_control()) {
        issues.push(ValidationIssue::error(
            field,
            format!("{field} contains {bad:?}; only printable non-whitespace is allowed"),
        ));
    }
    let limit = target.max_credential_len();
    let len = value.chars().count();
    if len > limit {
        issues.push(ValidationIssue::error(
            field,
            format!(
                "{field} is {len} characters, {} allows at most {limit}",
                target.display_name()
            ),
        ));
    }
}

fn check_target_flags(
    record: &CredentialRecord,
    target: Protocol,
    issues: &mut Vec<ValidationIssue>,
) {
    let des_key = record.des_key();
    if let Some(key) = des_key {
        if !is_well_formed_des_key(key) && target != Protocol::Cccam {
            issues.push(ValidationIssue::error(
                Field::DesKey,
                format!("DES key '{key}' must be 28 hex digits"),
            ));
        }
    }

    match target {
        Protocol::Newcamd if des_key.is_none() => {
            issues.push(default_key_warning());
        }
        Protocol::Oscam => {
            let settings = oscam::reader_settings(record);
            if settings.label.is_none() {
                issues.push(ValidationIssue::warning(
                    Field::Label,
                    format!(
                        "no label; generated '{}'",
                        oscam::generated_label(record)
                    ),
                ));
            }
            if settings.caids.is_empty() {
                issues.push(ValidationIssue::warning(
                    Field::Caid,
                    "no caid filter; the reader will be offered every CAID",
                ));
            }
            if oscam::substitutes_default_key(record) {
                issues.push(default_key_warning());
            }
        }
        _ => {}
    }
}

fn default_key_warning() -> ValidationIssue {
    ValidationIssue::warning(
        Field::DesKey,
        format!("no DES key; substituted the default {DEFAULT_DES_KEY}"),
    )
}

fn check_dropped_flags(
    record: &CredentialRecord,
    target: Protocol,
    issues: &mut Vec<ValidationIssue>,
) {
    let dropped = dropped_flags(&record.flags, target);
    if dropped.is_empty() {
        return;
    }
    issues.push(ValidationIssue::warning(
        Field::Flags,
        format!(
            "{} {} no {} equivalent and {} dropped",
            dropped.join(", "),
            if dropped.len() == 1 { "has" } else { "have" },
            target.display_name(),
            if dropped.len() == 1 { "is" } else { "are" },
        ),
    ));
}

/// Names of populated source flags with no slot in `target`.
pub fn dropped_flags(flags: &ProtocolFlags, target: Protocol) -> Vec<String> {
    let mut dropped = Vec::new();
    match flags {
        ProtocolFlags::Cccam(flags) => {
            if flags.want_emus.is_some() && target != Protocol::Cccam {
                dropped.push("want_emus".to_string());
            }
        }
        ProtocolFlags::Newcamd(flags) => {
            if flags.des_key.is_some() && target == Protocol::Cccam {
                dropped.push("des_key".to_string());
            }
        }
        ProtocolFlags::Mgcamd(flags) => {
            if flags.des_key.is_some() && target == Protocol::Cccam {
                dropped.push("des_key".to_string());
            }
        }
        ProtocolFlags::Oscam(flags) => {
            if target == Protocol::Oscam {
                return dropped;
            }
            let named = [
                ("label", flags.label.is_some()),
                ("enable", flags.enable.is_some()),
                ("protocol", flags.reader_protocol.is_some()),
                ("key", flags.key.is_some() && target == Protocol::Cccam),
                ("caid", !flags.caids.is_empty()),
                ("group", !flags.groups.is_empty()),
                ("cccversion", flags.cccversion.is_some()),
                ("inactivitytimeout", flags.inactivity_timeout.is_some()),
                ("reconnecttimeout", flags.reconnect_timeout.is_some()),
            ];
            dropped.extend(
                named
                    .into_iter()
                    .filter(|(_, populated)| *populated)
                    .map(|(name, _)| name.to_string()),
            );
            dropped.extend(flags.extra.iter().map(|(key, _)| key.clone()));
        }
    }
    dropped
}
