/// Only reader sections describe upstream credentials.
pub const SECTION_READER: &str = "reader";

pub const KEY_LABEL: &str = "label";
pub const KEY_ENABLE: &str = "enable";
pub const KEY_PROTOCOL: &str = "protocol";
pub const KEY_DEVICE: &str = "device";
pub const KEY_USER: &str = "user";
pub const KEY_PASSWORD: &str = "password";
pub const KEY_KEY: &str = "key";
pub const KEY_CAID: &str = "caid";
pub const KEY_GROUP: &str = "group";
pub const KEY_CCCVERSION: &str = "cccversion";
pub const KEY_INACTIVITY_TIMEOUT: &str = "inactivitytimeout";
pub const KEY_RECONNECT_TIMEOUT: &str = "reconnecttimeout";

pub const DEVICE_SEPARATOR: char = ',';
pub const LIST_SEPARATOR: char = ',';

/// Group bitmask width.
pub const MAX_GROUP: u8 = 64;

pub const MAX_CREDENTIAL_LEN: usize = 128;

/// Settings written for readers derived from C-, N- or M-lines.
pub const DEFAULT_CCCVERSION: &str = "2.3.0";
pub const DEFAULT_GROUP: u8 = 1;
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

pub const READER_CCCAM: &str = "cccam";
pub const READER_NEWCAMD: &str = "newcamd";
