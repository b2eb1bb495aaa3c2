pub const KEYWORD: char = 'C';

pub const HOST: usize = 0;
pub const PORT: usize = 1;
pub const USERNAME: usize = 2;
pub const PASSWORD: usize = 3;
pub const WANT_EMUS: usize = 4;

pub const MIN_FIELDS: usize = 4;
pub const MAX_FIELDS: usize = 5;

/// CCcam sends fixed 20-byte username/password fields during login.
pub const MAX_CREDENTIAL_LEN: usize = 20;

pub const YES: &str = "yes";
pub const NO: &str = "no";
