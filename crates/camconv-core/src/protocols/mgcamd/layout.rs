pub const KEYWORD: char = 'M';

pub const HOST: usize = 0;
pub const PORT: usize = 1;
pub const USERNAME: usize = 2;
pub const PASSWORD: usize = 3;
pub const DES_KEY: usize = 4;

pub const MIN_FIELDS: usize = 4;
pub const MAX_FIELDS: usize = 5;

pub const MAX_CREDENTIAL_LEN: usize = 64;
