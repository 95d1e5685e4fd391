//! Application-wide constants

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 2_000;
