/// Default page size for artifact listing
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum accepted upload size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// User id recorded by toggle-like when the caller does not supply one
pub const ANONYMOUS_USER_ID: &str = "anonymous";
