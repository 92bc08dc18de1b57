//! Environment variable parsing helpers

use std::str::FromStr;

/// Parse an environment variable with a default fallback
///
/// Missing and unparseable values both yield `default`.
///
/// # Example
/// ```ignore
/// let port: u16 = parse_env_with_default("SERVER_PORT", 8080);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    parse_env_optional(key).unwrap_or(default)
}

/// Parse an environment variable, returning None if missing or invalid
pub fn parse_env_optional<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
