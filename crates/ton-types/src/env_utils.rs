//! Environment variable parsing utilities.
//!
//! Every runtime knob of the replay engine can be overridden from the
//! environment. These helpers keep the parse-or-default boilerplate in one
//! place:
//!
//! ```
//! use ton_replay_types::env_utils::{env_var, env_var_or};
//!
//! let delay_ms: u64 = env_var_or("TON_REPLAY_REQUEST_DELAY_MS", 1000);
//! let custom: Option<u64> = env_var("TON_REPLAY_TIMEOUT_SECS");
//! ```

use std::str::FromStr;
use std::time::Duration;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
///
/// ```
/// use ton_replay_types::env_utils::env_var_or;
///
/// let retries: usize = env_var_or("TON_REPLAY_SOMETHING_UNSET", 3);
/// assert_eq!(retries, 3);
/// ```
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Check if an environment variable is set to a truthy value, with a default.
///
/// "1", "true", "yes" and "on" (case-insensitive) count as true.
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key).ok() {
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

/// Read a string variable, treating an empty or whitespace-only value as unset.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a millisecond duration, e.g. `TON_REPLAY_REQUEST_DELAY_MS=250`.
pub fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_var_or(key, default_ms))
}

/// Read a duration expressed in whole seconds.
pub fn env_duration_secs(key: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_var_or(key, default_secs))
}
