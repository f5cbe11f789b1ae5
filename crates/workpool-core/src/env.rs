//! Environment variable utilities
//!
//! Generic `env_get<T>` function for parsing environment variables with defaults.
//!
//! # Usage
//!
//! ```ignore
//! use workpool_core::env::{env_get, env_get_bool};
//!
//! // Get with type inference
//! let workers: usize = env_get("WP_WORKERS", 6);
//! let port: u16 = env_get("WP_PORT", 3490);
//!
//! // Boolean helper (accepts "1", "true", "yes", "on")
//! let debug: bool = env_get_bool("WP_DEBUG", false);
//! ```

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
///
/// Works with any type that implements `FromStr`.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean
///
/// Accepts: "1", "true", "yes", "on" (case-insensitive) as true.
/// Everything else (including unset) returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Get environment variable as optional value
///
/// Returns `Some(T)` if the variable is set and parses successfully,
/// `None` otherwise.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        // Unset variable should return default
        let val: usize = env_get("__WP_TEST_UNSET_VAR__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn test_env_get_bool_default() {
        assert!(env_get_bool("__WP_TEST_UNSET_VAR__", true));
        assert!(!env_get_bool("__WP_TEST_UNSET_VAR__", false));
    }

    #[test]
    fn test_env_get_opt_none() {
        let val: Option<usize> = env_get_opt("__WP_TEST_UNSET_VAR__");
        assert!(val.is_none());
    }

    #[test]
    fn test_env_get_with_set_var() {
        std::env::set_var("__WP_TEST_VAR_NUM__", "123");
        let val: usize = env_get("__WP_TEST_VAR_NUM__", 0);
        assert_eq!(val, 123);
        std::env::remove_var("__WP_TEST_VAR_NUM__");
    }

    #[test]
    fn test_env_get_bool_variants() {
        std::env::set_var("__WP_TEST_BOOL__", "1");
        assert!(env_get_bool("__WP_TEST_BOOL__", false));

        std::env::set_var("__WP_TEST_BOOL__", "TRUE");
        assert!(env_get_bool("__WP_TEST_BOOL__", false));

        std::env::set_var("__WP_TEST_BOOL__", "on");
        assert!(env_get_bool("__WP_TEST_BOOL__", false));

        std::env::set_var("__WP_TEST_BOOL__", "0");
        assert!(!env_get_bool("__WP_TEST_BOOL__", true));

        std::env::set_var("__WP_TEST_BOOL__", "garbage");
        assert!(!env_get_bool("__WP_TEST_BOOL__", false));

        std::env::remove_var("__WP_TEST_BOOL__");
    }

    #[test]
    fn test_env_get_invalid_parse() {
        std::env::set_var("__WP_TEST_INVALID__", "not_a_number");
        let val: usize = env_get("__WP_TEST_INVALID__", 99);
        assert_eq!(val, 99); // Should return default on parse failure
        std::env::remove_var("__WP_TEST_INVALID__");
    }
}
