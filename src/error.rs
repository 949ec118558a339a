//! Error types for evictkit.
//!
//! - [`InvariantError`]: a cache or queue failed its `check_invariants`
//!   self-check. Seeing one means a bug in this crate.
//! - [`ConfigError`]: a fallible constructor rejected its parameters.
//!
//! Misuse that cannot be expressed as a `Result` without burdening every call,
//! such as touching a stale queue handle or using a purged cache, panics.
//!
//! ```
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//! use evictkit::error::ConfigError;
//!
//! let bad: Result<_, ConfigError> = CacheBuilder::new(16)
//!     .try_build::<u64, String>(CachePolicy::LruK { k: 0, history_capacity: 16 });
//! assert!(bad.is_err());
//! ```

use std::fmt;

macro_rules! message_error {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            #[inline]
            pub fn new(msg: impl Into<String>) -> Self {
                Self(msg.into())
            }

            /// Human-readable description of what went wrong.
            #[inline]
            pub fn message(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::error::Error for $name {}
    };
}

message_error! {
    /// Returned by `check_invariants` when internal bookkeeping disagrees with
    /// itself, e.g. an index entry pointing at a handle its queue no longer holds.
    InvariantError
}

message_error! {
    /// Returned by `try_new` and `try_build` when a parameter is out of range.
    ///
    /// ```
    /// use evictkit::policy::lru_k::LrukCache;
    ///
    /// let err = LrukCache::<u64, u64>::try_new(0, 8, 8).unwrap_err();
    /// assert!(err.message().contains("k must be"));
    /// ```
    ConfigError
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index holds 3 keys, queue holds 2 entries");
        assert_eq!(err.to_string(), "index holds 3 keys, queue holds 2 entries");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("stale handle in index");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("stale handle in index"));
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_propagates_through_question_mark() {
        fn check(ok: bool) -> Result<(), InvariantError> {
            if ok {
                Ok(())
            } else {
                Err(InvariantError::new("queue walk mismatch"))
            }
        }
        fn outer() -> Result<(), Box<dyn std::error::Error>> {
            check(true)?;
            check(false)?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert_eq!(err.to_string(), "queue walk mismatch");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("k must be at least 1");
        assert_eq!(err.to_string(), "k must be at least 1");
    }

    #[test]
    fn config_debug_includes_message() {
        let err = ConfigError::new("history capacity too large");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("history capacity too large"));
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
