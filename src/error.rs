//! Error types for leibniz runs.
//!
//! Every failure is an input-validation failure raised before the first term
//! is summed. Once a run has started it cannot fail.

use std::fmt;

/// Errors that can occur while validating a run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeibnizError {
    /// The inclusive upper bound cannot be iterated.
    InvalidRange {
        /// The upper bound that was requested.
        n: u64,
        /// Human-readable error message.
        message: String,
    },
    /// The worker count is zero or the thread pool could not be built.
    InvalidThreadCount {
        /// The number of workers that was requested.
        threads: usize,
        /// Human-readable error message.
        message: String,
    },
    /// The floating-point width is neither 32 nor 64 bits.
    InvalidPrecision {
        /// The width that was requested, in bits.
        bits: u32,
    },
}

impl fmt::Display for LeibnizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeibnizError::InvalidRange { n, message } => {
                write!(f, "Invalid range: {} (n: {})", message, n)
            }
            LeibnizError::InvalidThreadCount { threads, message } => {
                write!(f, "Invalid thread count: {} (threads: {})", message, threads)
            }
            LeibnizError::InvalidPrecision { bits } => write!(
                f,
                "Invalid precision: {} bits is not supported (expected 32 or 64)",
                bits
            ),
        }
    }
}

impl std::error::Error for LeibnizError {}

/// Result type alias for leibniz operations.
pub type Result<T> = std::result::Result<T, LeibnizError>;

/// Creates a range error.
pub fn range_error(n: u64, message: impl Into<String>) -> LeibnizError {
    LeibnizError::InvalidRange {
        n,
        message: message.into(),
    }
}

/// Creates a thread count error.
pub fn thread_count_error(threads: usize, message: impl Into<String>) -> LeibnizError {
    LeibnizError::InvalidThreadCount {
        threads,
        message: message.into(),
    }
}

/// Creates a precision error.
pub fn precision_error(bits: u32) -> LeibnizError {
    LeibnizError::InvalidPrecision { bits }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_display() {
        let error = range_error(u64::MAX, "term count overflows u64");
        let display = format!("{}", error);
        assert!(display.contains("Invalid range"));
        assert!(display.contains("term count overflows u64"));
        assert!(display.contains(&u64::MAX.to_string()));
    }

    #[test]
    fn test_thread_count_error_display() {
        let error = thread_count_error(0, "at least one worker is required");
        let display = format!("{}", error);
        assert!(display.contains("Invalid thread count"));
        assert!(display.contains("threads: 0"));
        assert!(display.contains("at least one worker is required"));
    }

    #[test]
    fn test_precision_error_display() {
        let error = precision_error(16);
        let display = format!("{}", error);
        assert!(display.contains("Invalid precision"));
        assert!(display.contains("16 bits"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = precision_error(16);
        let error2 = precision_error(16);
        let error3 = precision_error(128);

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = thread_count_error(0, "test error");

        let _: &dyn std::error::Error = &error;

        assert!(std::error::Error::source(&error).is_none());
    }
}
