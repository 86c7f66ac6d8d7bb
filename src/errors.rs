//! # Error Handling for Benchmarks
//!
//! Every failure a benchmark can hit is folded into [`BenchError`]:
//! - configuration mistakes (missing run callback, bad config file, impossible seed shape)
//! - setup failures (unreachable or unseedable store)
//! - assertion failures (the measured operation returned the wrong data)
//! - infrastructure failures (database, report I/O)
//!
//! Failures are local to one benchmark. The runner turns them into a
//! [`BenchmarkOutcome`](crate::harness::BenchmarkOutcome) and moves on.
//!
//! ## Logging
//!
//! Details are logged through the `tracing` crate. Nothing is printed unless the
//! caller installs a subscriber:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt()
//!     .with_target(false)
//!     .compact()
//!     .init();
//! ```

use sea_orm::DbErr;
use std::fmt;
use std::path::PathBuf;

/// Benchmark error type with structured logging
#[derive(Debug)]
pub enum BenchError {
    /// The definition, config file or seed shape is invalid
    Configuration {
        /// Human-readable description
        message: String,
    },

    /// A database operation failed
    Database {
        /// What was being done when the error happened
        context: String,
        /// Underlying driver error
        internal: DbErr,
    },

    /// The measured operation produced an unexpected result
    Assertion {
        /// Human-readable description of the mismatch
        message: String,
    },

    /// A setup or run callback panicked
    Panicked {
        /// Panic payload, if it was a string
        message: String,
    },

    /// Writing or reading a file failed
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        internal: std::io::Error,
    },

    /// JSON (de)serialization failed
    Serialization {
        /// Underlying serde error
        internal: serde_json::Error,
    },

    /// Setup failed, so the benchmark never started iterating
    Setup {
        /// Benchmark whose setup failed
        benchmark: String,
        /// Original failure
        cause: Box<BenchError>,
    },
}

/// Coarse classification used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Setup,
    Assertion,
    Infrastructure,
}

impl BenchError {
    // ============================================================================
    // Constructors
    // ============================================================================

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a database error with a short description of the failed operation
    pub fn database(context: impl Into<String>, internal: DbErr) -> Self {
        Self::Database {
            context: context.into(),
            internal,
        }
    }

    /// Create an assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, internal: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            internal,
        }
    }

    /// Mark `cause` as the reason `benchmark` never got past setup
    pub fn setup(benchmark: impl Into<String>, cause: Self) -> Self {
        Self::Setup {
            benchmark: benchmark.into(),
            cause: Box::new(cause),
        }
    }

    // ============================================================================
    // Inspection
    // ============================================================================

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Setup { .. } => ErrorKind::Setup,
            Self::Assertion { .. } | Self::Panicked { .. } => ErrorKind::Assertion,
            Self::Database { .. } | Self::Io { .. } | Self::Serialization { .. } => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Log the error and its internal details against the given benchmark
    pub fn log(&self, benchmark: &str) {
        match self {
            Self::Database { context, internal } => {
                tracing::error!(
                    benchmark,
                    context = %context,
                    error = ?internal,
                    "Database error"
                );
            }
            Self::Io { path, internal } => {
                tracing::error!(
                    benchmark,
                    path = %path.display(),
                    error = %internal,
                    "I/O error"
                );
            }
            Self::Setup { cause, .. } => {
                tracing::error!(benchmark, "Setup failed, benchmark skipped");
                cause.log(benchmark);
            }
            Self::Assertion { message } => {
                tracing::error!(benchmark, %message, "Assertion failed");
            }
            _ => {
                tracing::error!(benchmark, error = %self, "Benchmark error");
            }
        }
    }
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Database { context, internal } => write!(f, "{context}: {internal}"),
            Self::Assertion { message } => write!(f, "Assertion failed: {message}"),
            Self::Panicked { message } => write!(f, "Panicked: {message}"),
            Self::Io { path, internal } => write!(f, "{}: {internal}", path.display()),
            Self::Serialization { internal } => write!(f, "Serialization error: {internal}"),
            Self::Setup { benchmark, cause } => {
                write!(f, "Setup of '{benchmark}' failed: {cause}")
            }
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { internal, .. } => Some(internal),
            Self::Io { internal, .. } => Some(internal),
            Self::Serialization { internal } => Some(internal),
            Self::Setup { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<DbErr> for BenchError {
    fn from(err: DbErr) -> Self {
        Self::database("Database operation failed", err)
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { internal: err }
    }
}

/// Fail with an assertion error unless `actual == expected`
///
/// # Errors
///
/// Returns [`BenchError::Assertion`] describing `what` when the values differ.
pub fn ensure_equal<T>(expected: T, actual: T, what: &str) -> Result<(), BenchError>
where
    T: PartialEq + fmt::Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(BenchError::assertion(format!(
            "{what}: expected {expected:?}, got {actual:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let err = BenchError::configuration("run callback is required");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.to_string(),
            "Configuration error: run callback is required"
        );
    }

    #[test]
    fn test_dberr_conversion_is_infrastructure() {
        let err: BenchError = DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_setup_wraps_cause() {
        let err = BenchError::setup(
            "Query_Funcletization_NewQueryInstance",
            BenchError::database("connect", DbErr::Custom("unreachable".to_string())),
        );
        assert_eq!(err.kind(), ErrorKind::Setup);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_panics_count_as_assertions() {
        assert_eq!(BenchError::panicked("oops").kind(), ErrorKind::Assertion);
    }

    #[test]
    fn test_ensure_equal() {
        assert!(ensure_equal(10, 10, "row count").is_ok());

        let err = ensure_equal(10, 9, "row count").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Assertion);
        assert_eq!(
            err.to_string(),
            "Assertion failed: row count: expected 10, got 9"
        );
    }
}
