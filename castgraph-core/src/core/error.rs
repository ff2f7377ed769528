//! Unified error handling for the castgraph pipeline
//!
//! This module provides a centralized error type covering every failure the
//! chapter pipeline can surface. Data-quality problems (malformed offsets,
//! unresolved aliases, self interactions) are deliberately *not* errors; they
//! are tolerated or reported through diagnostics instead.

use std::fmt;

/// Main error type for castgraph
#[derive(Debug)]
pub enum CastGraphError {
    /// Configuration-related errors
    Config {
        /// Error message
        message: String,
    },

    /// I/O errors from file operations
    Io(std::io::Error),

    /// Serde JSON errors
    SerdeJson(serde_json::Error),

    /// CSV manifest errors
    Csv(csv::Error),

    /// HTTP request errors
    #[cfg(feature = "ureq")]
    Http(Box<ureq::Error>),

    /// Text normalisation, chunking or tokenisation errors
    TextProcessing {
        /// Error message
        message: String,
    },

    /// Errors raised by a named-entity recognition collaborator
    EntityExtraction {
        /// Error message
        message: String,
    },

    /// A collaborator response could not be parsed into the expected shape
    Parse {
        /// Error message
        message: String,
    },

    /// An operation was invoked on a component that has not been fed yet
    NotReady {
        /// Component name
        component: String,
        /// What has to happen first
        expected: String,
    },

    /// Language model errors
    LanguageModel {
        /// Error message
        message: String,
    },

    /// Graph construction and serialisation errors
    GraphConstruction {
        /// Error message
        message: String,
    },

    /// Validation errors
    Validation {
        /// Error message
        message: String,
    },
}

impl fmt::Display for CastGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastGraphError::Config { message } => {
                write!(
                    f,
                    "Configuration error: {message}. \
                          Solution: Check your config file or start from Config::default()"
                )
            },
            CastGraphError::Io(err) => {
                write!(
                    f,
                    "I/O error: {err}. \
                          Solution: Check file permissions and that paths exist"
                )
            },
            CastGraphError::SerdeJson(err) => {
                write!(
                    f,
                    "JSON error: {err}. \
                          Solution: Verify the document matches the expected structure"
                )
            },
            CastGraphError::Csv(err) => {
                write!(f, "CSV error: {err}")
            },
            #[cfg(feature = "ureq")]
            CastGraphError::Http(err) => {
                write!(
                    f,
                    "HTTP request error: {err}. \
                          Solution: Check network connectivity and service availability"
                )
            },
            CastGraphError::TextProcessing { message } => {
                write!(f, "Text processing error: {message}")
            },
            CastGraphError::EntityExtraction { message } => {
                write!(f, "Entity extraction error: {message}")
            },
            CastGraphError::Parse { message } => {
                write!(f, "Parse error: {message}")
            },
            CastGraphError::NotReady {
                component,
                expected,
            } => {
                write!(f, "{component} is not ready: {expected}")
            },
            CastGraphError::LanguageModel { message } => {
                write!(
                    f,
                    "Language model error: {message}. \
                          Solution: Check the model endpoint or disable LLM alias clustering"
                )
            },
            CastGraphError::GraphConstruction { message } => {
                write!(f, "Graph construction error: {message}")
            },
            CastGraphError::Validation { message } => {
                write!(f, "Validation error: {message}")
            },
        }
    }
}

impl std::error::Error for CastGraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CastGraphError::Io(err) => Some(err),
            CastGraphError::SerdeJson(err) => Some(err),
            CastGraphError::Csv(err) => Some(err),
            #[cfg(feature = "ureq")]
            CastGraphError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CastGraphError {
    fn from(err: std::io::Error) -> Self {
        CastGraphError::Io(err)
    }
}

impl From<serde_json::Error> for CastGraphError {
    fn from(err: serde_json::Error) -> Self {
        CastGraphError::SerdeJson(err)
    }
}

impl From<csv::Error> for CastGraphError {
    fn from(err: csv::Error) -> Self {
        CastGraphError::Csv(err)
    }
}

#[cfg(feature = "ureq")]
impl From<ureq::Error> for CastGraphError {
    fn from(err: ureq::Error) -> Self {
        CastGraphError::Http(Box::new(err))
    }
}

impl From<crate::llm::LlmResponseError> for CastGraphError {
    fn from(err: crate::llm::LlmResponseError) -> Self {
        CastGraphError::Parse {
            message: err.to_string(),
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, CastGraphError>;

/// Trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn with_context(self, context: &str) -> Result<T>;

    /// Add context using a closure
    fn with_context_lazy<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<CastGraphError>,
{
    fn with_context(self, context: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            CastGraphError::Config { message } => CastGraphError::Config {
                message: format!("{context}: {message}"),
            },
            CastGraphError::TextProcessing { message } => CastGraphError::TextProcessing {
                message: format!("{context}: {message}"),
            },
            CastGraphError::EntityExtraction { message } => CastGraphError::EntityExtraction {
                message: format!("{context}: {message}"),
            },
            CastGraphError::Parse { message } => CastGraphError::Parse {
                message: format!("{context}: {message}"),
            },
            CastGraphError::LanguageModel { message } => CastGraphError::LanguageModel {
                message: format!("{context}: {message}"),
            },
            CastGraphError::GraphConstruction { message } => CastGraphError::GraphConstruction {
                message: format!("{context}: {message}"),
            },
            CastGraphError::Validation { message } => CastGraphError::Validation {
                message: format!("{context}: {message}"),
            },
            other => other,
        })
    }

    fn with_context_lazy<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        match self {
            Ok(value) => Ok(value),
            Err(e) => {
                let context = f();
                Err(e).with_context(&context)
            },
        }
    }
}

/// Creates a configuration error with a message
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::CastGraphError::Config {
            message: $msg.to_string(),
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::CastGraphError::Config {
            message: format!($fmt, $($arg)*),
        }
    };
}

/// Creates a parse error with a message
#[macro_export]
macro_rules! parse_error {
    ($msg:expr) => {
        $crate::CastGraphError::Parse {
            message: $msg.to_string(),
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::CastGraphError::Parse {
            message: format!($fmt, $($arg)*),
        }
    };
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Warning - something unexpected but recoverable
    Warning,
    /// Error - operation failed but the batch can continue
    Error,
    /// Critical - the run cannot continue
    Critical,
}

impl CastGraphError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CastGraphError::Config { .. } => ErrorSeverity::Critical,
            CastGraphError::Io(_) => ErrorSeverity::Error,
            CastGraphError::SerdeJson(_) | CastGraphError::Csv(_) => ErrorSeverity::Error,
            #[cfg(feature = "ureq")]
            CastGraphError::Http(_) => ErrorSeverity::Warning,
            CastGraphError::TextProcessing { .. } => ErrorSeverity::Warning,
            CastGraphError::EntityExtraction { .. } => ErrorSeverity::Error,
            CastGraphError::Parse { .. } => ErrorSeverity::Warning,
            CastGraphError::NotReady { .. } => ErrorSeverity::Error,
            CastGraphError::LanguageModel { .. } => ErrorSeverity::Warning,
            CastGraphError::GraphConstruction { .. } => ErrorSeverity::Error,
            CastGraphError::Validation { .. } => ErrorSeverity::Critical,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors let a batch skip the optional step that failed (for
    /// instance LLM clustering) and carry on with the deterministic path.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.severity(), ErrorSeverity::Warning)
    }

    /// Get error category for log fields
    pub fn category(&self) -> &'static str {
        match self {
            CastGraphError::Config { .. } => "config",
            CastGraphError::Io(_) => "io",
            CastGraphError::SerdeJson(_) | CastGraphError::Csv(_) => "serialization",
            #[cfg(feature = "ureq")]
            CastGraphError::Http(_) => "http",
            CastGraphError::TextProcessing { .. } => "text_processing",
            CastGraphError::EntityExtraction { .. } => "entity_extraction",
            CastGraphError::Parse { .. } => "parse",
            CastGraphError::NotReady { .. } => "not_ready",
            CastGraphError::LanguageModel { .. } => "language_model",
            CastGraphError::GraphConstruction { .. } => "graph",
            CastGraphError::Validation { .. } => "validation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CastGraphError::Config {
            message: "window must be positive".to_string(),
        };
        assert_eq!(
            format!("{error}"),
            "Configuration error: window must be positive. Solution: Check your config file or start from Config::default()"
        );
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), CastGraphError> = Err(parse_error!("missing key"));
        let error = result.with_context("llm clusters").unwrap_err();
        match error {
            CastGraphError::Parse { message } => assert_eq!(message, "llm clusters: missing key"),
            other => panic!("unexpected error {other:?}"),
        }

        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "chapter missing",
        ));
        assert!(matches!(
            io.with_context("reading chapter").unwrap_err(),
            CastGraphError::Io(_)
        ));
    }

    #[test]
    fn test_error_macros() {
        let error = config_error!("test message");
        assert!(matches!(error, CastGraphError::Config { .. }));

        let error = parse_error!("bad {} at {}", "value", 3);
        match error {
            CastGraphError::Parse { message } => assert_eq!(message, "bad value at 3"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_error_severity() {
        let parse = parse_error!("not json");
        assert_eq!(parse.severity(), ErrorSeverity::Warning);
        assert!(parse.is_recoverable());
        assert_eq!(parse.category(), "parse");

        let config = config_error!("bad");
        assert_eq!(config.severity(), ErrorSeverity::Critical);
        assert!(!config.is_recoverable());

        let not_ready = CastGraphError::NotReady {
            component: "TokenCounter".to_string(),
            expected: "call tokenize() first".to_string(),
        };
        assert!(!not_ready.is_recoverable());
        assert_eq!(
            not_ready.to_string(),
            "TokenCounter is not ready: call tokenize() first"
        );
    }
}
