//! Error types for Hello Lattice.
//!
//! Two layers live here:
//!
//! - [`ErrorCode`] and [`StartupError`]: the closed startup taxonomy. Each
//!   code owns a fixed message template with positional parameters, and the
//!   code travels with the formatted message for programmatic dispatch
//!   (typically mapping to a process exit status).
//! - [`Error`]: the general error type returned by every fallible operation
//!   in this crate.

use std::fmt;
use std::time::Duration;

use crate::async_runtime::AsyncRuntimeError;

/// Startup failure codes.
///
/// The discriminants are the process exit statuses of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// Not a failure. Present so the template table covers every status.
    Success = 0,
    /// The background property-name resolution was cancelled.
    PropertyNameRetrievalCancelled = 1,
    /// The view has no class name to instantiate.
    NoWindowClass = 2,
}

impl ErrorCode {
    /// Every code, in discriminant order.
    pub const ALL: [ErrorCode; 3] = [
        ErrorCode::Success,
        ErrorCode::PropertyNameRetrievalCancelled,
        ErrorCode::NoWindowClass,
    ];

    /// The message template for this code.
    ///
    /// Placeholders are positional (`{0}`, `{1}`, ...). `{{` and `}}` are
    /// literal braces.
    pub const fn template(self) -> &'static str {
        match self {
            Self::Success => "The operation completed successfully.",
            Self::PropertyNameRetrievalCancelled => {
                "The retrieval of {0} which should be \"{1}\" was cancelled"
            }
            Self::NoWindowClass => "Window has no class name",
        }
    }

    /// The process exit status associated with this code.
    pub const fn exit_code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "Success",
            Self::PropertyNameRetrievalCancelled => "PropertyNameRetrievalCancelled",
            Self::NoWindowClass => "NoWindowClass",
        };
        f.write_str(name)
    }
}

/// Format the template of `code` with positional `params`.
///
/// Parameters beyond the highest placeholder are ignored.
///
/// # Panics
///
/// Panics if the template references a parameter that was not supplied, or
/// contains an unbalanced brace. Both indicate a mismatch between a call site
/// and the fixed template table.
pub fn format_message(code: ErrorCode, params: &[&dyn fmt::Display]) -> String {
    let template = code.template();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => index.push(d),
                        _ => panic!("malformed placeholder in template for {code}"),
                    }
                }
                let position: usize = index
                    .parse()
                    .unwrap_or_else(|_| panic!("empty placeholder in template for {code}"));
                let param = params.get(position).unwrap_or_else(|| {
                    panic!(
                        "template for {code} needs parameter {position}, got {}",
                        params.len()
                    )
                });
                out.push_str(&param.to_string());
            }
            '}' => panic!("unbalanced '}}' in template for {code}"),
            other => out.push(other),
        }
    }

    out
}

/// A startup failure carrying its code and formatted message.
#[derive(Debug)]
pub struct StartupError {
    code: ErrorCode,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StartupError {
    /// Build an error for `code`, formatting its template with `params`.
    ///
    /// `source` is the lower-level failure that caused this one, if any.
    pub fn new(
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        code: ErrorCode,
        params: &[&dyn fmt::Display],
    ) -> Self {
        Self {
            code,
            message: format_message(code, params),
            source,
        }
    }

    /// The startup code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The formatted message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// The main error type for Hello Lattice operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required value was absent.
    #[error("{message} (parameter '{parameter}')")]
    NullArgument {
        /// The name of the rejected parameter or property.
        parameter: &'static str,
        /// What the caller should have done instead.
        message: String,
    },

    /// A value had the wrong kind, or could not be coerced.
    #[error("{0}")]
    InvalidArgument(String),

    /// A conversion strategy was used outside its accepted contract.
    #[error("{0}")]
    UnsupportedOperation(String),

    /// A lookup key was absent from its registry.
    #[error("Text \"{key}\" is not present in the text catalog")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// A bounded wait expired.
    #[error("Could not retrieve {subject} within {timeout:?}")]
    Timeout {
        /// What was being waited for.
        subject: String,
        /// The deadline that expired.
        timeout: Duration,
    },

    /// A background task panicked or was torn down unexpectedly.
    #[error("Background task failed: {0}")]
    TaskFailed(String),

    /// Rendering to an output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The async runtime could not be created.
    #[error(transparent)]
    Runtime(#[from] AsyncRuntimeError),

    /// A startup failure with a taxonomy code.
    #[error(transparent)]
    Startup(#[from] StartupError),
}

impl Error {
    /// Create a null-argument error.
    pub fn null_argument(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::NullArgument {
            parameter,
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    /// The startup code, if this is a startup failure.
    pub fn startup_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Startup(err) => Some(err.code()),
            _ => None,
        }
    }

    /// The process exit status for this failure.
    ///
    /// Startup failures exit with their code; anything else exits with
    /// [`OTHER_FAILURE_EXIT_CODE`].
    pub fn exit_code(&self) -> u8 {
        self.startup_code()
            .map_or(OTHER_FAILURE_EXIT_CODE, ErrorCode::exit_code)
    }
}

/// Exit status for failures outside the startup taxonomy.
pub const OTHER_FAILURE_EXIT_CODE: u8 = 3;

/// A specialized Result type for Hello Lattice operations.
pub type Result<T> = std::result::Result<T, Error>;
