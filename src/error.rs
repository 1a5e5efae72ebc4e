//! Error types for randstream
//!
//! Every failure carries the source location where it was raised and maps to a
//! stable [`ErrorCode`]. Callers that cannot propagate a structured [`Error`]
//! (FFI shims, bindings) convert at the boundary with [`status`] or
//! [`catch_all`].

use crate::dtype::DType;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};
use thiserror::Error;

/// Result type alias using randstream's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable status codes
///
/// Discriminants are stable and shared with C-style consumers. `Success` is
/// only ever produced by the boundary adapters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(i32)]
pub enum ErrorCode {
    /// The call completed
    Success = 0,
    /// A buffer could not be allocated
    NoMemory = 101,
    /// A backend failed while executing work
    Runtime = 103,
    /// An argument had an invalid value
    Argument = 202,
    /// An argument had the wrong length or shape
    Size = 203,
    /// An argument had an unsupported element type
    Type = 204,
    /// The active backend does not implement the request
    NotSupported = 301,
    /// Internal invariant violated
    Internal = 998,
    /// Failure that could not be classified (e.g. a panic)
    Unknown = 999,
}

impl ErrorCode {
    /// Raw numeric value
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true for [`ErrorCode::Success`]
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.as_i32())
    }
}

/// Source location where an error was raised
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SourceLocation(&'static Location<'static>);

impl SourceLocation {
    /// Location of the caller
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self(Location::caller())
    }

    /// Source file
    pub fn file(&self) -> &'static str {
        self.0.file()
    }

    /// Line number
    pub fn line(&self) -> u32 {
        self.0.line()
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.file(), self.0.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.file(), self.0.line())
    }
}

/// Errors that can occur in randstream operations
#[derive(Error, Debug)]
pub enum Error {
    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Element type not supported by the requested operation
    #[error("Unsupported dtype {dtype} for argument {arg_index} of '{op}' at {location}")]
    TypeMismatch {
        /// The operation name
        op: &'static str,
        /// Position of the offending argument
        arg_index: usize,
        /// The unsupported dtype
        dtype: DType,
        /// Where the error was raised
        location: SourceLocation,
    },

    /// Argument length or shape does not match the fixed expectation
    #[error("Invalid size for argument {arg_index} of '{op}': expected {expected} at {location}")]
    Dimension {
        /// The operation name
        op: &'static str,
        /// Position of the offending argument
        arg_index: usize,
        /// Condition the argument must satisfy
        expected: String,
        /// Where the error was raised
        location: SourceLocation,
    },

    /// Backend does not implement the requested engine or operation
    #[error("{backend} backend does not support {feature} at {location}")]
    UnsupportedBackend {
        /// Runtime name
        backend: &'static str,
        /// What was requested
        feature: &'static str,
        /// Where the error was raised
        location: SourceLocation,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Generic failure with an explicit code
    #[error("{message} ({code}) at {location}")]
    Generic {
        /// Human-readable message
        message: String,
        /// Status code reported at the boundary
        code: ErrorCode,
        /// Where the error was raised
        location: SourceLocation,
    },
}

impl Error {
    /// Create a type mismatch error for argument `arg_index` of `op`
    #[track_caller]
    pub fn type_mismatch(op: &'static str, arg_index: usize, dtype: DType) -> Self {
        Self::TypeMismatch {
            op,
            arg_index,
            dtype,
            location: SourceLocation::caller(),
        }
    }

    /// Create a dimension error for argument `arg_index` of `op`
    #[track_caller]
    pub fn dimension(op: &'static str, arg_index: usize, expected: impl Into<String>) -> Self {
        Self::Dimension {
            op,
            arg_index,
            expected: expected.into(),
            location: SourceLocation::caller(),
        }
    }

    /// Create an unsupported backend error
    #[track_caller]
    pub fn unsupported_backend(backend: &'static str, feature: &'static str) -> Self {
        Self::UnsupportedBackend {
            backend,
            feature,
            location: SourceLocation::caller(),
        }
    }

    /// Create a generic error with an explicit code
    #[track_caller]
    pub fn generic(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Generic {
            message: message.into(),
            code,
            location: SourceLocation::caller(),
        }
    }

    /// Status code reported for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfMemory { .. } => ErrorCode::NoMemory,
            Self::TypeMismatch { .. } => ErrorCode::Type,
            Self::Dimension { .. } => ErrorCode::Size,
            Self::UnsupportedBackend { .. } => ErrorCode::NotSupported,
            Self::InvalidArgument { .. } => ErrorCode::Argument,
            Self::Generic { code, .. } => *code,
        }
    }

    /// Source location, when the error records one
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Self::TypeMismatch { location, .. }
            | Self::Dimension { location, .. }
            | Self::UnsupportedBackend { location, .. }
            | Self::Generic { location, .. } => Some(*location),
            Self::OutOfMemory { .. } | Self::InvalidArgument { .. } => None,
        }
    }

    /// Position of the offending argument, for type and dimension errors
    pub fn arg_index(&self) -> Option<usize> {
        match self {
            Self::TypeMismatch { arg_index, .. } | Self::Dimension { arg_index, .. } => {
                Some(*arg_index)
            }
            _ => None,
        }
    }
}

/// Convert a result into a status code
///
/// Errors are logged before being flattened.
pub fn status<T>(result: &Result<T>) -> ErrorCode {
    match result {
        Ok(_) => ErrorCode::Success,
        Err(err) => {
            tracing::warn!(code = err.code().as_i32(), error = %err, "random operation failed");
            err.code()
        }
    }
}

/// Run `f` and convert its outcome, including a panic, into a status code
pub fn catch_all<F>(f: F) -> ErrorCode
where
    F: FnOnce() -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => status(&result),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(%message, "panic caught at status boundary");
            ErrorCode::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::Success.as_i32(), 0);
        assert_eq!(ErrorCode::NoMemory.as_i32(), 101);
        assert_eq!(ErrorCode::Size.as_i32(), 203);
        assert_eq!(ErrorCode::Type.as_i32(), 204);
        assert_eq!(ErrorCode::NotSupported.as_i32(), 301);
        assert_eq!(ErrorCode::Unknown.as_i32(), 999);
    }

    #[test]
    fn test_type_mismatch_records_caller() {
        let line = line!() + 1;
        let err = Error::type_mismatch("normal", 2, DType::I32);
        assert_eq!(err.code(), ErrorCode::Type);
        assert_eq!(err.arg_index(), Some(2));

        let loc = err.location().unwrap();
        assert!(loc.file().ends_with("error.rs"));
        assert_eq!(loc.line(), line);
    }

    #[test]
    fn test_dimension_message() {
        let err = Error::dimension("init_mersenne_state", 1, "512 elements");
        let msg = err.to_string();
        assert!(msg.contains("argument 1"));
        assert!(msg.contains("512 elements"));
        assert_eq!(err.code(), ErrorCode::Size);
    }

    #[test]
    fn test_generic_keeps_code() {
        let err = Error::generic("kernel launch failed", ErrorCode::Runtime);
        assert_eq!(err.code(), ErrorCode::Runtime);
        assert!(err.location().is_some());
    }

    #[test]
    fn test_status_boundary() {
        let ok: Result<u32> = Ok(1);
        assert_eq!(status(&ok), ErrorCode::Success);

        let err: Result<u32> = Err(Error::unsupported_backend("cpu", "mersenne"));
        assert_eq!(status(&err), ErrorCode::NotSupported);
    }

    #[test]
    fn test_catch_all_maps_panics() {
        assert_eq!(catch_all(|| Ok(())), ErrorCode::Success);
        assert_eq!(
            catch_all(|| Err(Error::OutOfMemory { size: 64 })),
            ErrorCode::NoMemory
        );
        assert_eq!(catch_all(|| panic!("boom")), ErrorCode::Unknown);
    }
}
