/*!
Specialized `Error` and `Result` types for hmem.
*/

use std::{fmt, result};

use log::warn;

/// Specialized `Error` type for hmem errors.
///
/// An error consists of the place it originated from and the kind of failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Error(pub ErrorOrigin, pub ErrorKind);

impl Error {
    /// Returns a static string representing the type of error.
    pub fn as_str(&self) -> &'static str {
        self.1.to_str()
    }

    /// Encodes the error as a negative status code.
    ///
    /// The encoding is stable and can be turned back into an `Error` with [`Error::from_i32`].
    pub const fn into_i32(self) -> i32 {
        let origin = ((self.0 as i32 + 1) & 0xFFFi32) << 4;
        let kind = ((self.1 as i32 + 1) & 0xFFFi32) << 16;
        -(1 + origin + kind)
    }

    /// Decodes a status code produced by [`Error::into_i32`].
    ///
    /// Unknown origins or kinds decode to `ErrorOrigin::Other` / `ErrorKind::Unknown`.
    pub fn from_i32(error: i32) -> Self {
        let origin = ((-error - 1) >> 4i32) & 0xFFFi32;
        let kind = ((-error - 1) >> 16i32) & 0xFFFi32;

        let error_origin = ErrorOrigin::ALL
            .iter()
            .copied()
            .find(|o| *o as i32 + 1 == origin)
            .unwrap_or(ErrorOrigin::Other);

        let error_kind = ErrorKind::ALL
            .iter()
            .copied()
            .find(|k| *k as i32 + 1 == kind)
            .unwrap_or(ErrorKind::Unknown);

        Self(error_origin, error_kind)
    }

    /// Logs the error together with `err` as context at warn level and returns it.
    pub fn log_warn(self, err: impl fmt::Display) -> Self {
        warn!("{}: {} ({})", self.0.to_str(), self.1.to_str(), err);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.0.to_str(), self.1.to_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convert from PartialError
impl<T> From<PartialError<T>> for Error {
    fn from(err: PartialError<T>) -> Self {
        err.error()
    }
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorOrigin {
    Args,
    HmemIface,
    Backend,
    Other,
}

impl ErrorOrigin {
    const ALL: [ErrorOrigin; 4] = [
        ErrorOrigin::Args,
        ErrorOrigin::HmemIface,
        ErrorOrigin::Backend,
        ErrorOrigin::Other,
    ];

    /// Returns a static string representing the type of error.
    pub fn to_str(self) -> &'static str {
        match self {
            ErrorOrigin::Args => "args",
            ErrorOrigin::HmemIface => "hmem iface",
            ErrorOrigin::Backend => "backend",
            ErrorOrigin::Other => "other",
        }
    }
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Uninitialized,
    NotSupported,

    ArgNotExists,
    ArgValidation,

    InvalidKind,
    DeviceNotFound,

    OutOfBounds,
    UnableToReadMemory,
    UnableToWriteMemory,

    Unknown,
}

impl ErrorKind {
    const ALL: [ErrorKind; 10] = [
        ErrorKind::Uninitialized,
        ErrorKind::NotSupported,
        ErrorKind::ArgNotExists,
        ErrorKind::ArgValidation,
        ErrorKind::InvalidKind,
        ErrorKind::DeviceNotFound,
        ErrorKind::OutOfBounds,
        ErrorKind::UnableToReadMemory,
        ErrorKind::UnableToWriteMemory,
        ErrorKind::Unknown,
    ];

    /// Returns a static string representing the type of error.
    pub fn to_str(self) -> &'static str {
        match self {
            ErrorKind::Uninitialized => "uninitialized",
            ErrorKind::NotSupported => "not supported",

            ErrorKind::ArgNotExists => "the given argument does not exist",
            ErrorKind::ArgValidation => "the argument could not be validated",

            ErrorKind::InvalidKind => "memory kind is out of range",
            ErrorKind::DeviceNotFound => "no device found",

            ErrorKind::OutOfBounds => "out of bounds",
            ErrorKind::UnableToReadMemory => "unable to read memory",
            ErrorKind::UnableToWriteMemory => "unable to write memory",

            ErrorKind::Unknown => "unknown error",
        }
    }
}

/// Specialized `PartialError` type for operations that can fail after making progress.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum PartialError<T> {
    /// Hard Error
    ///
    /// The operation failed before any progress could be reported.
    Error(Error),
    /// Partial Copy Error
    ///
    /// A copy failed midway. Contains the progress made before the failure
    /// and the error reported by the backend.
    PartialCopy(T, Error),
}

/// Convert from Error
impl<T> From<Error> for PartialError<T> {
    fn from(err: Error) -> Self {
        PartialError::Error(err)
    }
}

impl<T> PartialError<T> {
    /// Returns the underlying error.
    pub fn error(&self) -> Error {
        match self {
            PartialError::Error(e) => *e,
            PartialError::PartialCopy(_, e) => *e,
        }
    }

    /// Returns a static string representing the type of error.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartialError::Error(e) => e.as_str(),
            PartialError::PartialCopy(_, _) => "partial copy",
        }
    }
}

/// Custom fmt::Debug impl for the specialized hmem `Error` type.
/// This is required due to our generic type T.
impl<T> fmt::Debug for PartialError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string())
    }
}

impl<T> fmt::Display for PartialError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PartialError::Error(e) => fmt::Display::fmt(e, f),
            PartialError::PartialCopy(_, e) => write!(f, "{} ({})", self.as_str(), e),
        }
    }
}

#[cfg(feature = "std")]
impl<T> std::error::Error for PartialError<T> {}

/// Specialized `Result` type for hmem results.
pub type Result<T> = result::Result<T, Error>;

/// Specialized `PartialResult` type for hmem results with progress attached to the error.
pub type PartialResult<T> = result::Result<T, PartialError<T>>;

/// Specialized `PartialResult` extension for results.
pub trait PartialResultExt<T> {
    /// Tries to extract the data from the `Result`.
    /// This will return a full error even if a partial error happened.
    fn data(self) -> Result<T>;

    /// Tries to extract the data or partial data from the `Result`.
    /// This will return a full error only if a hard error happened.
    /// A partial error will be converted to an `Ok(T)`.
    fn data_part(self) -> Result<T>;

    /// Maps the data contained in the partial result to another result.
    /// This is especially useful if you want to return a different result type
    /// but want to keep the partial result information.
    fn map_data<U, F: FnOnce(T) -> U>(self, func: F) -> PartialResult<U>;
}

impl<T> PartialResultExt<T> for PartialResult<T> {
    fn data(self) -> Result<T> {
        self.map_err(|err| err.error())
    }

    fn data_part(self) -> Result<T> {
        match self {
            Ok(data) => Ok(data),
            Err(PartialError::PartialCopy(data, _)) => Ok(data),
            Err(PartialError::Error(e)) => Err(e),
        }
    }

    fn map_data<U, F: FnOnce(T) -> U>(self, func: F) -> PartialResult<U> {
        match self {
            Ok(data) => Ok(func(data)),
            Err(PartialError::Error(e)) => Err(PartialError::Error(e)),
            Err(PartialError::PartialCopy(data, e)) => {
                Err(PartialError::PartialCopy(func(data), e))
            }
        }
    }
}

/// Progress accounting for copies that report the number of bytes moved.
pub trait TransferredExt {
    /// Returns the number of bytes that were moved, regardless of whether the copy succeeded.
    fn transferred(&self) -> usize;
}

impl TransferredExt for PartialResult<usize> {
    fn transferred(&self) -> usize {
        match self {
            Ok(done) => *done,
            Err(PartialError::PartialCopy(done, _)) => *done,
            Err(PartialError::Error(_)) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_roundtrip() {
        let err = Error(ErrorOrigin::Backend, ErrorKind::UnableToWriteMemory);
        let code = err.into_i32();
        assert!(code < 0);
        assert_eq!(Error::from_i32(code), err);
    }

    #[test]
    fn status_code_unknown() {
        let err = Error::from_i32(-1);
        assert_eq!(err, Error(ErrorOrigin::Other, ErrorKind::Unknown));
    }

    #[test]
    fn display() {
        let err = Error(ErrorOrigin::HmemIface, ErrorKind::InvalidKind);
        assert_eq!(err.to_string(), "hmem iface: memory kind is out of range");
    }

    #[test]
    fn partial_data() {
        let err = Error(ErrorOrigin::Backend, ErrorKind::UnableToReadMemory);
        let res: PartialResult<usize> = Err(PartialError::PartialCopy(12, err));
        assert_eq!(res.transferred(), 12);
        assert_eq!(res.clone().data(), Err(err));
        assert_eq!(res.clone().data_part(), Ok(12));
        assert_eq!(
            res.map_data(|d| d * 2),
            Err(PartialError::PartialCopy(24, err))
        );
    }

    #[test]
    fn hard_error_data_part() {
        let err = Error(ErrorOrigin::HmemIface, ErrorKind::Uninitialized);
        let res: PartialResult<usize> = Err(err.into());
        assert_eq!(res.transferred(), 0);
        assert_eq!(res.data_part(), Err(err));
    }
}
