//! Errors reported by the MPI runtime and by this crate
//!
//! MPI signals failure through integer return codes. [`check`] turns such a code into an
//! [`Error::Mpi`] carrying the code, its error class and the runtime's own description.

use std::os::raw::{c_char, c_int};
use std::string::FromUtf8Error;

use conv::ConvUtil;
use thiserror::Error;

use crate::environment;
use crate::ffi;
use crate::topology::Rank;

/// Result type of fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while joining, querying or leaving an MPI group
#[derive(Debug, Error)]
pub enum Error {
    /// `MPI_Init_thread` was already called in this process.
    #[error("MPI has already been initialized in this process")]
    AlreadyInitialized,
    /// `MPI_Finalize` was already called; MPI cannot be initialized a second time.
    #[error("MPI has already been finalized and cannot be initialized again")]
    AlreadyFinalized,
    /// A rank and group size that violate `0 <= rank < size`.
    #[error("rank {rank} is outside a group of {size} processes")]
    InvalidPlacement {
        /// The offending rank
        rank: Rank,
        /// The group size it was paired with
        size: Rank,
    },
    /// Text that is not of the form `<rank>/<size>`.
    #[error("`{text}` is not of the form <rank>/<size>")]
    ParsePlacement {
        /// The rejected text
        text: String,
    },
    /// The runtime reported a thread support level it does not define.
    #[error("MPI reported unknown thread support level {0}")]
    UnknownThreading(c_int),
    /// A non-success return code from an MPI call.
    #[error("{message} (MPI error code {code}, class {class})")]
    Mpi {
        /// The raw return code
        code: c_int,
        /// The error class of `code`, as returned by `MPI_Error_class`
        class: c_int,
        /// Description from `MPI_Error_string`
        message: String,
    },
    /// A string handed out by the runtime is not UTF-8.
    #[error("MPI returned a string that is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
    /// Writing the report failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Describe the MPI return code `code`.
    ///
    /// The error functions may only be called while MPI is initialized (MPI 3.1, 8.7), so a
    /// code from a failed `MPI_Init_thread` or from `MPI_Finalize` is reported unclassified.
    pub fn from_code(code: c_int) -> Error {
        if !environment::is_initialized() || environment::is_finalized() {
            return Error::unclassified(code);
        }
        let mut class: c_int = code;
        let res = unsafe { ffi::MPI_Error_class(code, &mut class) };
        if res != success() {
            class = code;
        }
        let message = error_string(code).unwrap_or_else(|| String::from("unknown MPI error"));
        Error::Mpi {
            code,
            class,
            message,
        }
    }

    fn unclassified(code: c_int) -> Error {
        Error::Mpi {
            code,
            class: code,
            message: String::from("MPI error outside an initialized MPI environment"),
        }
    }

    /// The raw MPI return code, for errors that came from the runtime
    pub fn code(&self) -> Option<c_int> {
        match *self {
            Error::Mpi { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// `MPI_SUCCESS`
pub(crate) fn success() -> c_int {
    unsafe { ffi::MPIP_SUCCESS }
}

/// Map an MPI return code to `Ok(())` or the matching [`Error::Mpi`].
pub fn check(code: c_int) -> Result<()> {
    if code == success() {
        Ok(())
    } else {
        Err(Error::from_code(code))
    }
}

fn error_string(code: c_int) -> Option<String> {
    let capacity: usize = unsafe { ffi::MPIP_MAX_ERROR_STRING }
        .value_as()
        .unwrap_or(0);
    let mut buf = vec![0u8; capacity];
    let mut len: c_int = 0;
    let res = unsafe { ffi::MPI_Error_string(code, buf.as_mut_ptr() as *mut c_char, &mut len) };
    if res != success() {
        return None;
    }
    buf.truncate(len.value_as::<usize>().unwrap_or(0));
    Some(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_errors_name_both_numbers() {
        let err = Error::InvalidPlacement { rank: 4, size: 4 };
        assert_eq!(err.to_string(), "rank 4 is outside a group of 4 processes");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn mpi_errors_expose_their_code() {
        let err = Error::Mpi {
            code: 5,
            class: 5,
            message: String::from("Invalid communicator"),
        };
        assert_eq!(err.code(), Some(5));
        assert_eq!(
            err.to_string(),
            "Invalid communicator (MPI error code 5, class 5)"
        );
    }

    #[test]
    fn codes_before_initialization_are_not_classified() {
        assert!(!environment::is_initialized());
        let err = Error::from_code(1);
        match err {
            Error::Mpi {
                code,
                class,
                ref message,
            } => {
                assert_eq!((code, class), (1, 1));
                assert_eq!(message, "MPI error outside an initialized MPI environment");
            }
            ref other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(check(1), Err(Error::Mpi { code: 1, class: 1, .. })));
    }

    #[test]
    fn utf8_errors_convert() {
        let bad = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err: Error = bad.into();
        assert!(matches!(err, Error::Utf8(_)));
    }
}
