use super::{Error, Result};
use core::fmt::{self, Debug, Display, Formatter};

const HIGHEST_BIT_SET: usize = !((!0_usize) >> 1);

/// Status codes are returned by registry and protocol interfaces to
/// indicate whether an operation completed successfully.
///
/// The numeric values follow the UEFI convention: the high bit marks an
/// error, and the error numbers below match the codes a firmware consumer
/// expects for the same condition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[must_use]
#[repr(usize)]
pub enum Status {
    /// The operation completed successfully.
    Success = 0,
    /// A parameter was incorrect.
    InvalidParameter = 2 | HIGHEST_BIT_SET,
    /// The operation is not supported.
    Unsupported = 3 | HIGHEST_BIT_SET,
    /// A resource has run out.
    OutOfResources = 9 | HIGHEST_BIT_SET,
    /// The item was not found.
    NotFound = 14 | HIGHEST_BIT_SET,
    /// Access was denied.
    AccessDenied = 15 | HIGHEST_BIT_SET,
    /// The protocol has already been started.
    AlreadyStarted = 20 | HIGHEST_BIT_SET,
    /// The operation was aborted.
    Aborted = 21 | HIGHEST_BIT_SET,
}

impl Status {
    /// Returns true if status code indicates success.
    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// Returns true if the status code indicates an error.
    #[inline]
    #[must_use]
    pub fn is_error(self) -> bool {
        (self as usize) & HIGHEST_BIT_SET != 0
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Extension trait which provides some convenience methods for [`Status`].
pub trait StatusExt {
    /// Converts this status code into a [`Result`].
    ///
    /// If the status does not indicate success, the status representing the
    /// specific error code is embedded into the `Err` variant of type
    /// [`Error`].
    fn to_result(self) -> Result;

    /// Converts this status code into a [`Result`] with a given `Ok` value.
    ///
    /// If the status does not indicate success, the status representing the
    /// specific error code is embedded into the `Err` variant of type
    /// [`Error`].
    fn to_result_with_val<T>(self, val: impl FnOnce() -> T) -> Result<T, ()>;
}

impl StatusExt for Status {
    #[inline]
    fn to_result(self) -> Result {
        if self.is_success() {
            Ok(())
        } else {
            Err(self.into())
        }
    }

    #[inline]
    fn to_result_with_val<T>(self, val: impl FnOnce() -> T) -> Result<T, ()> {
        if self.is_success() {
            Ok(val())
        } else {
            Err(self.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_result() {
        assert!(Status::Success.to_result().is_ok());
        assert!(Status::NotFound.to_result().is_err());
        assert!(Status::AccessDenied.to_result().is_err());

        assert_eq!(Status::Success.to_result_with_val(|| 123).unwrap(), 123);
        assert!(Status::NotFound.to_result_with_val(|| 123).is_err());
    }

    #[test]
    fn test_error_bit() {
        assert!(Status::Success.is_success());
        assert!(!Status::Success.is_error());
        for status in [
            Status::InvalidParameter,
            Status::Unsupported,
            Status::OutOfResources,
            Status::NotFound,
            Status::AccessDenied,
            Status::AlreadyStarted,
            Status::Aborted,
        ] {
            assert!(status.is_error());
            assert!(!status.is_success());
        }
    }
}
