//! Facilities for dealing with firmware operation results.
use core::fmt::Debug;

/// The error type that we use, essentially a status code + optional additional data
mod error;
pub use self::error::Error;

/// Definition of the standard status codes
mod status;
pub use self::status::{Status, StatusExt};

/// Return type of most registry operations. Both success and error payloads
/// are optional.
///
/// Almost every operation provides a status code as an output which
/// indicates either success or an error. This type alias maps
/// [`Status::Success`] to the `Ok` variant (with optional `Output` data),
/// and maps error statuses to the `Err` variant (with optional `ErrData`).
///
/// Some convenience methods are provided by the [`ResultExt`] trait.
pub type Result<Output = (), ErrData = ()> = core::result::Result<Output, Error<ErrData>>;

/// Extension trait which provides some convenience methods for [`Result`].
pub trait ResultExt<Output, ErrData: Debug> {
    /// Extract the status from this result
    fn status(&self) -> Status;

    /// Transform the ErrData value to ()
    fn discard_errdata(self) -> Result<Output>;
}

impl<Output, ErrData: Debug> ResultExt<Output, ErrData> for Result<Output, ErrData> {
    fn status(&self) -> Status {
        match self {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }

    fn discard_errdata(self) -> Result<Output> {
        match self {
            Ok(o) => Ok(o),
            Err(e) => Err(e.status().into()),
        }
    }
}
