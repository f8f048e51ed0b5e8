use super::Status;
use core::fmt::{self, Debug, Display, Formatter};

/// An error status, together with optional additional data describing the
/// failure.
///
/// Most operations carry no additional payload, in which case the `Data`
/// parameter defaults to `()` and the error is just a wrapped [`Status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error<Data: Debug = ()> {
    status: Status,
    data: Data,
}

impl<Data: Debug> Error<Data> {
    /// Create an `Error`.
    pub const fn new(status: Status, data: Data) -> Self {
        Self { status, data }
    }

    /// Get error [`Status`].
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Get a reference to the error data.
    pub const fn data(&self) -> &Data {
        &self.data
    }

    /// Split this error into its inner status and error data.
    pub fn split(self) -> (Status, Data) {
        (self.status, self.data)
    }
}

impl From<Status> for Error<()> {
    fn from(status: Status) -> Self {
        Self::new(status, ())
    }
}

impl<Data: Debug> Display for Error<Data> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EFI error {}: {:?}", self.status(), self.data())
    }
}
