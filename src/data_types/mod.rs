//! Data type definitions
//!
//! This module defines the basic data types that are used throughout the
//! crate.

use core::num::NonZeroU64;

/// Opaque handle grouping the protocol interfaces that belong to one
/// logical device or object.
///
/// Handles are minted by the [`Registry`] from a monotonic counter: once a
/// value has been issued it is never reused for the lifetime of the
/// registry, so a client that cached a handle across an uninstall can
/// never be aliased onto a different object.
///
/// [`Registry`]: crate::registry::Registry
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Handle(NonZeroU64);

impl Handle {
    pub(crate) const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Get the underlying numeric value, e.g. for logging.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0.get()
    }
}

mod guid;
pub use self::guid::{Guid, Identify};
