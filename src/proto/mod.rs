//! Protocol definitions.
//!
//! Protocols are sets of related functionality identified by a unique
//! ID. They are published through the [`Registry`] by the firmware
//! component that implements them, and discovered by GUID by everything
//! that runs later: other firmware phases, boot loaders, and the OS.
//!
//! [`Registry`]: crate::registry::Registry

pub mod riscv;

use crate::Identify;
use core::any::Any;

/// Common trait implemented by all protocols that can be published through
/// the registry.
///
/// Implementing a protocol means declaring its GUID with an
/// `unsafe impl` of [`Identify`] and then marking the type:
///
/// ```
/// use efi_registry::{guid, Guid, Identify};
/// use efi_registry::proto::Protocol;
///
/// struct ExampleProtocol {}
///
/// unsafe impl Identify for ExampleProtocol {
///     const GUID: Guid = guid!("12345678-9abc-def0-1234-56789abcdef0");
/// }
/// impl Protocol for ExampleProtocol {}
///
/// assert_eq!(ExampleProtocol::GUID, guid!("12345678-9abc-def0-1234-56789abcdef0"));
/// ```
///
/// The [`Any`] supertrait is what lets the registry store interfaces
/// type-erased and hand them back as the concrete type on lookup: a
/// GUID/type mismatch is reported as an error instead of reinterpreting
/// memory.
pub trait Protocol: Identify + Any {}
