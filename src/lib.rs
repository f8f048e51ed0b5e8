//! Protocol registry for a UEFI-compatible boot environment.
//!
//! # Crate organisation
//!
//! The top-level module contains the most used types, such as the result
//! and error types, GUIDs and handles.
//!
//! The [`registry`] module contains the protocol database itself: a
//! firmware-lifetime table that maps a GUID to a capability interface on a
//! per-handle basis. Firmware components publish interfaces with
//! [`Registry::install_protocol_interface`], and later firmware phases,
//! boot loaders and the OS retrieve them with
//! [`Registry::open_protocol`] or by searching all handles for a GUID.
//!
//! The [`proto`] module contains the protocols published through the
//! registry. Currently that is the RISC-V EFI Boot Protocol, which lets a
//! booted OS query the hart the firmware used to start it.
//!
//! # Adapting to local conditions
//!
//! Protocols *may* or *may not* be present on a certain system. A platform
//! without the corresponding boot-time state simply never registers the
//! protocol, and lookups return [`Status::NotFound`] rather than failing
//! the boot.
//!
//! [`Registry::install_protocol_interface`]: registry::Registry::install_protocol_interface
//! [`Registry::open_protocol`]: registry::Registry::open_protocol

#![no_std]
#![warn(missing_docs, unused)]
#![warn(unsafe_op_in_unsafe_fn)]
#![warn(clippy::ptr_as_ptr)]

extern crate alloc;

pub mod data_types;
pub use self::data_types::{Guid, Handle, Identify};
pub use uguid::guid;

mod result;
pub use self::result::{Error, Result, ResultExt, Status, StatusExt};

pub mod registry;
pub use self::registry::{Registry, UninstallPolicy};

pub mod proto;
