//! The protocol database.
//!
//! The [`Registry`] is the firmware-lifetime table that maps a GUID to a
//! capability interface on a per-handle basis. A handle groups the
//! interfaces that belong to one logical device or object; the same GUID
//! may be installed on any number of handles (multiple devices implementing
//! the same capability), but only once per handle.
//!
//! The registry stores non-owning `&'static` references: ownership of an
//! interface stays with the component that registered it, for the lifetime
//! of the process.
//!
//! All calls are synchronous and complete before returning. The registry
//! assumes a single-threaded cooperative environment (firmware phases run
//! before any scheduler exists), so no locking is done. Re-entrancy through
//! "protocol installed" notification callbacks is supported: events are
//! queued during the table mutation and drained once the mutation is
//! complete, so a callback observes a consistent table and may itself
//! install further protocols.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::any::Any;
use core::num::NonZeroU64;

use log::trace;

use crate::data_types::{Guid, Handle};
use crate::proto::Protocol;
use crate::result::{Error, Result, Status};

/// Callback invoked after an interface for a watched GUID has been
/// installed.
///
/// The callback receives the registry and the handle the interface was
/// installed on. It may re-enter the registry, including installing
/// further protocols; installs performed from inside a callback are
/// queued and notified once the current delivery completes.
pub type ProtocolNotifyFn = fn(&mut Registry, Handle);

/// Policy applied by [`Registry::uninstall_protocol_interface`] when the
/// interface is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UninstallPolicy {
    /// Reject removal with [`Status::AccessDenied`] while the open-count
    /// is non-zero.
    #[default]
    Strict,
    /// Remove the binding regardless of the open-count.
    Lenient,
}

/// A single (GUID, interface) binding on a handle.
struct InterfaceEntry {
    guid: Guid,
    interface: &'static dyn Any,
    open_count: u32,
}

/// A handle and the interfaces installed on it, in installation order.
struct HandleData {
    id: Handle,
    entries: Vec<InterfaceEntry>,
}

struct Watcher {
    guid: Guid,
    notify: ProtocolNotifyFn,
}

/// The protocol database.
///
/// One registry instance exists for the lifetime of the firmware; it is
/// created once during early init and passed by reference to everything
/// that publishes or consumes protocols. A root handle, analogous to the
/// firmware's own device, exists from construction and is where
/// platform-wide protocols are installed.
pub struct Registry {
    handles: Vec<HandleData>,
    /// (GUID, handle) pairs in the order the bindings were installed.
    /// This is what gives [`Registry::locate_handles`] its registration
    /// order, which is not the same as handle-creation order.
    install_order: Vec<(Guid, Handle)>,
    watchers: Vec<Watcher>,
    pending: VecDeque<(Guid, Handle)>,
    next_handle: NonZeroU64,
    root: Handle,
    policy: UninstallPolicy,
    draining: bool,
}

impl Registry {
    /// Creates an empty registry with the default (strict) uninstall
    /// policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(UninstallPolicy::default())
    }

    /// Creates an empty registry with the given uninstall policy.
    #[must_use]
    pub fn with_policy(policy: UninstallPolicy) -> Self {
        let root_id = NonZeroU64::MIN;
        let root = Handle::new(root_id);
        let mut handles = Vec::new();
        handles.push(HandleData {
            id: root,
            entries: Vec::new(),
        });
        Self {
            handles,
            install_order: Vec::new(),
            watchers: Vec::new(),
            pending: VecDeque::new(),
            next_handle: root_id.saturating_add(1),
            root,
            policy,
            draining: false,
        }
    }

    /// The root handle, which groups platform-wide protocols that are not
    /// tied to a particular device.
    ///
    /// It exists from construction and is never retired.
    #[must_use]
    pub const fn root(&self) -> Handle {
        self.root
    }

    /// Installs a protocol interface on a handle.
    ///
    /// If `handle` is `None`, a new handle is created and returned. The
    /// registry keeps a non-owning reference; the interface stays owned by
    /// the caller for the lifetime of the process.
    ///
    /// When an interface is installed, all callbacks registered with
    /// [`Registry::register_protocol_notify`] for its GUID are invoked.
    /// The callbacks run after the table mutation is complete, never
    /// re-entrantly in the middle of it.
    ///
    /// # Errors
    ///
    /// * [`Status::InvalidParameter`]: `handle` is not a live handle.
    /// * [`Status::AlreadyStarted`]: this protocol is already installed on
    ///   the handle. The original binding is unchanged.
    /// * [`Status::OutOfResources`]: the table cannot grow.
    pub fn install_protocol_interface<P: Protocol>(
        &mut self,
        handle: Option<Handle>,
        interface: &'static P,
    ) -> Result<Handle> {
        let (handle, idx) = match handle {
            Some(handle) => {
                let idx = self
                    .handle_index(handle)
                    .ok_or(Error::from(Status::InvalidParameter))?;
                (handle, idx)
            }
            None => {
                let handle = self.mint_handle()?;
                (handle, self.handles.len() - 1)
            }
        };

        let data = &mut self.handles[idx];
        if data.entries.iter().any(|entry| entry.guid == P::GUID) {
            return Err(Status::AlreadyStarted.into());
        }
        data.entries
            .try_reserve(1)
            .map_err(|_| Error::from(Status::OutOfResources))?;
        self.install_order
            .try_reserve(1)
            .map_err(|_| Error::from(Status::OutOfResources))?;

        self.handles[idx].entries.push(InterfaceEntry {
            guid: P::GUID,
            interface,
            open_count: 0,
        });
        self.install_order.push((P::GUID, handle));
        trace!("installed protocol {} on handle {}", P::GUID, handle.as_u64());

        self.pending.push_back((P::GUID, handle));
        self.drain_pending();
        Ok(handle)
    }

    /// Opens a protocol interface on a handle.
    ///
    /// The open-count of the binding is incremented. This is bookkeeping
    /// only and does not gate access to the interface, but the strict
    /// uninstall policy refuses to remove a binding while it is open, see
    /// [`Registry::uninstall_protocol_interface`].
    ///
    /// # Errors
    ///
    /// * [`Status::InvalidParameter`]: `handle` is not a live handle, or
    ///   the stored interface is not of type `P` (a violated [`Identify`]
    ///   contract).
    /// * [`Status::NotFound`]: the protocol is not installed on the handle.
    ///
    /// [`Identify`]: crate::Identify
    pub fn open_protocol<P: Protocol>(&mut self, handle: Handle) -> Result<&'static P> {
        let idx = self
            .handle_index(handle)
            .ok_or(Error::from(Status::InvalidParameter))?;
        let entry = self.handles[idx]
            .entries
            .iter_mut()
            .find(|entry| entry.guid == P::GUID)
            .ok_or(Error::from(Status::NotFound))?;
        let stored = entry.interface;
        let interface = stored
            .downcast_ref::<P>()
            .ok_or(Error::from(Status::InvalidParameter))?;
        entry.open_count += 1;
        Ok(interface)
    }

    /// Closes a protocol interface previously opened with
    /// [`Registry::open_protocol`], decrementing its open-count.
    ///
    /// # Errors
    ///
    /// * [`Status::InvalidParameter`]: `handle` is not a live handle.
    /// * [`Status::NotFound`]: the protocol is not installed on the handle,
    ///   or is not currently open.
    pub fn close_protocol(&mut self, handle: Handle, guid: &Guid) -> Result {
        let idx = self
            .handle_index(handle)
            .ok_or(Error::from(Status::InvalidParameter))?;
        let entry = self.handles[idx]
            .entries
            .iter_mut()
            .find(|entry| entry.guid == *guid)
            .ok_or(Error::from(Status::NotFound))?;
        if entry.open_count == 0 {
            return Err(Status::NotFound.into());
        }
        entry.open_count -= 1;
        Ok(())
    }

    /// Returns the handles that have the given protocol installed, in the
    /// order the bindings were registered.
    ///
    /// The iterator is lazy and finite; calling this method again restarts
    /// the search. An unused GUID yields an empty iterator, not an error.
    pub fn locate_handles<'reg>(&'reg self, guid: &Guid) -> impl Iterator<Item = Handle> + 'reg {
        let guid = *guid;
        self.install_order
            .iter()
            .filter(move |(installed, _)| *installed == guid)
            .map(|(_, handle)| *handle)
    }

    /// Returns the first-registered interface for the protocol, regardless
    /// of which handle it is installed on.
    ///
    /// Unlike [`Registry::open_protocol`] this does not touch the
    /// open-count; it is the convenience lookup an OS-side consumer uses
    /// when any instance of a capability will do.
    ///
    /// # Errors
    ///
    /// * [`Status::NotFound`]: no handle has this protocol installed.
    /// * [`Status::InvalidParameter`]: the stored interface is not of type
    ///   `P` (a violated [`Identify`] contract).
    ///
    /// [`Identify`]: crate::Identify
    pub fn locate_protocol<P: Protocol>(&self) -> Result<&'static P> {
        let handle = self
            .locate_handles(&P::GUID)
            .next()
            .ok_or(Error::from(Status::NotFound))?;
        let idx = self
            .handle_index(handle)
            .ok_or(Error::from(Status::NotFound))?;
        let entry = self.handles[idx]
            .entries
            .iter()
            .find(|entry| entry.guid == P::GUID)
            .ok_or(Error::from(Status::NotFound))?;
        entry
            .interface
            .downcast_ref::<P>()
            .ok_or(Error::from(Status::InvalidParameter))
    }

    /// Returns the GUIDs of the protocols installed on a handle, in
    /// installation order.
    ///
    /// # Errors
    ///
    /// * [`Status::InvalidParameter`]: `handle` is not a live handle.
    pub fn protocols_on_handle(&self, handle: Handle) -> Result<impl Iterator<Item = &Guid> + '_> {
        let idx = self
            .handle_index(handle)
            .ok_or(Error::from(Status::InvalidParameter))?;
        Ok(self.handles[idx].entries.iter().map(|entry| &entry.guid))
    }

    /// Removes a protocol interface from a handle.
    ///
    /// Under [`UninstallPolicy::Strict`] the binding must not be open;
    /// under [`UninstallPolicy::Lenient`] it is removed regardless. A
    /// non-root handle whose last interface is removed is retired, and its
    /// value is never reissued.
    ///
    /// # Errors
    ///
    /// * [`Status::InvalidParameter`]: `handle` is not a live handle.
    /// * [`Status::NotFound`]: the protocol is not installed on the handle.
    /// * [`Status::AccessDenied`]: the interface is still open and the
    ///   policy is strict.
    pub fn uninstall_protocol_interface(&mut self, handle: Handle, guid: &Guid) -> Result {
        let idx = self
            .handle_index(handle)
            .ok_or(Error::from(Status::InvalidParameter))?;
        let pos = self.handles[idx]
            .entries
            .iter()
            .position(|entry| entry.guid == *guid)
            .ok_or(Error::from(Status::NotFound))?;
        if self.policy == UninstallPolicy::Strict && self.handles[idx].entries[pos].open_count > 0 {
            return Err(Status::AccessDenied.into());
        }

        self.handles[idx].entries.remove(pos);
        self.install_order
            .retain(|(installed, on)| !(installed == guid && *on == handle));
        if self.handles[idx].entries.is_empty() && handle != self.root {
            self.handles.remove(idx);
        }
        trace!("uninstalled protocol {} from handle {}", guid, handle.as_u64());
        Ok(())
    }

    /// Registers a callback to be invoked whenever an interface for `guid`
    /// is subsequently installed, on any handle.
    ///
    /// Callbacks are invoked in registration order, after the install that
    /// triggered them has fully completed.
    ///
    /// # Errors
    ///
    /// * [`Status::OutOfResources`]: the watcher table cannot grow.
    pub fn register_protocol_notify(&mut self, guid: &Guid, notify: ProtocolNotifyFn) -> Result {
        self.watchers
            .try_reserve(1)
            .map_err(|_| Error::from(Status::OutOfResources))?;
        self.watchers.push(Watcher {
            guid: *guid,
            notify,
        });
        Ok(())
    }

    fn handle_index(&self, handle: Handle) -> Option<usize> {
        self.handles.iter().position(|data| data.id == handle)
    }

    fn mint_handle(&mut self) -> Result<Handle> {
        self.handles
            .try_reserve(1)
            .map_err(|_| Error::from(Status::OutOfResources))?;
        let id = self.next_handle;
        self.next_handle = id
            .checked_add(1)
            .ok_or(Error::from(Status::OutOfResources))?;
        let handle = Handle::new(id);
        self.handles.push(HandleData {
            id: handle,
            entries: Vec::new(),
        });
        Ok(handle)
    }

    /// Delivers queued "protocol installed" events. Installs performed by
    /// a callback only queue further events; the outermost invocation
    /// drains them all.
    fn drain_pending(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        while let Some((guid, handle)) = self.pending.pop_front() {
            // Copy the matching callbacks out first, so the watcher table
            // is not borrowed while they run.
            let notifies: Vec<ProtocolNotifyFn> = self
                .watchers
                .iter()
                .filter(|watcher| watcher.guid == guid)
                .map(|watcher| watcher.notify)
                .collect();
            for notify in notifies {
                notify(self, handle);
            }
        }
        self.draining = false;
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
