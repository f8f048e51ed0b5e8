//! RISC-V EFI Boot Protocol.
//!
//! Lets a booted OS query which hart the firmware used to start it. The
//! hart id is captured from boot-time state when the protocol is
//! registered, because that state is no longer reachable once the OS is
//! running.

use alloc::boxed::Box;

use log::{error, trace};

use crate::data_types::Guid;
use crate::proto::Protocol;
use crate::registry::Registry;
use crate::result::{Result, ResultExt, Status, StatusExt};
use crate::Identify;
use uguid::guid;

/// Revision of the RISC-V EFI Boot Protocol interface.
pub const REVISION: u64 = 0x0001_0000;

/// Boot-time state the protocol is built from.
///
/// The platform's early init code captures the boot hart id (from the
/// device tree, SBI, or however the platform learns it) into this context
/// and hands it to [`register`]. Keeping it an explicit value rather than
/// a process-wide static means the capture point is visible in the init
/// sequence.
#[derive(Debug, Clone, Copy)]
pub struct BootContext {
    boot_hartid: usize,
}

impl BootContext {
    /// Creates a context for the given boot hart id.
    #[must_use]
    pub const fn new(boot_hartid: usize) -> Self {
        Self { boot_hartid }
    }

    /// The hart the firmware was entered on.
    #[must_use]
    pub const fn boot_hartid(&self) -> usize {
        self.boot_hartid
    }
}

/// RISC-V EFI Boot Protocol interface.
///
/// The layout is the function table the consuming OS expects: revision
/// first, then the `get_boot_hartid` member. The captured hart id lives
/// behind the table, where only the accessor reaches it.
#[repr(C)]
pub struct RiscvBoot {
    revision: u64,
    get_boot_hartid:
        unsafe extern "efiapi" fn(this: *const RiscvBoot, boot_hartid: *mut usize) -> Status,
    boot_hartid: usize,
}

unsafe impl Identify for RiscvBoot {
    const GUID: Guid = guid!("ccd15fec-6f73-4eec-8395-3e69e4b940bf");
}

impl Protocol for RiscvBoot {}

impl RiscvBoot {
    /// Creates the interface, capturing the hart id out of the boot
    /// context.
    #[must_use]
    pub fn new(ctx: &BootContext) -> Self {
        Self {
            revision: REVISION,
            get_boot_hartid,
            boot_hartid: ctx.boot_hartid(),
        }
    }

    /// Interface revision.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the id of the hart the firmware booted on.
    pub fn boot_hartid(&self) -> Result<usize> {
        let mut hartid = 0;
        unsafe { (self.get_boot_hartid)(self, &mut hartid) }.to_result_with_val(|| hartid)
    }
}

/// Raw accessor stored in the function table.
///
/// Writes the boot hart id into the caller-allocated `boot_hartid`.
/// Returns [`Status::InvalidParameter`] if either pointer is null.
unsafe extern "efiapi" fn get_boot_hartid(
    this: *const RiscvBoot,
    boot_hartid: *mut usize,
) -> Status {
    if this.is_null() || boot_hartid.is_null() {
        return Status::InvalidParameter;
    }
    let hartid = unsafe { (*this).boot_hartid };
    unsafe { boot_hartid.write(hartid) };
    trace!("get_boot_hartid: {}", hartid);
    Status::Success
}

/// Registers the RISC-V EFI Boot Protocol on the registry's root handle.
///
/// Called once during firmware init. Registration failure is logged and
/// reported upward, but is not fatal: the firmware boots on without the
/// capability rather than halting.
pub fn register(registry: &mut Registry, ctx: &BootContext) -> Status {
    // The interface must outlive every consumer, including the booted OS,
    // so it is given firmware lifetime here. The registry only keeps a
    // reference.
    let interface: &'static RiscvBoot = Box::leak(Box::new(RiscvBoot::new(ctx)));

    let root = registry.root();
    let result = registry.install_protocol_interface(Some(root), interface);
    if let Err(ref err) = result {
        error!("cannot install RISCV_EFI_BOOT_PROTOCOL: {}", err);
    }
    result.status()
}
