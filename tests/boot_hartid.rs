use efi_registry::proto::riscv::{self, BootContext, RiscvBoot};
use efi_registry::{Identify, Registry, Status};

/// This test imitates the boot flow around the RISC-V EFI Boot Protocol:
/// early init captures the boot hart id, registers the protocol, and a
/// later consumer (normally the booted OS) locates it by GUID and checks
/// the answer against the value the platform advertised independently.
#[test]
fn boot_hartid_matches_platform_value() {
    // What /chosen/boot-hartid in the device tree would say.
    let platform_hartid = 3usize;

    // FIRMWARE INIT
    let mut registry = Registry::new();
    let ctx = BootContext::new(platform_hartid);
    assert_eq!(riscv::register(&mut registry, &ctx), Status::Success);

    // OS SIDE
    //
    // The consumer only knows the protocol GUID; it locates any instance
    // and asks for the boot hart id.
    let prot = registry
        .locate_protocol::<RiscvBoot>()
        .expect("RISC-V Boot Protocol not available");
    let efi_hartid = prot.boot_hartid().expect("could not retrieve boot hart id");

    assert_eq!(efi_hartid, platform_hartid);
}

#[test]
fn protocol_is_discoverable_by_raw_guid() {
    let mut registry = Registry::new();
    let ctx = BootContext::new(0);
    assert_eq!(riscv::register(&mut registry, &ctx), Status::Success);

    // A consumer that carries the GUID constant, not the Rust type, still
    // finds the handle.
    let guid = efi_registry::guid!("ccd15fec-6f73-4eec-8395-3e69e4b940bf");
    assert_eq!(guid, RiscvBoot::GUID);
    let handles: Vec<_> = registry.locate_handles(&guid).collect();
    assert_eq!(handles, [registry.root()]);
}
