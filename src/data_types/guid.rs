pub use uguid::Guid;

/// Every protocol that can be published through the registry is referred
/// to by its GUID, and this trait is the building block that ties a GUID
/// to a Rust type.
///
/// You should never need to use `Identify` directly, but instead go for
/// the [`Protocol`] trait, which indicates in which circumstances an
/// `Identify`-tagged type should be used.
///
/// # Safety
///
/// Implementing `Identify` is unsafe because attaching an incorrect GUID
/// to a type can make a lookup hand out an interface of the wrong type.
/// The GUID must be unique to the implementing type, and must match
/// bit-for-bit the value that external consumers of the protocol expect.
///
/// [`Protocol`]: crate::proto::Protocol
pub unsafe trait Identify {
    /// Unique protocol identifier.
    const GUID: Guid;
}
