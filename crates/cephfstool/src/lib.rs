//! cephfs access layer for the client tool.
//!
//! The filesystem surface is defined as a trait (for testability and
//! mocking) together with two implementations:
//!
//! - `CephMount`: the production backend over the native libcephfs
//!   client, behind the `libcephfs` feature so the workspace builds on
//!   machines without the library installed.
//! - [`MemoryFs`]: an in-memory tree for tests, handed out by
//!   [`MemoryCluster`].
//!
//! File transfer moves through a fixed 1 MiB buffer with a retry loop
//! for short writes. Recursive upload, recursive removal, and parent
//! directory creation are provided by the trait itself on top of the
//! primitive operations, so all backends share their behavior.

pub mod error;
pub mod fs;
pub mod memory;
pub mod path;

#[cfg(feature = "libcephfs")]
pub mod ffi;
#[cfg(feature = "libcephfs")]
pub mod mount;

pub use error::{CephError, CephResult};
pub use fs::{CephFs, MountOptions, PathKind, BUFFER_SIZE};
pub use memory::{MemoryCluster, MemoryFs};
#[cfg(feature = "libcephfs")]
pub use mount::CephMount;

/// Build stamp appended to the reported tool version, `.YYYYMMDDHHMMSS`.
pub fn build_stamp() -> &'static str {
    env!("CEPHFSTOOL_BUILD_STAMP")
}
