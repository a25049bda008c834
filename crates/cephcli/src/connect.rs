//! Backend connection seam.

use cephfstool::{CephFs, CephResult, MountOptions};

/// Connects a filesystem backend for one invocation.
///
/// The production implementation mounts through libcephfs; tests
/// substitute an in-memory cluster.
pub trait Connector {
    /// Establish a mount with the given options.
    fn connect(&self, opts: &MountOptions) -> CephResult<Box<dyn CephFs>>;
}

/// The libcephfs-backed connector.
///
/// In a build without the `libcephfs` feature every connection attempt
/// reports [`cephfstool::CephError::Unavailable`], which the CLI turns
/// into its "not installed" exit path.
#[derive(Debug, Default)]
pub struct LibcephfsConnector;

impl Connector for LibcephfsConnector {
    #[cfg(feature = "libcephfs")]
    fn connect(&self, opts: &MountOptions) -> CephResult<Box<dyn CephFs>> {
        Ok(Box::new(cephfstool::CephMount::connect(opts)?))
    }

    #[cfg(not(feature = "libcephfs"))]
    fn connect(&self, _opts: &MountOptions) -> CephResult<Box<dyn CephFs>> {
        Err(cephfstool::CephError::Unavailable)
    }
}

/// Connector over a [`cephfstool::MemoryCluster`].
#[cfg(test)]
pub(crate) struct MemoryConnector {
    pub cluster: cephfstool::MemoryCluster,
}

#[cfg(test)]
impl Connector for MemoryConnector {
    fn connect(&self, opts: &MountOptions) -> CephResult<Box<dyn CephFs>> {
        Ok(Box::new(self.cluster.mount(opts)?))
    }
}

/// Connector that keeps the options of its last connection attempt.
#[cfg(test)]
pub(crate) struct RecordingConnector {
    pub cluster: cephfstool::MemoryCluster,
    pub seen: std::cell::RefCell<Option<MountOptions>>,
}

#[cfg(test)]
impl Connector for RecordingConnector {
    fn connect(&self, opts: &MountOptions) -> CephResult<Box<dyn CephFs>> {
        *self.seen.borrow_mut() = Some(opts.clone());
        Ok(Box::new(self.cluster.mount(opts)?))
    }
}
