//! The filesystem operation surface shared by all backends.

use std::fs;
use std::path::Path;

use crate::error::{CephError, CephResult};
use crate::path::{join, parent_of};

/// Chunk size for file uploads and downloads.
pub const BUFFER_SIZE: usize = 1024 * 1024;

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Anything else: symlink, device, socket.
    Other,
}

/// Options for establishing a mount.
///
/// A configuration file and a monitor address may be combined: the
/// file is applied first, then the address overrides its monitor
/// list. Unset fields fall back to the cluster defaults, `admin` for
/// the user and `/` for the root.
#[derive(Debug, Clone, Default)]
pub struct MountOptions {
    /// Ceph configuration file to read.
    pub conf_file: Option<String>,
    /// Monitor address list, comma separated.
    pub mon_addr: Option<String>,
    /// Client entity name.
    pub user: Option<String>,
    /// Authentication key.
    pub key: Option<String>,
    /// Mount root inside the filesystem.
    pub root: Option<String>,
}

/// Filesystem operations used by the client tool.
///
/// Primitive operations map one to one onto backend calls. Recursive
/// upload, recursive removal, and parent creation are provided methods
/// built from the primitives, so every backend shares their behavior.
pub trait CephFs {
    /// Classify `path`, or `None` when it cannot be statted.
    fn stat(&self, path: &str) -> CephResult<Option<PathKind>>;

    /// Size in bytes of the object at `path`.
    fn length(&self, path: &str) -> CephResult<u64>;

    /// Upload one local file to `path`, creating missing parent
    /// directories first. Short writes are retried until the chunk is
    /// fully stored.
    fn write_file(&self, path: &str, local_path: &Path) -> CephResult<()>;

    /// Download the file at `path` to `local_path`.
    fn read_file(&self, path: &str, local_path: &Path) -> CephResult<()>;

    /// Store `contents` as the file at `path`, creating missing parent
    /// directories first. A short write is an error.
    fn write_str(&self, path: &str, contents: &str) -> CephResult<()>;

    /// Read the file at `path` as UTF-8 text.
    fn read_str(&self, path: &str) -> CephResult<String>;

    /// Unlink the file at `path`.
    fn remove(&self, path: &str) -> CephResult<()>;

    /// Create `path` and any missing ancestors as directories. An
    /// already existing `path` is reported as `EEXIST`.
    fn make_dirs(&self, path: &str) -> CephResult<()>;

    /// Remove the empty directory at `path`.
    fn rm_dir(&self, path: &str) -> CephResult<()>;

    /// Rename `from` to `to`, creating `to`'s parent directories first.
    fn rename(&self, from: &str, to: &str) -> CephResult<()>;

    /// Entry names under the directory at `path`, `.` and `..` excluded.
    fn list_dir(&self, path: &str) -> CephResult<Vec<String>>;

    /// Change the working directory of this mount.
    fn chdir(&self, path: &str) -> CephResult<()>;

    /// Canonical working directory of this mount.
    fn getcwd(&self) -> CephResult<String>;

    /// Whether `path` exists.
    fn exists(&self, path: &str) -> CephResult<bool> {
        Ok(self.stat(path)?.is_some())
    }

    /// Create the directory component of `path`: the path itself when
    /// it ends with `/`, otherwise its parent. The root is left alone
    /// and an already existing directory is fine.
    fn ensure_dirs(&self, path: &str) -> CephResult<()> {
        let dir = if path.ends_with('/') {
            path
        } else {
            parent_of(path)
        };
        if dir == "/" {
            return Ok(());
        }
        match self.make_dirs(dir) {
            Ok(()) => {
                tracing::info!(path = %dir, "cephfs mkdir");
                Ok(())
            }
            Err(err) if err.errno() == Some(libc::EEXIST) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Recursively upload `local_path` to `path`.
    ///
    /// Directories are walked locally with hidden entries (leading `.`)
    /// skipped, regular files are uploaded, anything else is ignored.
    fn write_tree(&self, path: &str, local_path: &Path) -> CephResult<()> {
        let meta =
            fs::metadata(local_path).map_err(|err| CephError::local(local_path, err))?;
        if meta.is_file() {
            self.write_file(path, local_path)?;
        } else if meta.is_dir() {
            let entries =
                fs::read_dir(local_path).map_err(|err| CephError::local(local_path, err))?;
            for entry in entries {
                let entry = entry.map_err(|err| CephError::local(local_path, err))?;
                let name = entry.file_name();
                let name = match name.to_str() {
                    Some(name) => name,
                    None => continue,
                };
                if name.starts_with('.') {
                    continue;
                }
                self.write_tree(&join(path, name), &entry.path())?;
            }
        }
        Ok(())
    }

    /// Recursively remove the directory at `path`: entries first, then
    /// the directory itself. The root directory is never removed.
    fn remove_tree(&self, path: &str) -> CephResult<()> {
        for name in self.list_dir(path)? {
            let child = join(path, &name);
            match self.stat(&child)? {
                Some(PathKind::Dir) => self.remove_tree(&child)?,
                _ => self.remove(&child)?,
            }
        }
        if path != "/" {
            self.rm_dir(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::memory::MemoryCluster;

    fn temp_tree(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("cephfstool-test-{tag}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_ensure_dirs_creates_parent_only() {
        let fs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();

        fs.ensure_dirs("/a/b/file").unwrap();
        assert_eq!(fs.stat("/a/b").unwrap(), Some(PathKind::Dir));
        assert_eq!(fs.stat("/a/b/file").unwrap(), None);

        fs.ensure_dirs("/a/b/c/").unwrap();
        assert_eq!(fs.stat("/a/b/c").unwrap(), Some(PathKind::Dir));
    }

    #[test]
    fn test_ensure_dirs_tolerates_existing() {
        let fs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();
        fs.make_dirs("/existing").unwrap();
        fs.ensure_dirs("/existing/").unwrap();
        fs.ensure_dirs("/").unwrap();
        fs.ensure_dirs("/file_at_root").unwrap();
    }

    #[test]
    fn test_write_tree_uploads_nested_dirs() {
        let local = temp_tree("write-tree");
        fs::write(local.join("file_a"), "alpha").unwrap();
        fs::write(local.join(".hidden"), "secret").unwrap();
        fs::create_dir(local.join("sub")).unwrap();
        fs::write(local.join("sub").join("file_b"), "beta").unwrap();

        let cfs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();
        cfs.write_tree("/dest/", &local).unwrap();

        assert_eq!(cfs.read_str("/dest/file_a").unwrap(), "alpha");
        assert_eq!(cfs.read_str("/dest/sub/file_b").unwrap(), "beta");
        assert_eq!(cfs.stat("/dest/.hidden").unwrap(), None);

        let _ = fs::remove_dir_all(&local);
    }

    #[test]
    fn test_write_tree_single_file() {
        let local = temp_tree("write-tree-file");
        let file = local.join("one");
        fs::write(&file, "payload").unwrap();

        let cfs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();
        cfs.write_tree("/up/one", &file).unwrap();
        assert_eq!(cfs.read_str("/up/one").unwrap(), "payload");

        let _ = fs::remove_dir_all(&local);
    }

    #[test]
    fn test_write_tree_missing_local_path() {
        let cfs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();
        let err = cfs
            .write_tree("/up", Path::new("/nonexistent/local/path"))
            .unwrap_err();
        assert!(matches!(err, CephError::Local { .. }));
    }

    #[test]
    fn test_remove_tree_removes_everything_below() {
        let cfs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();
        cfs.make_dirs("/t/a/b").unwrap();
        cfs.write_str("/t/a/f", "x").unwrap();
        cfs.write_str("/t/g", "y").unwrap();

        cfs.remove_tree("/t").unwrap();
        assert_eq!(cfs.stat("/t").unwrap(), None);
    }

    #[test]
    fn test_remove_tree_keeps_root() {
        let cfs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();
        cfs.write_str("/f", "x").unwrap();
        cfs.make_dirs("/d").unwrap();

        cfs.remove_tree("/").unwrap();
        assert_eq!(cfs.stat("/f").unwrap(), None);
        assert_eq!(cfs.stat("/d").unwrap(), None);
        assert!(cfs.list_dir("/").unwrap().is_empty());
    }

    #[test]
    fn test_exists_via_stat() {
        let cfs = MemoryCluster::new().mount(&MountOptions::default()).unwrap();
        cfs.write_str("/here", "x").unwrap();
        assert!(cfs.exists("/here").unwrap());
        assert!(!cfs.exists("/gone").unwrap());
    }
}
