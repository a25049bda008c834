//! libcephfs-backed filesystem.

use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::ptr;

use libc::{c_char, c_int};

use crate::error::{CephError, CephResult};
use crate::ffi;
use crate::fs::{CephFs, MountOptions, PathKind, BUFFER_SIZE};

/// Initial buffer size for directory name listings; doubled on demand.
const DIR_BUFFER_SIZE: usize = 512;

/// A live libcephfs mount.
///
/// [`CephMount::connect`] performs create, configure, and mount in one
/// step. Dropping the value shuts the mount down.
pub struct CephMount {
    cmount: *mut ffi::ceph_mount_info,
}

/// Log an operation failure and turn the negative return value into an
/// error.
fn op_error(op: &'static str, path: &str, ret: c_int) -> CephError {
    let err = CephError::op(op, path, -ret);
    tracing::error!("{err}");
    err
}

fn cstring(value: &str) -> CephResult<CString> {
    CString::new(value).map_err(|_| CephError::InvalidPath(value.to_string()))
}

impl CephMount {
    /// Connect to a cluster.
    ///
    /// The configuration file is read first; a monitor address and a
    /// key string set on the options then override the matching
    /// options from the file.
    pub fn connect(opts: &MountOptions) -> CephResult<Self> {
        let user = opts.user.as_deref().unwrap_or("admin");
        let root = opts.root.as_deref().unwrap_or("/");

        let user_c = cstring(user)?;
        let mut cmount: *mut ffi::ceph_mount_info = ptr::null_mut();
        let ret = unsafe { ffi::ceph_create(&mut cmount, user_c.as_ptr()) };
        if ret < 0 {
            return Err(op_error("create cephfs client for", user, ret));
        }
        // Shut the handle down on any failure from here on.
        let mount = CephMount { cmount };

        if let Some(conf) = &opts.conf_file {
            let conf_c = cstring(conf)?;
            let ret = unsafe { ffi::ceph_conf_read_file(mount.cmount, conf_c.as_ptr()) };
            if ret < 0 {
                return Err(op_error("read conf file", conf, ret));
            }
        }
        if let Some(addr) = &opts.mon_addr {
            mount.conf_set("mon_host", addr)?;
        }
        if let Some(key) = &opts.key {
            mount.conf_set("key", key)?;
        }

        let root_c = cstring(root)?;
        let ret = unsafe { ffi::ceph_mount(mount.cmount, root_c.as_ptr()) };
        if ret < 0 {
            return Err(op_error("open cephfs", root, ret));
        }
        tracing::info!(user, root, "connect cephfs successfully");
        Ok(mount)
    }

    fn conf_set(&self, option: &str, value: &str) -> CephResult<()> {
        let option_c = cstring(option)?;
        let value_c = cstring(value)?;
        let ret = unsafe { ffi::ceph_conf_set(self.cmount, option_c.as_ptr(), value_c.as_ptr()) };
        if ret < 0 {
            return Err(op_error("set cephfs option", option, ret));
        }
        Ok(())
    }

    fn open(&self, path: &str, flags: c_int) -> CephResult<OpenFile<'_>> {
        let path_c = cstring(path)?;
        let fd = unsafe { ffi::ceph_open(self.cmount, path_c.as_ptr(), flags, 0o644) };
        if fd < 0 {
            return Err(op_error("open cephfs file", path, fd));
        }
        Ok(OpenFile { mount: self, fd })
    }

    fn statx(&self, path: &str, want: libc::c_uint) -> CephResult<Option<ffi::ceph_statx>> {
        let path_c = cstring(path)?;
        let mut stx: ffi::ceph_statx = unsafe { std::mem::zeroed() };
        let ret = unsafe {
            ffi::ceph_statx(
                self.cmount,
                path_c.as_ptr(),
                &mut stx,
                want,
                ffi::AT_SYMLINK_NOFOLLOW,
            )
        };
        if ret < 0 {
            return Ok(None);
        }
        Ok(Some(stx))
    }

    /// Store one chunk, retrying while the filesystem accepts less than
    /// requested.
    fn write_chunk(&self, file: &OpenFile<'_>, path: &str, chunk: &[u8], offset: i64) -> CephResult<()> {
        let mut data = chunk;
        let mut offset = offset;
        loop {
            let ret = unsafe {
                ffi::ceph_write(
                    self.cmount,
                    file.fd,
                    data.as_ptr() as *const c_char,
                    data.len() as i64,
                    offset,
                )
            };
            if ret < 0 {
                return Err(op_error("write data to cephfs path", path, ret));
            }
            let written = ret as usize;
            if written >= data.len() {
                return Ok(());
            }
            tracing::warn!(
                path,
                requested = data.len(),
                written,
                "cephfs accepted a short write, retrying the rest"
            );
            data = &data[written..];
            offset += written as i64;
        }
    }
}

impl Drop for CephMount {
    fn drop(&mut self) {
        unsafe { ffi::ceph_shutdown(self.cmount) };
    }
}

/// Open file handle, closed on drop.
struct OpenFile<'a> {
    mount: &'a CephMount,
    fd: c_int,
}

impl Drop for OpenFile<'_> {
    fn drop(&mut self) {
        unsafe { ffi::ceph_close(self.mount.cmount, self.fd) };
    }
}

/// Open directory iterator, closed on drop.
struct OpenDir<'a> {
    mount: &'a CephMount,
    dirp: *mut ffi::ceph_dir_result,
}

impl Drop for OpenDir<'_> {
    fn drop(&mut self) {
        unsafe { ffi::ceph_closedir(self.mount.cmount, self.dirp) };
    }
}

impl CephFs for CephMount {
    fn stat(&self, path: &str) -> CephResult<Option<PathKind>> {
        let stx = match self.statx(path, ffi::CEPH_STATX_MODE)? {
            Some(stx) => stx,
            None => return Ok(None),
        };
        let mode = stx.stx_mode as u32 & libc::S_IFMT;
        Ok(Some(match mode {
            libc::S_IFREG => PathKind::File,
            libc::S_IFDIR => PathKind::Dir,
            _ => PathKind::Other,
        }))
    }

    fn length(&self, path: &str) -> CephResult<u64> {
        match self.statx(path, ffi::CEPH_STATX_SIZE)? {
            Some(stx) => Ok(stx.stx_size),
            None => Err(op_error("get file size of path", path, -libc::ENOENT)),
        }
    }

    fn write_file(&self, path: &str, local_path: &Path) -> CephResult<()> {
        let mut local = File::open(local_path).map_err(|err| CephError::local(local_path, err))?;
        self.ensure_dirs(path)?;
        let file = self.open(path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC)?;

        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut offset: i64 = 0;
        loop {
            let count = local
                .read(&mut buffer)
                .map_err(|err| CephError::local(local_path, err))?;
            if count == 0 {
                break;
            }
            self.write_chunk(&file, path, &buffer[..count], offset)?;
            offset += count as i64;
        }
        tracing::info!(path, bytes = offset, "cephfs write");
        Ok(())
    }

    fn read_file(&self, path: &str, local_path: &Path) -> CephResult<()> {
        let mut local =
            File::create(local_path).map_err(|err| CephError::local(local_path, err))?;
        let file = self.open(path, libc::O_RDONLY)?;

        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut offset: i64 = 0;
        loop {
            let ret = unsafe {
                ffi::ceph_read(
                    self.cmount,
                    file.fd,
                    buffer.as_mut_ptr() as *mut c_char,
                    BUFFER_SIZE as i64,
                    offset,
                )
            };
            if ret < 0 {
                return Err(op_error("read data from cephfs path", path, ret));
            }
            let count = ret as usize;
            local
                .write_all(&buffer[..count])
                .map_err(|err| CephError::local(local_path, err))?;
            offset += count as i64;
            if count < BUFFER_SIZE {
                break;
            }
        }
        tracing::info!(path, bytes = offset, "cephfs read");
        Ok(())
    }

    fn write_str(&self, path: &str, contents: &str) -> CephResult<()> {
        self.ensure_dirs(path)?;
        let file = self.open(path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC)?;
        let ret = unsafe {
            ffi::ceph_write(
                self.cmount,
                file.fd,
                contents.as_ptr() as *const c_char,
                contents.len() as i64,
                0,
            )
        };
        if ret < 0 {
            return Err(op_error("write data to cephfs path", path, ret));
        }
        if (ret as usize) < contents.len() {
            return Err(CephError::ShortWrite {
                path: path.to_string(),
                written: ret as usize,
                requested: contents.len(),
            });
        }
        Ok(())
    }

    fn read_str(&self, path: &str) -> CephResult<String> {
        let file = self.open(path, libc::O_RDONLY)?;
        let mut data = Vec::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut offset: i64 = 0;
        loop {
            let ret = unsafe {
                ffi::ceph_read(
                    self.cmount,
                    file.fd,
                    buffer.as_mut_ptr() as *mut c_char,
                    BUFFER_SIZE as i64,
                    offset,
                )
            };
            if ret < 0 {
                return Err(op_error("read data from cephfs path", path, ret));
            }
            let count = ret as usize;
            data.extend_from_slice(&buffer[..count]);
            offset += count as i64;
            if count < BUFFER_SIZE {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    fn remove(&self, path: &str) -> CephResult<()> {
        let path_c = cstring(path)?;
        let ret = unsafe { ffi::ceph_unlink(self.cmount, path_c.as_ptr()) };
        if ret < 0 {
            return Err(op_error("remove cephfs path", path, ret));
        }
        Ok(())
    }

    fn make_dirs(&self, path: &str) -> CephResult<()> {
        let path_c = cstring(path)?;
        let ret = unsafe { ffi::ceph_mkdirs(self.cmount, path_c.as_ptr(), 0o777) };
        if ret == -libc::EEXIST {
            // Callers routinely hit existing directories; not a fault
            // worth logging.
            return Err(CephError::op("mkdir", path, libc::EEXIST));
        }
        if ret < 0 {
            return Err(op_error("mkdir", path, ret));
        }
        Ok(())
    }

    fn rm_dir(&self, path: &str) -> CephResult<()> {
        let path_c = cstring(path)?;
        let ret = unsafe { ffi::ceph_rmdir(self.cmount, path_c.as_ptr()) };
        if ret < 0 {
            return Err(op_error("rm dir", path, ret));
        }
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> CephResult<()> {
        self.ensure_dirs(to)?;
        let from_c = cstring(from)?;
        let to_c = cstring(to)?;
        let ret = unsafe { ffi::ceph_rename(self.cmount, from_c.as_ptr(), to_c.as_ptr()) };
        if ret < 0 {
            return Err(op_error("rename cephfs path", from, ret));
        }
        Ok(())
    }

    fn list_dir(&self, path: &str) -> CephResult<Vec<String>> {
        let path_c = cstring(path)?;
        let mut dirp: *mut ffi::ceph_dir_result = ptr::null_mut();
        let ret = unsafe { ffi::ceph_opendir(self.cmount, path_c.as_ptr(), &mut dirp) };
        if ret < 0 {
            return Err(op_error("open path", path, ret));
        }
        let dir = OpenDir { mount: self, dirp };

        let mut names = Vec::new();
        let mut buffer = vec![0u8; DIR_BUFFER_SIZE];
        loop {
            let ret = unsafe {
                ffi::ceph_getdnames(
                    self.cmount,
                    dir.dirp,
                    buffer.as_mut_ptr() as *mut c_char,
                    buffer.len() as c_int,
                )
            };
            if ret == -libc::ERANGE {
                buffer = vec![0u8; buffer.len() * 2];
                continue;
            }
            if ret < 0 {
                return Err(op_error("read path", path, ret));
            }
            if ret == 0 {
                break;
            }
            // The buffer holds NUL-terminated names back to back.
            let mut pos = 0;
            let end = ret as usize;
            while pos < end {
                let name = unsafe { CStr::from_ptr(buffer.as_ptr().add(pos) as *const c_char) };
                pos += name.to_bytes().len() + 1;
                let name = name.to_string_lossy().into_owned();
                if name != "." && name != ".." {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    fn chdir(&self, path: &str) -> CephResult<()> {
        let path_c = cstring(path)?;
        let ret = unsafe { ffi::ceph_chdir(self.cmount, path_c.as_ptr()) };
        if ret < 0 {
            return Err(op_error("cd path", path, ret));
        }
        Ok(())
    }

    fn getcwd(&self) -> CephResult<String> {
        let cwd = unsafe { ffi::ceph_getcwd(self.cmount) };
        if cwd.is_null() {
            return Err(op_error("getcwd of", "", -libc::EIO));
        }
        Ok(unsafe { CStr::from_ptr(cwd) }.to_string_lossy().into_owned())
    }
}
