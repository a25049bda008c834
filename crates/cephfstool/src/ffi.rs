//! Raw libcephfs declarations.
//!
//! Hand-written against the stable C API in `cephfs/libcephfs.h`; only
//! the calls the [`CephMount`](crate::mount::CephMount) backend needs
//! are declared.

#![allow(non_camel_case_types)]

use libc::{c_char, c_int, c_uint, dev_t, mode_t, timespec};

/// Opaque mount handle.
#[repr(C)]
pub struct ceph_mount_info {
    _private: [u8; 0],
}

/// Opaque directory iterator.
#[repr(C)]
pub struct ceph_dir_result {
    _private: [u8; 0],
}

/// Mirror of `struct ceph_statx`.
#[repr(C)]
pub struct ceph_statx {
    pub stx_mask: u32,
    pub stx_blksize: u32,
    pub stx_nlink: u32,
    pub stx_uid: u32,
    pub stx_gid: u32,
    pub stx_mode: u16,
    pub stx_ino: u64,
    pub stx_size: u64,
    pub stx_blocks: u64,
    pub stx_dev: dev_t,
    pub stx_rdev: dev_t,
    pub stx_atime: timespec,
    pub stx_ctime: timespec,
    pub stx_mtime: timespec,
    pub stx_btime: timespec,
    pub stx_version: u64,
}

pub const CEPH_STATX_MODE: c_uint = 0x0001;
pub const CEPH_STATX_SIZE: c_uint = 0x0200;
pub const AT_SYMLINK_NOFOLLOW: c_uint = 0x0100;

#[link(name = "cephfs")]
extern "C" {
    pub fn ceph_create(cmount: *mut *mut ceph_mount_info, id: *const c_char) -> c_int;
    pub fn ceph_conf_read_file(cmount: *mut ceph_mount_info, path: *const c_char) -> c_int;
    pub fn ceph_conf_set(
        cmount: *mut ceph_mount_info,
        option: *const c_char,
        value: *const c_char,
    ) -> c_int;
    pub fn ceph_mount(cmount: *mut ceph_mount_info, root: *const c_char) -> c_int;
    pub fn ceph_shutdown(cmount: *mut ceph_mount_info);

    pub fn ceph_open(
        cmount: *mut ceph_mount_info,
        path: *const c_char,
        flags: c_int,
        mode: mode_t,
    ) -> c_int;
    pub fn ceph_close(cmount: *mut ceph_mount_info, fd: c_int) -> c_int;
    pub fn ceph_read(
        cmount: *mut ceph_mount_info,
        fd: c_int,
        buf: *mut c_char,
        size: i64,
        offset: i64,
    ) -> c_int;
    pub fn ceph_write(
        cmount: *mut ceph_mount_info,
        fd: c_int,
        buf: *const c_char,
        size: i64,
        offset: i64,
    ) -> c_int;

    pub fn ceph_unlink(cmount: *mut ceph_mount_info, path: *const c_char) -> c_int;
    pub fn ceph_mkdirs(cmount: *mut ceph_mount_info, path: *const c_char, mode: mode_t) -> c_int;
    pub fn ceph_rmdir(cmount: *mut ceph_mount_info, path: *const c_char) -> c_int;
    pub fn ceph_rename(
        cmount: *mut ceph_mount_info,
        from: *const c_char,
        to: *const c_char,
    ) -> c_int;
    pub fn ceph_chdir(cmount: *mut ceph_mount_info, path: *const c_char) -> c_int;
    pub fn ceph_getcwd(cmount: *mut ceph_mount_info) -> *const c_char;

    pub fn ceph_opendir(
        cmount: *mut ceph_mount_info,
        name: *const c_char,
        dirpp: *mut *mut ceph_dir_result,
    ) -> c_int;
    pub fn ceph_closedir(cmount: *mut ceph_mount_info, dirp: *mut ceph_dir_result) -> c_int;
    pub fn ceph_getdnames(
        cmount: *mut ceph_mount_info,
        dirp: *mut ceph_dir_result,
        name: *mut c_char,
        buflen: c_int,
    ) -> c_int;

    pub fn ceph_statx(
        cmount: *mut ceph_mount_info,
        path: *const c_char,
        stx: *mut ceph_statx,
        want: c_uint,
        flags: c_uint,
    ) -> c_int;
}
