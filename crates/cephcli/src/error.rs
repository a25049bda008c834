//! CLI error types.
//!
//! Every fatal condition a command can hit has one variant here. The
//! display text is what the user sees on stderr and the exit code is
//! errno-style, so scripts can tell configuration mistakes, login
//! failures, and missing paths apart.

use std::io;

use cephfstool::CephError;

/// Fatal command errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Login was attempted with neither a configuration file nor a
    /// monitor address.
    #[error("cephconf file or cephaddr is required\nconfig -h for help")]
    EndpointRequired,

    /// `config` was run without an endpoint and with nothing saved.
    #[error("-c or -a is required for ceph addr\nconfig -h for help")]
    AddrRequired,

    /// The backend rejected the connection.
    #[error("user login cephfs failed")]
    LoginFailed,

    /// No usable session record was found.
    #[error("Not config correctly, please run install.sh firstly")]
    NotConfigured,

    /// The build carries no native backend.
    #[error("cephcli may be not installed, please reinstall\nOr contact with administrator")]
    NotInstalled,

    /// A local directory cannot replace an existing remote file.
    #[error("upload local dir [{src}] to cephfs exist file [{dst}] is not allowed")]
    UploadDirOverFile { src: String, dst: String },

    /// The transfer of one upload source failed.
    #[error("upload [{src}] failed")]
    UploadFailed { src: String },

    /// The requested download source does not exist.
    #[error("download path [{path}] No such file or directory")]
    DownloadMissing { path: String },

    /// Remote directories cannot be downloaded.
    #[error("download directory [{path}] is not supported")]
    DownloadDir { path: String },

    /// The transfer of the download failed.
    #[error("download [{path}] failed")]
    DownloadFailed { path: String },

    /// A removal target could not be deleted.
    #[error("remove path [{path}] failed")]
    RemoveFailed { path: String },

    /// A directory could not be created.
    #[error("mkdir path [{path}] failed")]
    MkdirFailed { path: String },

    /// The working directory could not be changed.
    #[error("chdir path [{path}] failed")]
    ChdirFailed { path: String },

    /// A directory could not be listed.
    #[error("listdir path [{path}] failed")]
    ListFailed { path: String },

    /// A filesystem error that surfaces directly.
    #[error("{0}")]
    Backend(CephError),

    /// Local I/O failed.
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code for this error, errno style.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::EndpointRequired | CliError::AddrRequired => libc::EINVAL,
            CliError::NotInstalled => libc::EAGAIN,
            CliError::DownloadMissing { .. } => libc::ENOENT,
            _ => libc::EPERM,
        }
    }
}

impl From<CephError> for CliError {
    fn from(err: CephError) -> Self {
        match err {
            CephError::Unavailable => CliError::NotInstalled,
            other => CliError::Backend(other),
        }
    }
}
