//! Error types for the cephfs access layer.

use std::io;

/// Convenience alias for results produced by this crate.
pub type CephResult<T> = Result<T, CephError>;

/// Errors reported by a [`CephFs`](crate::CephFs) backend.
#[derive(Debug, thiserror::Error)]
pub enum CephError {
    /// A filesystem call failed with an OS error code.
    #[error("unable to {op} [{path}]: ({errno}) {message}")]
    Op {
        op: &'static str,
        path: String,
        errno: i32,
        message: String,
    },

    /// Local file I/O failed while transferring data.
    #[error("unable to open local file [{path}]: {source}")]
    Local { path: String, source: io::Error },

    /// A path contained an interior NUL byte and cannot be passed to
    /// the native client.
    #[error("invalid path [{0}]")]
    InvalidPath(String),

    /// The filesystem accepted fewer bytes than requested.
    #[error("short write to [{path}]: wrote {written} of {requested} bytes")]
    ShortWrite {
        path: String,
        written: usize,
        requested: usize,
    },

    /// This build carries no native backend.
    #[error("cephfs backend is not available in this build")]
    Unavailable,
}

impl CephError {
    /// Build a [`CephError::Op`] from an OS error code.
    pub fn op(op: &'static str, path: &str, errno: i32) -> Self {
        CephError::Op {
            op,
            path: path.to_string(),
            errno,
            message: errno_message(errno),
        }
    }

    /// Wrap a local I/O failure with the path it happened on.
    pub fn local(path: &std::path::Path, source: io::Error) -> Self {
        CephError::Local {
            path: path.display().to_string(),
            source,
        }
    }

    /// The OS error code behind this error, when there is one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            CephError::Op { errno, .. } => Some(*errno),
            CephError::Local { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

/// Human-readable text for an OS error code, without the numeric suffix
/// `io::Error` appends.
fn errno_message(errno: i32) -> String {
    let message = io::Error::from_raw_os_error(errno).to_string();
    match message.rfind(" (os error ") {
        Some(pos) => message[..pos].to_string(),
        None => message,
    }
}
