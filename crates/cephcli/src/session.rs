//! Persisted session state.
//!
//! A successful login writes two files under the tool's home
//! directory: the JSON session record with the connection parameters,
//! and a one-line marker with the last remote working directory so the
//! next invocation resumes where the previous one stopped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cephfstool::MountOptions;

/// Relative path of the session record below the home directory.
const INFO_FILE: &str = "conf/user.info";

/// Marker file holding the last remote working directory.
const LWD_FILE: &str = ".cephcli.last.lwd";

/// The login parameters persisted across invocations.
///
/// Serialized as JSON with exactly these five nullable fields, fully
/// replaced on every successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Ceph configuration file path.
    #[serde(default)]
    pub cephconf: Option<String>,
    /// Monitor address list.
    #[serde(default)]
    pub cephaddr: Option<String>,
    /// Client entity name.
    #[serde(default)]
    pub name: Option<String>,
    /// Authentication key.
    #[serde(default)]
    pub key: Option<String>,
    /// Remote mount root.
    #[serde(default)]
    pub root: Option<String>,
}

impl SessionRecord {
    /// Mount options carrying these parameters.
    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            conf_file: self.cephconf.clone(),
            mon_addr: self.cephaddr.clone(),
            user: self.name.clone(),
            key: self.key.clone(),
            root: self.root.clone(),
        }
    }
}

/// Access to the two session files.
#[derive(Debug, Clone)]
pub struct SessionStore {
    info_path: PathBuf,
    lwd_path: PathBuf,
}

impl SessionStore {
    /// Store rooted at `home`. An explicit `info_override` replaces the
    /// default record location.
    pub fn new(home: &Path, info_override: Option<PathBuf>) -> Self {
        SessionStore {
            info_path: info_override.unwrap_or_else(|| home.join(INFO_FILE)),
            lwd_path: home.join(LWD_FILE),
        }
    }

    /// Where the session record lives.
    pub fn info_path(&self) -> &Path {
        &self.info_path
    }

    /// Load the record; any read or parse failure is reported.
    pub fn load(&self) -> io::Result<SessionRecord> {
        let data = fs::read_to_string(&self.info_path)?;
        serde_json::from_str(&data).map_err(io::Error::from)
    }

    /// Replace the record, creating its parent directory first.
    pub fn save(&self, record: &SessionRecord) -> io::Result<()> {
        if let Some(parent) = self.info_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string(record).map_err(io::Error::from)?;
        fs::write(&self.info_path, data)
    }

    /// The saved last working directory, if any.
    pub fn last_dir(&self) -> Option<String> {
        fs::read_to_string(&self.lwd_path).ok()
    }

    /// Remember `dir` as the last working directory.
    pub fn save_last_dir(&self, dir: &str) -> io::Result<()> {
        fs::write(&self.lwd_path, dir)
    }
}

/// Home directory for session files and logs: `CEPH_CLI_HOME` when
/// set, otherwise the directory of the running executable, falling
/// back to the current directory.
pub fn home_dir() -> PathBuf {
    if let Ok(home) = std::env::var("CEPH_CLI_HOME") {
        return PathBuf::from(home);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
