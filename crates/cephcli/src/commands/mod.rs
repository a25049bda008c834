//! Command definitions and dispatch.

pub mod config;
pub mod dir;
pub mod transfer;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cephfstool::{CephError, CephFs};

use crate::connect::Connector;
use crate::error::CliError;
use crate::session::{SessionRecord, SessionStore};

/// cephfs client tool
#[derive(Debug, Parser)]
#[command(name = "cephfs-cli", about = "cephfs client tool")]
pub struct Cli {
    /// display version
    #[arg(short = 'v', long)]
    pub version: bool,

    /// show verbose
    #[arg(long, alias = "vv")]
    pub verbose: bool,

    /// user info file
    #[arg(short = 'i', long)]
    pub userfile: Option<PathBuf>,

    /// root path in cephfs
    #[arg(short = 'r', long)]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// config cephfs and authentication
    Config(config::ConfigArgs),
    /// upload files to cephfs
    Upload(transfer::UploadArgs),
    /// download files from cephfs
    Download(transfer::DownloadArgs),
    /// remove files from cephfs
    Remove(dir::RemoveArgs),
    /// print working directory
    Pwd,
    /// make directory
    Mkdir(dir::MkdirArgs),
    /// change directory
    Cd(dir::CdArgs),
    /// list directory
    Ls(dir::LsArgs),
}

impl Commands {
    /// Run the command, printing any fatal error to the error stream
    /// and mapping it to an errno-style exit code.
    pub fn run(&self, env: &mut CliEnv) -> i32 {
        match self.execute(env) {
            Ok(()) => 0,
            Err(err) => {
                let _ = writeln!(env.err, "{err}");
                err.exit_code()
            }
        }
    }

    fn execute(&self, env: &mut CliEnv) -> Result<(), CliError> {
        match self {
            Self::Config(args) => config::execute_config(env, args),
            Self::Upload(args) => transfer::execute_upload(env, args),
            Self::Download(args) => transfer::execute_download(env, args),
            Self::Remove(args) => dir::execute_remove(env, args),
            Self::Pwd => dir::execute_pwd(env),
            Self::Mkdir(args) => dir::execute_mkdir(env, args),
            Self::Cd(args) => dir::execute_cd(env, args),
            Self::Ls(args) => dir::execute_ls(env, args),
        }
    }
}

/// Execution context handed to every command handler.
///
/// Output goes through injected writers so tests can run commands
/// in-process and capture both streams.
pub struct CliEnv<'a> {
    /// Session file access.
    pub session: SessionStore,
    /// Root override from `-r`, already `/`-prefixed.
    pub root: Option<String>,
    /// Echo diagnostics while running.
    pub verbose: bool,
    /// Backend factory.
    pub connector: &'a dyn Connector,
    /// Standard output sink.
    pub out: &'a mut dyn Write,
    /// Standard error sink.
    pub err: &'a mut dyn Write,
}

impl CliEnv<'_> {
    /// Log in with `record`: connect the backend, persist the record,
    /// and restore the saved remote working directory.
    ///
    /// A failure to persist the record or to restore the directory is
    /// reported as a warning, not an error; the login itself stands.
    pub fn login(&mut self, record: &SessionRecord) -> Result<Box<dyn CephFs>, CliError> {
        if self.verbose {
            writeln!(self.out, "login arguments: {record:?}")?;
        }
        if record.cephconf.is_none() && record.cephaddr.is_none() {
            return Err(CliError::EndpointRequired);
        }
        let fs = match self.connector.connect(&record.mount_options()) {
            Ok(fs) => fs,
            Err(CephError::Unavailable) => return Err(CliError::NotInstalled),
            Err(err) => {
                tracing::debug!("cephfs connect failed: {err}");
                return Err(CliError::LoginFailed);
            }
        };
        match self.session.save(record) {
            Ok(()) => {
                if self.verbose {
                    writeln!(
                        self.out,
                        "dump user info {record:?} to {}",
                        self.session.info_path().display()
                    )?;
                }
            }
            Err(err) => {
                writeln!(
                    self.err,
                    "Warning: unable write configure to file {} : {err}",
                    self.session.info_path().display()
                )?;
            }
        }
        if let Some(lwd) = self.session.last_dir() {
            if fs.chdir(&lwd).is_err() {
                writeln!(self.out, "Warning: unable to change to last work dir {lwd}")?;
            }
        }
        if self.verbose {
            writeln!(
                self.out,
                "{}:{} login cephfs successfully",
                record.name.as_deref().unwrap_or("admin"),
                record.root.as_deref().unwrap_or("/")
            )?;
        }
        Ok(fs)
    }

    /// Load the saved record, apply the root override, and log in.
    pub fn login_from_saved(&mut self) -> Result<Box<dyn CephFs>, CliError> {
        let mut record = match self.session.load() {
            Ok(record) => {
                if self.verbose {
                    writeln!(
                        self.out,
                        "read user info {record:?} from {}",
                        self.session.info_path().display()
                    )?;
                }
                record
            }
            Err(err) => {
                if self.verbose {
                    writeln!(self.out, "read user info file error: {err}")?;
                }
                return Err(CliError::NotConfigured);
            }
        };
        if let Some(root) = &self.root {
            record.root = Some(root.clone());
        }
        self.login(&record)
    }
}

// ---- Test support ----


#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;

    use super::testenv::{login_with, TestCli};
    use super::*;
    use crate::connect::RecordingConnector;

    #[test]
    fn test_parse_no_subcommand() {
        let cli = Cli::try_parse_from(["cephfs-cli"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_version_flag() {
        let cli = Cli::try_parse_from(["cephfs-cli", "-v"]).unwrap();
        assert!(cli.version);
    }

    #[test]
    fn test_parse_verbose_aliases() {
        let cli = Cli::try_parse_from(["cephfs-cli", "--verbose", "pwd"]).unwrap();
        assert!(cli.verbose);
        let cli = Cli::try_parse_from(["cephfs-cli", "--vv", "pwd"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_root_and_userfile() {
        let cli =
            Cli::try_parse_from(["cephfs-cli", "-r", "test_group", "-i", "my.info", "ls"]).unwrap();
        assert_eq!(cli.root.as_deref(), Some("test_group"));
        assert_eq!(cli.userfile.as_deref(), Some(std::path::Path::new("my.info")));
    }

    #[test]
    fn test_parse_upload_needs_source_and_destination() {
        let err = Cli::try_parse_from(["cephfs-cli", "upload", "/only_dst"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_parse_remove_needs_a_path() {
        let err = Cli::try_parse_from(["cephfs-cli", "remove"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_login_requires_an_endpoint() {
        let mut cli = TestCli::new("login-endpoint");
        let err = login_with(&mut cli, &SessionRecord::default()).err().unwrap();
        assert!(matches!(err, CliError::EndpointRequired));
        assert_eq!(err.exit_code(), libc::EINVAL);
        cli.cleanup();
    }

    #[test]
    fn test_login_reports_connect_failure() {
        let mut cli = TestCli::new("login-reject");
        cli.cluster.require_key("right");
        let record = SessionRecord {
            cephaddr: Some("10.0.0.1:6789".to_string()),
            key: Some("wrong".to_string()),
            ..Default::default()
        };
        let err = login_with(&mut cli, &record).err().unwrap();
        assert!(matches!(err, CliError::LoginFailed));
        assert_eq!(err.exit_code(), libc::EPERM);
        cli.cleanup();
    }

    #[test]
    fn test_login_passes_conf_and_addr_together() {
        let mut cli = TestCli::new("login-conf-addr");
        let connector = RecordingConnector {
            cluster: cli.cluster.clone(),
            seen: std::cell::RefCell::new(None),
        };
        let record = SessionRecord {
            cephconf: Some("/etc/ceph/ceph.conf".to_string()),
            cephaddr: Some("10.0.0.1:6789".to_string()),
            ..Default::default()
        };
        let mut env = CliEnv {
            session: SessionStore::new(&cli.home, None),
            root: None,
            verbose: false,
            connector: &connector,
            out: &mut cli.out,
            err: &mut cli.err,
        };
        env.login(&record).unwrap();

        let opts = connector.seen.into_inner().unwrap();
        assert_eq!(opts.conf_file.as_deref(), Some("/etc/ceph/ceph.conf"));
        assert_eq!(opts.mon_addr.as_deref(), Some("10.0.0.1:6789"));
        assert_eq!(cli.store().load().unwrap(), record);
        cli.cleanup();
    }

    #[test]
    fn test_login_persists_the_record() {
        let mut cli = TestCli::new("login-persist");
        let record = SessionRecord {
            cephaddr: Some("10.0.0.1:6789".to_string()),
            name: Some("test_cephfs_user".to_string()),
            ..Default::default()
        };
        login_with(&mut cli, &record).unwrap();
        assert_eq!(cli.store().load().unwrap(), record);
        cli.cleanup();
    }

    #[test]
    fn test_login_warns_when_record_cannot_be_written() {
        let mut cli = TestCli::new("login-warn-write");
        // A file where the conf directory should be makes save fail.
        fs::write(cli.home.join("conf"), "occupied").unwrap();
        let record = SessionRecord {
            cephaddr: Some("10.0.0.1:6789".to_string()),
            ..Default::default()
        };
        assert!(login_with(&mut cli, &record).is_ok());
        assert!(cli.stderr().contains("Warning: unable write configure to file"));
        cli.cleanup();
    }

    #[test]
    fn test_login_restores_last_work_dir() {
        let mut cli = TestCli::new("login-lwd");
        cli.remote().make_dirs("/pytest_dir").unwrap();
        cli.store().save_last_dir("/pytest_dir").unwrap();
        let record = SessionRecord {
            cephaddr: Some("10.0.0.1:6789".to_string()),
            ..Default::default()
        };
        let fs = login_with(&mut cli, &record).unwrap();
        assert_eq!(fs.getcwd().unwrap(), "/pytest_dir");
        assert!(!cli.stdout().contains("Warning"));
        cli.cleanup();
    }

    #[test]
    fn test_login_warns_when_last_work_dir_is_gone() {
        let mut cli = TestCli::new("login-lwd-gone");
        cli.store().save_last_dir("/vanished").unwrap();
        let record = SessionRecord {
            cephaddr: Some("10.0.0.1:6789".to_string()),
            ..Default::default()
        };
        let fs = login_with(&mut cli, &record).unwrap();
        assert_eq!(fs.getcwd().unwrap(), "/");
        assert!(cli
            .stdout()
            .contains("Warning: unable to change to last work dir /vanished"));
        cli.cleanup();
    }

    #[test]
    fn test_login_verbose_announces_user_and_root() {
        let mut cli = TestCli::new("login-verbose");
        cli.verbose = true;
        let record = SessionRecord {
            cephaddr: Some("10.0.0.1:6789".to_string()),
            ..Default::default()
        };
        login_with(&mut cli, &record).unwrap();
        let out = cli.stdout();
        assert!(out.contains("login arguments:"));
        assert!(out.contains("admin:/ login cephfs successfully"));
        cli.cleanup();
    }

    #[test]
    fn test_command_without_config_fails() {
        let mut cli = TestCli::new("unconfigured");
        let code = cli.run(&Commands::Pwd);
        assert_eq!(code, libc::EPERM);
        assert!(cli
            .stderr()
            .contains("Not config correctly, please run install.sh firstly"));
        cli.cleanup();
    }

    #[test]
    fn test_root_override_is_used_and_saved() {
        let mut cli = TestCli::new("root-override");
        cli.configure();
        cli.remote().make_dirs("/test_group/sub").unwrap();
        cli.root = Some("/test_group".to_string());
        cli.verbose = true;

        let code = cli.run(&Commands::Pwd);
        assert_eq!(code, 0);
        assert!(cli
            .stdout()
            .contains("admin:/test_group login cephfs successfully"));
        assert_eq!(
            cli.store().load().unwrap().root.as_deref(),
            Some("/test_group")
        );
        cli.cleanup();
    }
}
