//! The `config` command.

use std::fs;

use clap::Args;

use crate::commands::CliEnv;
use crate::error::CliError;
use crate::session::SessionRecord;

/// Arguments for `config`.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// ceph configuration file
    #[arg(short = 'c', long = "conf", value_name = "CEPHCONF", value_parser = readable_file)]
    pub cephconf: Option<String>,

    /// ceph mon addr
    #[arg(short = 'a', long)]
    pub cephaddr: Option<String>,

    /// client name for authentication
    #[arg(short = 'n', long = "name")]
    pub user: Option<String>,

    /// keyfile for authentication
    #[arg(short = 'k', long, value_parser = readable_file)]
    pub keyfile: Option<String>,
}

/// Accept only paths that can be opened for reading, so a typo fails
/// at parse time.
fn readable_file(value: &str) -> Result<String, String> {
    match fs::File::open(value) {
        Ok(_) => Ok(value.to_string()),
        Err(err) => Err(format!("can't open '{value}': {err}")),
    }
}

/// Show the saved identity or establish a new one.
///
/// Without an endpoint argument the saved record is displayed; with
/// one, a fresh record is built, verified by logging in, and saved.
pub fn execute_config(env: &mut CliEnv, args: &ConfigArgs) -> Result<(), CliError> {
    let saved = match env.session.load() {
        Ok(record) => {
            if env.verbose {
                writeln!(
                    env.out,
                    "read user info {record:?} from {}",
                    env.session.info_path().display()
                )?;
            }
            Some(record)
        }
        Err(err) => {
            if env.verbose {
                writeln!(env.out, "read user info file error: {err}")?;
            }
            None
        }
    };

    if args.cephconf.is_none() && args.cephaddr.is_none() {
        if let Some(info) = saved {
            writeln!(env.out, "current user info:")?;
            writeln!(env.out, "User: {}", info.name.as_deref().unwrap_or("admin"))?;
            writeln!(env.out, "Root path: {}", info.root.as_deref().unwrap_or("/"))?;
            writeln!(env.out, "use config -h for help to change config")?;
            return Ok(());
        }
        return Err(CliError::AddrRequired);
    }

    let mut record = SessionRecord {
        cephconf: args.cephconf.clone(),
        cephaddr: args.cephaddr.clone(),
        name: args.user.clone(),
        key: None,
        root: None,
    };
    if let Some(keyfile) = &args.keyfile {
        record.key = Some(fs::read_to_string(keyfile)?);
    }
    record.root = match (&env.root, &args.user) {
        (Some(root), _) => Some(root.clone()),
        (None, Some(user)) => Some(format!("/{user}")),
        (None, None) => None,
    };
    if env.verbose {
        writeln!(env.out, "config: {record:?}")?;
    }

    env.login(&record)?;
    writeln!(
        env.out,
        "config cephfs successfully\nYou can run upload or download command etc."
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;

    use cephfstool::CephFs;

    use super::*;
    use crate::commands::testenv::TestCli;
    use crate::commands::{Cli, Commands};

    fn config_args(cephaddr: Option<&str>, user: Option<&str>) -> ConfigArgs {
        ConfigArgs {
            cephconf: None,
            cephaddr: cephaddr.map(str::to_string),
            user: user.map(str::to_string),
            keyfile: None,
        }
    }

    #[test]
    fn test_config_without_addr_and_without_record() {
        let mut cli = TestCli::new("config-bare");
        let code = cli.run(&Commands::Config(config_args(None, None)));
        assert_eq!(code, libc::EINVAL);
        assert!(cli
            .stderr()
            .contains("-c or -a is required for ceph addr\nconfig -h for help"));
        cli.cleanup();
    }

    #[test]
    fn test_config_without_addr_shows_current_info() {
        let mut cli = TestCli::new("config-show");
        cli.store()
            .save(&crate::session::SessionRecord {
                cephaddr: Some("10.0.0.1:6789".to_string()),
                name: Some("test_cephfs_user".to_string()),
                root: Some("/test_group".to_string()),
                ..Default::default()
            })
            .unwrap();

        let code = cli.run(&Commands::Config(config_args(None, None)));
        assert_eq!(code, 0);
        let out = cli.stdout();
        assert!(out.contains("current user info:"));
        assert!(out.contains("User: test_cephfs_user"));
        assert!(out.contains("Root path: /test_group"));
        assert!(out.contains("use config -h for help to change config"));
        cli.cleanup();
    }

    #[test]
    fn test_config_logs_in_and_saves() {
        let mut cli = TestCli::new("config-login");
        let code = cli.run(&Commands::Config(config_args(Some("10.0.0.1:6789"), None)));
        assert_eq!(code, 0);
        assert!(cli.stdout().contains(
            "config cephfs successfully\nYou can run upload or download command etc."
        ));

        let record = cli.store().load().unwrap();
        assert_eq!(record.cephaddr.as_deref(), Some("10.0.0.1:6789"));
        assert_eq!(record.name, None);
        assert_eq!(record.root, None);
        cli.cleanup();
    }

    #[test]
    fn test_config_saves_conf_and_addr_together() {
        let mut cli = TestCli::new("config-conf-addr");
        let args = ConfigArgs {
            cephconf: Some("/etc/ceph/ceph.conf".to_string()),
            cephaddr: Some("10.0.0.1:6789".to_string()),
            user: None,
            keyfile: None,
        };
        let code = cli.run(&Commands::Config(args));
        assert_eq!(code, 0);

        let record = cli.store().load().unwrap();
        assert_eq!(record.cephconf.as_deref(), Some("/etc/ceph/ceph.conf"));
        assert_eq!(record.cephaddr.as_deref(), Some("10.0.0.1:6789"));
        cli.cleanup();
    }

    #[test]
    fn test_config_failure_reports_login_failed() {
        let mut cli = TestCli::new("config-denied");
        cli.cluster.require_key("secret");
        let code = cli.run(&Commands::Config(config_args(Some("10.0.0.1:6789"), None)));
        assert_eq!(code, libc::EPERM);
        assert!(cli.stderr().contains("user login cephfs failed"));
        assert!(cli.store().load().is_err());
        cli.cleanup();
    }

    #[test]
    fn test_config_user_defaults_root_to_home() {
        let mut cli = TestCli::new("config-user-root");
        cli.remote().make_dirs("/test_cephfs_user").unwrap();
        let code = cli.run(&Commands::Config(config_args(
            Some("10.0.0.1:6789"),
            Some("test_cephfs_user"),
        )));
        assert_eq!(code, 0);
        let record = cli.store().load().unwrap();
        assert_eq!(record.root.as_deref(), Some("/test_cephfs_user"));
        cli.cleanup();
    }

    #[test]
    fn test_config_explicit_root_wins() {
        let mut cli = TestCli::new("config-explicit-root");
        cli.remote().make_dirs("/test_group").unwrap();
        cli.root = Some("/test_group".to_string());
        let code = cli.run(&Commands::Config(config_args(
            Some("10.0.0.1:6789"),
            Some("test_cephfs_user"),
        )));
        assert_eq!(code, 0);
        let record = cli.store().load().unwrap();
        assert_eq!(record.root.as_deref(), Some("/test_group"));
        cli.cleanup();
    }

    #[test]
    fn test_config_reads_key_from_keyfile() {
        let mut cli = TestCli::new("config-keyfile");
        let keyfile = cli.home.join("client.key");
        fs::write(&keyfile, "AQD7wDFaa7npJBAA...==").unwrap();
        cli.cluster.require_key("AQD7wDFaa7npJBAA...==");

        let args = ConfigArgs {
            cephconf: None,
            cephaddr: Some("10.0.0.1:6789".to_string()),
            user: None,
            keyfile: Some(keyfile.display().to_string()),
        };
        let code = cli.run(&Commands::Config(args));
        assert_eq!(code, 0);
        assert_eq!(
            cli.store().load().unwrap().key.as_deref(),
            Some("AQD7wDFaa7npJBAA...==")
        );
        cli.cleanup();
    }

    #[test]
    fn test_config_rejects_unreadable_conf_at_parse_time() {
        let err = Cli::try_parse_from([
            "cephfs-cli",
            "config",
            "-c",
            "/nonexistent/path/ceph.conf",
        ])
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("can't open '/nonexistent/path/ceph.conf'"));
    }

    #[test]
    fn test_config_parses_all_options() {
        let dir = std::env::temp_dir().join("cephcli-test-config-parse");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let conf = dir.join("ceph.conf");
        fs::write(&conf, "[global]\nmon_host = 10.0.0.1\n").unwrap();

        let cli = Cli::try_parse_from([
            "cephfs-cli",
            "config",
            "-c",
            conf.to_str().unwrap(),
            "-a",
            "10.0.0.1:6789",
            "-n",
            "someone",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Config(args)) => {
                assert_eq!(args.cephconf.as_deref(), conf.to_str());
                assert_eq!(args.user.as_deref(), Some("someone"));
                assert_eq!(args.cephaddr.as_deref(), Some("10.0.0.1:6789"));
            }
            other => panic!("expected config, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
