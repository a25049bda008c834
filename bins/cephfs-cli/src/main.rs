use std::fs;
use std::io;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use cephcli::commands::{Cli, CliEnv};
use cephcli::connect::LibcephfsConnector;
use cephcli::logging;
use cephcli::session::{home_dir, SessionStore};

fn main() {
    // Version wins anywhere on the command line, before parsing.
    if std::env::args().skip(1).any(|arg| arg == "-v") {
        let version = std::env::var("CEPH_CLI_VERSION").unwrap_or_else(|_| "0.0.1".to_string());
        println!("cephcli {version}{}", cephfstool::build_stamp());
        return;
    }

    let cli = Cli::parse();
    let command = match cli.command {
        Some(command) => command,
        None => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::MissingSubcommand, "too few arguments")
                .exit();
        }
    };

    let home = home_dir();
    let log_dir = home.join("logs");
    let _ = fs::create_dir(&log_dir);
    let guard = logging::init(Some(&log_dir), cli.verbose);
    if cli.verbose {
        println!("log to path {}", log_dir.display());
    }

    let root = cli.root.map(|root| {
        if root.starts_with('/') {
            root
        } else {
            format!("/{root}")
        }
    });

    let code = {
        let mut out = io::stdout();
        let mut err = io::stderr();
        let connector = LibcephfsConnector;
        let mut env = CliEnv {
            session: SessionStore::new(&home, cli.userfile),
            root,
            verbose: cli.verbose,
            connector: &connector,
            out: &mut out,
            err: &mut err,
        };
        command.run(&mut env)
    };
    drop(guard);
    process::exit(code);
}
