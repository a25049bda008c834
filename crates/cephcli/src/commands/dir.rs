//! Directory and path commands.

use clap::Args;

use cephfstool::PathKind;

use crate::commands::CliEnv;
use crate::error::CliError;

/// Arguments for `remove`.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// path in cephfs
    #[arg(value_name = "CEPHFS_PATH", required = true)]
    pub cephfs_path: Vec<String>,
}

/// Arguments for `mkdir`.
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// path in cephfs
    #[arg(value_name = "CEPHFS_PATH", required = true)]
    pub cephfs_path: Vec<String>,
}

/// Arguments for `cd`.
#[derive(Debug, Args)]
pub struct CdArgs {
    /// path in cephfs
    pub cephfs_path: String,
}

/// Arguments for `ls`.
#[derive(Debug, Args)]
pub struct LsArgs {
    /// path in cephfs
    pub cephfs_path: Option<String>,
}

/// Remove files or whole directory trees.
///
/// Missing paths are reported and skipped; a failed removal stops the
/// batch.
pub fn execute_remove(env: &mut CliEnv, args: &RemoveArgs) -> Result<(), CliError> {
    let fs = env.login_from_saved()?;
    if env.verbose {
        writeln!(env.out, "remove arguments: {:?}", args.cephfs_path)?;
    }
    for src in &args.cephfs_path {
        let removed = match fs.stat(src) {
            Ok(Some(PathKind::File)) => fs.remove(src).is_ok(),
            Ok(Some(PathKind::Dir)) => fs.remove_tree(src).is_ok(),
            _ => {
                writeln!(env.err, "remove path [{src}] No such file or directory")?;
                continue;
            }
        };
        if !removed {
            return Err(CliError::RemoveFailed { path: src.clone() });
        }
        tracing::debug!(path = %src, "removed");
        writeln!(env.out, "remove cephfs path [{src}] successfully")?;
    }
    Ok(())
}

/// Create directories, parents included.
pub fn execute_mkdir(env: &mut CliEnv, args: &MkdirArgs) -> Result<(), CliError> {
    let fs = env.login_from_saved()?;
    if env.verbose {
        writeln!(env.out, "mkdir arguments: {:?}", args.cephfs_path)?;
    }
    for src in &args.cephfs_path {
        let mut path = src.clone();
        if !path.ends_with('/') {
            path.push('/');
        }
        if fs.ensure_dirs(&path).is_err() {
            return Err(CliError::MkdirFailed { path });
        }
        writeln!(env.out, "mkdir path [{path}] successfully")?;
    }
    Ok(())
}

/// Change the remote working directory and remember it for the next
/// invocation.
pub fn execute_cd(env: &mut CliEnv, args: &CdArgs) -> Result<(), CliError> {
    let fs = env.login_from_saved()?;
    if env.verbose {
        writeln!(env.out, "chdir arguments: {}", args.cephfs_path)?;
    }
    let mut path = args.cephfs_path.clone();
    if !path.ends_with('/') {
        path.push('/');
    }
    if fs.chdir(&path).is_err() {
        return Err(CliError::ChdirFailed { path });
    }
    let cwd = fs.getcwd()?;
    env.session.save_last_dir(&cwd)?;
    writeln!(env.out, "chdir path [{path}] successfully")?;
    Ok(())
}

/// List a directory, the working directory by default.
pub fn execute_ls(env: &mut CliEnv, args: &LsArgs) -> Result<(), CliError> {
    let fs = env.login_from_saved()?;
    if env.verbose {
        writeln!(env.out, "listdir arguments: {:?}", args.cephfs_path)?;
    }
    let path = args.cephfs_path.as_deref().unwrap_or("./");
    let names = fs.list_dir(path).map_err(|_| CliError::ListFailed {
        path: path.to_string(),
    })?;
    if names.is_empty() {
        writeln!(env.out, "empty directory")?;
    } else {
        for name in &names {
            write!(env.out, "{name} ")?;
        }
        writeln!(env.out)?;
    }
    Ok(())
}

/// Print the remote working directory.
pub fn execute_pwd(env: &mut CliEnv) -> Result<(), CliError> {
    let fs = env.login_from_saved()?;
    let cwd = fs.getcwd()?;
    writeln!(env.out, "{cwd}")?;
    Ok(())
}
