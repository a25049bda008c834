//! File transfer commands.

use std::fs;
use std::path::Path;

use clap::Args;

use cephfstool::path::join;
use cephfstool::PathKind;

use crate::commands::CliEnv;
use crate::error::CliError;
use crate::paths::{basename, dirname};

/// Arguments for `upload`.
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// local source path(s), then the destination path in cephfs
    #[arg(value_name = "PATH", num_args = 2.., required = true)]
    pub paths: Vec<String>,
}

/// Arguments for `download`.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// source path in cephfs
    pub cephfs_path: String,

    /// local dst path
    pub dst_path: String,
}

/// Upload local files or directories.
///
/// The last path is the remote destination. A destination with a
/// trailing slash is a directory to upload into; a directory source
/// lands as a directory of the same name below the destination.
/// Missing sources are reported and skipped, other failures stop the
/// batch.
pub fn execute_upload(env: &mut CliEnv, args: &UploadArgs) -> Result<(), CliError> {
    let (cephfs_path, src_paths) = match args.paths.split_last() {
        Some((dst, srcs)) => (dst.as_str(), srcs),
        // Unreachable: the parser requires at least two values.
        None => return Ok(()),
    };
    let fs = env.login_from_saved()?;
    if env.verbose {
        writeln!(env.out, "upload arguments: {src_paths:?} {cephfs_path}")?;
    }

    for source in src_paths {
        let mut src = source.clone();
        let mut dst_path = cephfs_path.to_string();
        if !Path::new(&src).exists() {
            writeln!(env.err, "upload local path [{src}] No such file or directory")?;
            continue;
        } else if Path::new(&src).is_file() {
            if dst_path == "." || dst_path == ".." {
                dst_path.push('/');
            }
            if dst_path.ends_with('/') {
                dst_path.push_str(basename(&src));
            }
        } else if Path::new(&src).is_dir() {
            if matches!(fs.stat(&dst_path), Ok(Some(PathKind::File))) {
                return Err(CliError::UploadDirOverFile {
                    src,
                    dst: dst_path,
                });
            }
            if src.ends_with('/') {
                src.pop();
            }
            let name = basename(&src).to_string();
            dst_path = join(&dst_path, &name);
            if !dst_path.ends_with('/') {
                dst_path.push('/');
            }
        }
        if fs.write_tree(&dst_path, Path::new(&src)).is_err() {
            return Err(CliError::UploadFailed { src });
        }
        tracing::debug!(src = %src, dst = %dst_path, "uploaded");
        writeln!(
            env.out,
            "upload local path [{src}] to cephfs path [{dst_path}] successfully"
        )?;
    }
    Ok(())
}

/// Download one remote file.
///
/// Missing local parent directories are created. A destination that is
/// an existing directory receives the file under its remote name.
/// Remote directories are refused.
pub fn execute_download(env: &mut CliEnv, args: &DownloadArgs) -> Result<(), CliError> {
    let fs = env.login_from_saved()?;
    if env.verbose {
        writeln!(
            env.out,
            "download arguments: {} {}",
            args.cephfs_path, args.dst_path
        )?;
    }

    let mut dst_path = args.dst_path.clone();
    let parent = dirname(&dst_path).to_string();
    if !parent.is_empty() && !Path::new(&parent).exists() {
        fs::create_dir_all(&parent)?;
    }

    match fs.stat(&args.cephfs_path) {
        Ok(Some(PathKind::File)) => {
            if Path::new(&dst_path).is_dir() {
                dst_path = join(&dst_path, basename(&args.cephfs_path));
            }
        }
        Ok(Some(PathKind::Dir)) => {
            return Err(CliError::DownloadDir {
                path: args.cephfs_path.clone(),
            });
        }
        Ok(Some(PathKind::Other)) => {}
        Ok(None) | Err(_) => {
            return Err(CliError::DownloadMissing {
                path: args.cephfs_path.clone(),
            });
        }
    }

    if fs
        .read_file(&args.cephfs_path, Path::new(&dst_path))
        .is_err()
    {
        return Err(CliError::DownloadFailed {
            path: args.cephfs_path.clone(),
        });
    }
    tracing::debug!(src = %args.cephfs_path, dst = %dst_path, "downloaded");
    writeln!(
        env.out,
        "download to local path [{dst_path}] from cephfs path [{}] successfully",
        args.cephfs_path
    )?;
    Ok(())
}
