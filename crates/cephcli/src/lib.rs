//! Library half of the cephfs client tool.
//!
//! Command definitions and handlers live in [`commands`], persisted
//! login state in [`session`], and the backend seam in [`connect`].
//! Handlers write through injected output streams and return typed
//! errors whose display text and errno-style exit codes are the
//! user-facing contract, so full command flows run in-process under
//! test against the in-memory backend.

pub mod commands;
pub mod connect;
pub mod error;
pub mod logging;
pub mod paths;
pub mod session;

pub use commands::{Cli, CliEnv, Commands};
pub use connect::{Connector, LibcephfsConnector};
pub use error::CliError;
pub use session::{home_dir, SessionRecord, SessionStore};
