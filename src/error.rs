//! Error kinds returned by the link engine and status reporter.

use std::path::PathBuf;
use thiserror::Error;

use crate::runtime::ExitOutcome;

/// Failure of a link, unlink, use, unuse or status request.
#[derive(Error, Debug)]
pub enum LinkError {
    /// No module name was supplied where one is required.
    #[error("cannot `{command}` using package name of undefined.")]
    ModuleUndefined { command: &'static str },

    /// The module is absent from the install root's `node_modules`.
    #[error("package `{module}` is not installed.")]
    ModuleNotInstalled { module: String },

    /// use/unuse on a module that is not published to the global pool.
    #[error("command `{command}` failed, package `{module}` is not linked in kupler.")]
    NotLinked {
        command: &'static str,
        module: String,
    },

    /// use/unuse run from inside the install root itself.
    #[error(
        "running `{command}` within kupler is prohibited. Did you mean to run {command} in another project/directory?"
    )]
    SelfOperationProhibited { command: &'static str },

    /// A symlink could not be created or removed.
    #[error("failed to {action} {path:?}: {source:#}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The delegated package manager ran but reported failure.
    #[error("`{program} {subcommand}` failed with {outcome}")]
    DelegateFailed {
        program: String,
        subcommand: String,
        outcome: ExitOutcome,
    },

    /// Anything the engine cannot categorise.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LinkError {
    pub(crate) fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: anyhow::Error,
    ) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}
