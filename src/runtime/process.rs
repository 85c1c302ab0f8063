//! Subprocess delegation.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

use super::RealRuntime;

/// How a delegated process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failure(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

impl std::fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "a signal"),
        }
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_impl(&self, program: &str, args: &[String], cwd: &Path) -> Result<ExitOutcome> {
        debug!("Running {} {:?} in {:?}", program, args, cwd);
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to spawn `{}`", program))?;

        Ok(ExitOutcome {
            success: status.success(),
            code: status.code(),
        })
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn capture_impl(&self, program: &str, args: &[String]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("Failed to spawn `{}`", program))?;

        if !output.status.success() {
            bail!("`{} {}` failed with {:?}", program, args.join(" "), output.status.code());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_status() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let ok = runtime.run("true", &[], dir.path()).unwrap();
        assert!(ok.success);
        assert_eq!(ok.code, Some(0));

        let failed = runtime
            .run("sh", &["-c".to_string(), "exit 3".to_string()], dir.path())
            .unwrap();
        assert!(!failed.success);
        assert_eq!(failed.code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_uses_working_directory() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let outcome = runtime
            .run("sh", &["-c".to_string(), "touch marker".to_string()], dir.path())
            .unwrap();
        assert!(outcome.success);
        assert!(dir.path().join("marker").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_trims_stdout() {
        let runtime = RealRuntime;
        let out = runtime
            .capture("echo", &["  /usr/local  ".to_string()])
            .unwrap();
        assert_eq!(out, "/usr/local");
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        assert!(
            runtime
                .run("kupler-no-such-program", &[], dir.path())
                .is_err()
        );
        assert!(runtime.capture("kupler-no-such-program", &[]).is_err());
    }

    #[test]
    fn test_exit_outcome_display() {
        assert_eq!(ExitOutcome::failure(2).to_string(), "exit code 2");
        assert_eq!(
            ExitOutcome {
                success: false,
                code: None
            }
            .to_string(),
            "a signal"
        );
    }
}
