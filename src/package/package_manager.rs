//! The external package manager kupler delegates to.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    /// Yarn when the install root carries a `yarn.lock`, npm otherwise.
    pub fn detect<R: Runtime>(runtime: &R, install_root: &Path) -> Self {
        if runtime.exists(&install_root.join("yarn.lock")) {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Executable to spawn; Windows ships these as `.cmd` shims.
    pub fn program(&self) -> &'static str {
        match self {
            #[cfg(windows)]
            PackageManager::Npm => "npm.cmd",
            #[cfg(windows)]
            PackageManager::Yarn => "yarn.cmd",
            #[cfg(not(windows))]
            PackageManager::Npm => "npm",
            #[cfg(not(windows))]
            PackageManager::Yarn => "yarn",
        }
    }

    /// npm's global prefix, from the environment or `npm prefix -g`.
    #[tracing::instrument(skip(runtime))]
    pub fn npm_prefix<R: Runtime>(runtime: &R) -> Option<PathBuf> {
        for key in ["NPM_CONFIG_PREFIX", "npm_config_prefix"] {
            if let Ok(value) = runtime.env_var(key)
                && !value.trim().is_empty()
            {
                debug!("Using npm prefix from {}", key);
                return Some(PathBuf::from(value.trim()));
            }
        }

        match runtime.capture(
            PackageManager::Npm.program(),
            &["prefix".to_string(), "-g".to_string()],
        ) {
            Ok(out) if !out.is_empty() => Some(PathBuf::from(out)),
            Ok(_) => None,
            Err(e) => {
                debug!("Could not query npm prefix: {:#}", e);
                None
            }
        }
    }

    /// Directory holding globally linked modules for this package manager.
    #[tracing::instrument(skip(runtime))]
    pub fn global_dir<R: Runtime>(&self, runtime: &R) -> Result<PathBuf> {
        match self {
            PackageManager::Npm => {
                let prefix = Self::npm_prefix(runtime)
                    .context("Failed to locate npm prefix for globally installed modules.")?;
                #[cfg(windows)]
                return Ok(prefix.join("node_modules"));
                #[cfg(not(windows))]
                return Ok(prefix.join("lib").join("node_modules"));
            }
            PackageManager::Yarn => {
                #[cfg(windows)]
                {
                    let data = runtime
                        .data_local_dir()
                        .context("Could not find local data directory")?;
                    Ok(data.join("Yarn").join("Data").join("link"))
                }
                #[cfg(not(windows))]
                {
                    let home = runtime.home_dir().context("Could not find home directory")?;
                    Ok(home.join(".config").join("yarn").join("link"))
                }
            }
        }
    }

    /// Map an install-style subcommand onto this package manager's spelling.
    pub fn install_subcommand(&self, command: &str, has_module: bool) -> String {
        match (self, command) {
            (PackageManager::Yarn, "install") if has_module => "add".to_string(),
            (PackageManager::Yarn, "uninstall") => "remove".to_string(),
            (PackageManager::Npm, "add") => "install".to_string(),
            (PackageManager::Npm, "remove") => "uninstall".to_string(),
            _ => command.to_string(),
        }
    }
}

/// Runs the package manager with inherited stdio and trusts its exit status.
pub struct Delegate<'a, R: Runtime> {
    runtime: &'a R,
    manager: PackageManager,
}

impl<'a, R: Runtime> Delegate<'a, R> {
    pub fn new(runtime: &'a R, manager: PackageManager) -> Self {
        Self { runtime, manager }
    }

    pub fn manager(&self) -> PackageManager {
        self.manager
    }

    /// Run `<pm> <subcommand> <args..>` in `cwd`.
    #[tracing::instrument(skip(self))]
    pub fn run(&self, subcommand: &str, args: &[String], cwd: &Path) -> Result<(), LinkError> {
        self.run_program(self.manager.program(), subcommand, args, cwd)
    }

    /// Same as [`Delegate::run`] for a companion executable such as `npx`.
    pub fn run_program(
        &self,
        program: &str,
        subcommand: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<(), LinkError> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(subcommand.to_string());
        argv.extend(args.iter().cloned());

        info!("Delegating `{} {}` in {:?}", program, argv.join(" "), cwd);
        let outcome = self
            .runtime
            .run(program, &argv, cwd)
            .with_context(|| format!("Failed to run {}", program))?;

        if outcome.success {
            Ok(())
        } else {
            Err(LinkError::DelegateFailed {
                program: program.to_string(),
                subcommand: subcommand.to_string(),
                outcome,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ExitOutcome, MockRuntime};
    use mockall::predicate::eq;

    #[test]
    fn test_detect_yarn_by_lockfile() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/home/user/.kupler");
        runtime
            .expect_exists()
            .with(eq(root.join("yarn.lock")))
            .returning(|_| true);
        assert_eq!(PackageManager::detect(&runtime, &root), PackageManager::Yarn);

        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        assert_eq!(PackageManager::detect(&runtime, &root), PackageManager::Npm);
    }

    #[test]
    fn test_npm_prefix_from_environment() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq("NPM_CONFIG_PREFIX"))
            .returning(|_| Ok("/opt/node".to_string()));
        runtime.expect_capture().never();

        assert_eq!(
            PackageManager::npm_prefix(&runtime),
            Some(PathBuf::from("/opt/node"))
        );
    }

    #[test]
    fn test_npm_prefix_falls_back_to_npm() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));
        runtime
            .expect_capture()
            .withf(|program, args| {
                program == PackageManager::Npm.program() && args == ["prefix", "-g"]
            })
            .returning(|_, _| Ok("/usr/local".to_string()));

        assert_eq!(
            PackageManager::npm_prefix(&runtime),
            Some(PathBuf::from("/usr/local"))
        );

        #[cfg(not(windows))]
        assert_eq!(
            PackageManager::Npm.global_dir(&runtime).unwrap(),
            PathBuf::from("/usr/local/lib/node_modules")
        );
    }

    #[test]
    fn test_global_dir_fails_without_prefix() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));
        runtime
            .expect_capture()
            .returning(|_, _| Err(anyhow::anyhow!("npm: command not found")));

        let err = PackageManager::Npm.global_dir(&runtime).unwrap_err();
        assert!(err.to_string().contains("Failed to locate npm prefix"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_yarn_global_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_home_dir()
            .returning(|| Some(PathBuf::from("/home/user")));

        assert_eq!(
            PackageManager::Yarn.global_dir(&runtime).unwrap(),
            PathBuf::from("/home/user/.config/yarn/link")
        );
    }

    #[test]
    fn test_install_subcommand_mapping() {
        assert_eq!(PackageManager::Yarn.install_subcommand("install", true), "add");
        assert_eq!(PackageManager::Yarn.install_subcommand("install", false), "install");
        assert_eq!(PackageManager::Yarn.install_subcommand("uninstall", true), "remove");
        assert_eq!(PackageManager::Npm.install_subcommand("add", true), "install");
        assert_eq!(PackageManager::Npm.install_subcommand("remove", true), "uninstall");
        assert_eq!(PackageManager::Npm.install_subcommand("install", true), "install");
    }

    #[test]
    fn test_delegate_passes_argv_and_cwd() {
        let mut runtime = MockRuntime::new();
        let cwd = PathBuf::from("/home/user/.kupler/node_modules/react");
        let expected_cwd = cwd.clone();
        runtime
            .expect_run()
            .withf(move |program, args, dir| {
                program == PackageManager::Npm.program()
                    && args == ["link", "--force"]
                    && dir == expected_cwd.as_path()
            })
            .times(1)
            .returning(|_, _, _| Ok(ExitOutcome::success()));

        let delegate = Delegate::new(&runtime, PackageManager::Npm);
        delegate
            .run("link", &["--force".to_string()], &cwd)
            .unwrap();
    }

    #[test]
    fn test_delegate_failure_is_reported() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_, _, _| Ok(ExitOutcome::failure(1)));

        let delegate = Delegate::new(&runtime, PackageManager::Yarn);
        let err = delegate
            .run("unlink", &[], Path::new("/work/app"))
            .unwrap_err();
        assert!(matches!(err, LinkError::DelegateFailed { .. }));
    }
}
