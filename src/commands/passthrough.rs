//! Commands that hand straight over to the package manager or the platform.

use anyhow::Result;

use crate::package::{Delegate, PackageManager};
use crate::runtime::Runtime;

use super::config::Config;

#[cfg(windows)]
const NPX: &str = "npx.cmd";
#[cfg(not(windows))]
const NPX: &str = "npx";

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(windows)]
const OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", windows)))]
const OPENER: &str = "xdg-open";

/// `install` / `uninstall` in the install root, spelled the way the package manager expects
#[tracing::instrument(skip(runtime, config))]
pub fn install<R: Runtime>(
    runtime: R,
    command: &str,
    module: Option<&str>,
    args: &[String],
    config: Config,
) -> Result<()> {
    let manager = config.package_manager(&runtime);
    let subcommand = manager.install_subcommand(command, module.is_some());

    let mut argv: Vec<String> = module.map(str::to_string).into_iter().collect();
    argv.extend(args.iter().cloned());

    Delegate::new(&runtime, manager).run(&subcommand, &argv, &config.install_root)?;
    Ok(())
}

/// Upgrade the install root's dependencies
#[tracing::instrument(skip(runtime, config))]
pub fn upgrade<R: Runtime>(runtime: R, args: &[String], config: Config) -> Result<()> {
    let manager = config.package_manager(&runtime);
    let delegate = Delegate::new(&runtime, manager);

    match manager {
        PackageManager::Yarn => {
            delegate.run("upgrade-interactive", args, &config.install_root)?;
        }
        PackageManager::Npm => {
            let mut argv = args.to_vec();
            if !argv.iter().any(|a| a == "-u" || a == "--upgrade") {
                argv.push("-u".to_string());
            }
            delegate.run_program(NPX, "npm-check-updates", &argv, &config.install_root)?;
        }
    }
    Ok(())
}

/// Open the global pool in the platform file browser
#[tracing::instrument(skip(runtime, config))]
pub fn open<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let ctx = config.context(&runtime)?;
    Delegate::new(&runtime, ctx.package_manager).run_program(OPENER, ".", &[], &ctx.global_dir)?;
    Ok(())
}

/// Print the install root
pub fn path(config: Config) -> Result<()> {
    println!("{}", config.install_root.display());
    Ok(())
}

/// Print npm's global prefix, or an empty line when it cannot be found
#[tracing::instrument(skip(runtime))]
pub fn prefix<R: Runtime>(runtime: R) -> Result<()> {
    let prefix = PackageManager::npm_prefix(&runtime)
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    println!("{}", prefix);
    Ok(())
}
