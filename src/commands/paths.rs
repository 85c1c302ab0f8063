use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

const APP_DIR: &str = ".kupler";
const CONFIG_FILE: &str = "conf.json";

/// Get the default install root (`~/.kupler`)
#[tracing::instrument(skip(runtime))]
pub fn default_install_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(APP_DIR))
}

/// The alias configuration always lives in the home directory, whatever the install root.
#[tracing::instrument(skip(runtime))]
pub fn config_file<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    Ok(default_install_root(runtime)?.join(CONFIG_FILE))
}
