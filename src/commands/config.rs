use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::application::LinkContext;
use crate::package::{AliasStore, PackageManager};
use crate::runtime::Runtime;

use super::paths::{config_file, default_install_root};

/// Locations resolved from the command line before any command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub install_root: PathBuf,
    /// Explicit global pool; derived from the package manager when absent.
    pub global_dir: Option<PathBuf>,
    pub config_file: PathBuf,
}

impl Config {
    pub fn new<R: Runtime>(
        runtime: &R,
        install_root: Option<PathBuf>,
        global_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let install_root = match install_root {
            Some(path) => path,
            None => default_install_root(runtime)?,
        };
        let config_file = config_file(runtime)?;
        debug!(
            "Using install root {:?} and configuration {:?}",
            install_root, config_file
        );

        Ok(Self {
            install_root,
            global_dir,
            config_file,
        })
    }

    pub fn context<R: Runtime>(&self, runtime: &R) -> Result<LinkContext> {
        LinkContext::load(runtime, &self.install_root, self.global_dir.clone())
    }

    pub fn alias_store<'a, R: Runtime>(&self, runtime: &'a R) -> AliasStore<'a, R> {
        AliasStore::load(runtime, self.config_file.clone())
    }

    /// Package manager for commands that never touch the global pool.
    pub fn package_manager<R: Runtime>(&self, runtime: &R) -> PackageManager {
        PackageManager::detect(runtime, &self.install_root)
    }
}
