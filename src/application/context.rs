//! Everything the link engine and status reporter need to know about this installation.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::package::{Manifest, PackageManager};
use crate::runtime::{Runtime, module_path};

/// Resolved install root, global pool and manifest for one invocation.
///
/// Built once by the command layer; the manifest (and therefore every
/// dependency's alias-install flag) is parsed here and nowhere else.
#[derive(Debug, Clone)]
pub struct LinkContext {
    /// Canonical install root: holds kupler's `package.json` and `node_modules`.
    pub install_root: PathBuf,
    /// Global pool directory.
    pub global_dir: PathBuf,
    pub manifest: Manifest,
    pub package_manager: PackageManager,
}

impl LinkContext {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(
        runtime: &R,
        install_root: &Path,
        global_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let install_root = runtime
            .canonicalize(install_root)
            .unwrap_or_else(|_| install_root.to_path_buf());
        let manifest = Manifest::load(runtime, &install_root)?;
        let package_manager = PackageManager::detect(runtime, &install_root);
        let global_dir = match global_dir {
            Some(dir) => dir,
            None => package_manager.global_dir(runtime)?,
        };

        debug!(
            "Install root {:?}, global pool {:?}, using {}",
            install_root,
            global_dir,
            package_manager.name()
        );

        Ok(Self {
            install_root,
            global_dir,
            manifest,
            package_manager,
        })
    }

    /// `<install_root>/node_modules/<module>`
    pub fn installed_path(&self, module: &str) -> PathBuf {
        module_path(&self.install_root.join("node_modules"), module)
    }

    /// `<global_dir>/<module>`
    pub fn global_path(&self, module: &str) -> PathBuf {
        module_path(&self.global_dir, module)
    }

    /// Installed means the module's own `package.json` is present.
    pub fn is_installed<R: Runtime>(&self, runtime: &R, module: &str) -> bool {
        runtime.exists(&self.installed_path(module).join("package.json"))
    }
}
