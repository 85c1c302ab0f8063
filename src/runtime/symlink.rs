//! Symlink operations (create, read, resolve, remove).

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;
use super::path::normalize_path;

impl RealRuntime {
    /// Node modules are directories, so Windows always gets a directory symlink.
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> Result<()> {
        debug!("Linking {:?} -> {:?}", link, original);
        #[cfg(unix)]
        std::os::unix::fs::symlink(original, link)
            .with_context(|| format!("Failed to link {:?} to {:?}", link, original))?;
        #[cfg(windows)]
        std::os::windows::fs::symlink_dir(original, link)
            .with_context(|| format!("Failed to link {:?} to {:?}", link, original))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_link_impl(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).with_context(|| format!("{:?} is not a readable symlink", path))
    }

    /// Target of `path` as written, made absolute against the link's directory.
    #[tracing::instrument(skip(self))]
    pub(crate) fn resolve_link_impl(&self, path: &Path) -> Result<PathBuf> {
        let target = self.read_link_impl(path)?;
        match path.parent() {
            Some(parent) if target.is_relative() => Ok(normalize_path(&parent.join(target))),
            _ => Ok(target),
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn canonicalize_impl(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("Cannot resolve {:?}", path))
    }

    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> Result<()> {
        // A Windows directory symlink is removed like a directory
        #[cfg(windows)]
        let removed = fs::remove_dir(path).or_else(|_| fs::remove_file(path));
        #[cfg(not(windows))]
        let removed = fs::remove_file(path);

        removed.with_context(|| format!("Failed to remove symlink {:?}", path))
    }
}
