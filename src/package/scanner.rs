//! Directory scanning and link classification for the global pool.

use anyhow::Result;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, is_path_under};

use super::Manifest;

/// One immediate child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalDirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_symbolic_link: bool,
    /// Fully resolved target. For a dangling link this is the link's own
    /// target as written; when even that cannot be read, `path`.
    pub real_path: PathBuf,
    pub path_exists: bool,
}

impl GlobalDirectoryEntry {
    /// Published by kupler: a live symlink into the install root for a declared dependency.
    pub fn is_linked(&self, install_root: &Path, manifest: &Manifest) -> bool {
        self.is_symbolic_link
            && self.path_exists
            && is_path_under(&self.real_path, install_root)
            && manifest.declares(&self.name)
    }

    /// A declared dependency whose entry points into the install root at something that is gone.
    pub fn is_missing(&self, install_root: &Path, manifest: &Manifest) -> bool {
        manifest.declares(&self.name)
            && is_path_under(&self.real_path, install_root)
            && !self.path_exists
    }
}

/// Result of scanning one directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScan {
    names: Vec<String>,
    stats: HashMap<String, GlobalDirectoryEntry>,
}

impl DirectoryScan {
    /// Entry names in directory enumeration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&GlobalDirectoryEntry> {
        self.stats.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &GlobalDirectoryEntry> {
        self.names.iter().filter_map(|name| self.stats.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names classified as linked, in scan order.
    pub fn linked(&self, install_root: &Path, manifest: &Manifest) -> Vec<&str> {
        self.entries()
            .filter(|e| e.is_linked(install_root, manifest))
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Names classified as missing, in scan order.
    pub fn missing(&self, install_root: &Path, manifest: &Manifest) -> Vec<&str> {
        self.entries()
            .filter(|e| e.is_missing(install_root, manifest))
            .map(|e| e.name.as_str())
            .collect()
    }

    fn push(&mut self, entry: GlobalDirectoryEntry) {
        self.names.push(entry.name.clone());
        self.stats.insert(entry.name.clone(), entry);
    }
}

/// Lists directories and symlinks directly below a path and records where they point.
pub struct DirectoryScanner<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> DirectoryScanner<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Scan `dir`. A directory that does not exist yet scans as empty.
    #[tracing::instrument(skip(self))]
    pub fn scan(&self, dir: &Path) -> Result<DirectoryScan> {
        let mut scan = DirectoryScan::default();

        if !self.runtime.is_dir(dir) {
            debug!("{:?} is not a directory, nothing to scan", dir);
            return Ok(scan);
        }

        for path in self.runtime.read_dir(dir)? {
            let is_symbolic_link = self.runtime.is_symlink(&path);
            if !is_symbolic_link && !self.runtime.is_dir(&path) {
                continue;
            }

            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };

            scan.push(self.inspect(name, path, is_symbolic_link));
        }

        debug!("Scanned {} entries in {:?}", scan.names.len(), dir);
        Ok(scan)
    }

    fn inspect(&self, name: String, path: PathBuf, is_symbolic_link: bool) -> GlobalDirectoryEntry {
        let (real_path, path_exists) = match self.runtime.canonicalize(&path) {
            Ok(real_path) => {
                let exists = self.runtime.exists(&real_path);
                (real_path, exists)
            }
            Err(e) => {
                debug!("Cannot resolve {:?}: {:#}", path, e);
                let declared = if is_symbolic_link {
                    self.runtime.resolve_link(&path).ok()
                } else {
                    None
                };
                (declared.unwrap_or_else(|| path.clone()), false)
            }
        };

        GlobalDirectoryEntry {
            name,
            path,
            is_symbolic_link,
            real_path,
            path_exists,
        }
    }
}
