//! Reconciled view of the manifest against the global pool.

use std::path::PathBuf;

use anyhow::Result;

use crate::package::DirectoryScanner;
use crate::runtime::Runtime;

use super::context::LinkContext;

/// Which names a status report iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusScope {
    /// Dependencies declared in the install root's manifest.
    #[default]
    DeclaredOnly,
    /// Every entry in the global pool.
    AllGlobal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub name: String,
    /// Only filled in for [`StatusScope::AllGlobal`].
    pub real_path: Option<PathBuf>,
    pub is_symbolic_link: bool,
    pub is_linked: bool,
    pub is_missing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub installed: usize,
    pub linked: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub rows: Vec<StatusRow>,
    pub counts: StatusCounts,
}

/// Read-only: never touches the configuration or the filesystem beyond scanning.
pub struct StatusReporter<'a, R: Runtime> {
    ctx: &'a LinkContext,
    scanner: DirectoryScanner<'a, R>,
}

impl<'a, R: Runtime> StatusReporter<'a, R> {
    pub fn new(runtime: &'a R, ctx: &'a LinkContext) -> Self {
        Self {
            ctx,
            scanner: DirectoryScanner::new(runtime),
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn report(&self, scope: StatusScope) -> Result<StatusReport> {
        let root = &self.ctx.install_root;
        let manifest = &self.ctx.manifest;
        let scan = self.scanner.scan(&self.ctx.global_dir)?;

        let names: Vec<String> = match scope {
            StatusScope::DeclaredOnly => manifest.names().map(str::to_string).collect(),
            StatusScope::AllGlobal => scan.names().to_vec(),
        };

        let mut report = StatusReport::default();
        for name in names {
            let entry = scan.get(&name);
            let is_linked = entry.is_some_and(|e| e.is_linked(root, manifest));
            let is_missing = entry.is_some_and(|e| e.is_missing(root, manifest));

            if manifest.declares(&name) {
                report.counts.installed += 1;
            }
            if is_linked {
                report.counts.linked += 1;
            }
            if is_missing {
                report.counts.missing += 1;
            }

            report.rows.push(StatusRow {
                real_path: match scope {
                    StatusScope::AllGlobal => entry.map(|e| e.real_path.clone()),
                    StatusScope::DeclaredOnly => None,
                },
                is_symbolic_link: entry.is_some_and(|e| e.is_symbolic_link),
                is_linked,
                is_missing,
                name,
            });
        }

        Ok(report)
    }
}
