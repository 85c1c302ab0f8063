//! Link engine - publishes modules to the global pool and consumes them in projects.
//!
//! - `link` / `unlink` move a module between `NotPublished` and `Published`.
//!   Alias installs (`"react16": "npm:react@16.14.1"`) are linked by hand,
//!   because the package manager's own `link` would point the global entry at
//!   the alias target instead of the locally pinned copy.
//! - `use` / `unuse` move a `(project, module)` pair between `Unused` and
//!   `Used`. Consuming under a different name is done by hand and remembered
//!   in the alias store; consuming under the module's own name is delegated.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use log::{debug, info, warn};

use crate::error::LinkError;
use crate::package::{AliasStore, Delegate, DirectoryScanner};
use crate::runtime::{Runtime, module_path};

use super::context::LinkContext;
use super::state::{PublishState, UseState};

/// How a link operation was carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkMethod {
    /// kupler created or removed `link` itself; `target` is what it points to.
    Manual { link: PathBuf, target: PathBuf },
    /// The package manager did the work.
    Delegated,
}

/// Successful result of `link`, `unlink`, `use` or `unuse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub module: String,
    /// Local name used in the project, when different handling applied.
    pub alias: Option<String>,
    pub method: LinkMethod,
}

impl LinkOutcome {
    fn manual(module: &str, alias: Option<String>, link: PathBuf, target: PathBuf) -> Self {
        Self {
            module: module.to_string(),
            alias,
            method: LinkMethod::Manual { link, target },
        }
    }

    fn delegated(module: &str) -> Self {
        Self {
            module: module.to_string(),
            alias: None,
            method: LinkMethod::Delegated,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.method, LinkMethod::Manual { .. })
    }
}

fn require_module<'m>(command: &'static str, module: Option<&'m str>) -> Result<&'m str, LinkError> {
    module
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(LinkError::ModuleUndefined { command })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct LinkEngine<'a, R: Runtime> {
    runtime: &'a R,
    ctx: &'a LinkContext,
    scanner: DirectoryScanner<'a, R>,
    delegate: Delegate<'a, R>,
}

impl<'a, R: Runtime> LinkEngine<'a, R> {
    pub fn new(runtime: &'a R, ctx: &'a LinkContext) -> Self {
        Self {
            runtime,
            ctx,
            scanner: DirectoryScanner::new(runtime),
            delegate: Delegate::new(runtime, ctx.package_manager),
        }
    }

    // ============== Global pool ==============

    /// Publish an installed module to the global pool.
    #[tracing::instrument(skip(self))]
    pub fn link(&self, module: Option<&str>, args: &[String]) -> Result<LinkOutcome, LinkError> {
        let module = require_module("link", module)?;
        let source = self.installed_source(module)?;

        if self.ctx.manifest.is_alias_install(module) {
            let link = self.ctx.global_path(module);
            debug!("{} is an alias install, linking by hand", module);
            self.create_symlink(&source, &link)?;
            info!("Linked {:?} -> {:?}", link, source);
            return Ok(LinkOutcome::manual(module, None, link, source));
        }

        self.delegate.run("link", args, &source)?;
        Ok(LinkOutcome::delegated(module))
    }

    /// Withdraw a module from the global pool.
    #[tracing::instrument(skip(self))]
    pub fn unlink(&self, module: Option<&str>, args: &[String]) -> Result<LinkOutcome, LinkError> {
        let module = require_module("unlink", module)?;
        let source = self.installed_source(module)?;

        if self.ctx.manifest.is_alias_install(module) {
            let link = self.ctx.global_path(module);
            self.remove_symlink(&link)?;
            info!("Unlinked {:?}", link);
            return Ok(LinkOutcome::manual(module, None, link, source));
        }

        self.delegate.run("unlink", args, &source)?;
        Ok(LinkOutcome::delegated(module))
    }

    /// Fresh classification of `module` in the global pool.
    pub fn publish_state(&self, module: &str) -> Result<PublishState, LinkError> {
        let scan = self.scanner.scan(&self.ctx.global_dir)?;
        Ok(match scan.get(module) {
            Some(entry) if entry.is_linked(&self.ctx.install_root, &self.ctx.manifest) => {
                PublishState::Published {
                    real_path: entry.real_path.clone(),
                }
            }
            _ => PublishState::NotPublished,
        })
    }

    // ============== Projects ==============

    /// Whether `project` consumes `module`, by alias record or by a link to the published copy.
    pub fn use_state(&self, store: &AliasStore<'_, R>, project: &Path, module: &str) -> UseState {
        if let Some(alias) = store.get(project, module) {
            return UseState::Used {
                alias: Some(alias.to_string()),
            };
        }

        let local = module_path(&project.join("node_modules"), module);
        if let Ok(published) = self.runtime.canonicalize(&self.ctx.global_path(module))
            && self.points_to(&local, &published)
        {
            return UseState::Used { alias: None };
        }

        UseState::Unused
    }

    /// Consume a published module in `project`, optionally under `alias`.
    ///
    /// An explicit alias wins over a remembered one; without either the
    /// package manager links the module under its own name. When re-aliasing,
    /// the previous alias link is removed only after the new link and its
    /// record are in place.
    #[tracing::instrument(skip(self, store))]
    pub fn use_module(
        &self,
        store: &mut AliasStore<'_, R>,
        project: &Path,
        module: Option<&str>,
        alias: Option<&str>,
        args: &[String],
    ) -> Result<LinkOutcome, LinkError> {
        let module = require_module("use", module)?;
        self.guard_not_install_root("use", project)?;
        let target = self.guard_published("use", module)?;

        let current = self.use_state(store, project, module);
        let Some(alias) = non_empty(alias).or_else(|| current.alias().map(str::to_string)) else {
            self.delegate_in_project("link", module, args, project)?;
            return Ok(LinkOutcome::delegated(module));
        };

        // New link and record first; the old alias link goes only once both exist
        let link = module_path(&project.join("node_modules"), &alias);
        let created = if self.points_to(&link, &target) {
            debug!("{:?} already points to {:?}", link, target);
            false
        } else {
            self.create_symlink(&target, &link)?;
            true
        };

        if let Err(e) = store.set(project, module, &alias) {
            if created && let Err(undo) = self.remove_symlink(&link) {
                warn!("Failed to roll back {:?}: {}", link, undo);
            }
            return Err(e.into());
        }

        if let Some(previous) = current.alias()
            && previous != alias
        {
            self.remove_stale_alias(project, previous, &target);
        }

        info!("Using {} as {} in {:?}", module, alias, project);
        Ok(LinkOutcome::manual(module, Some(alias), link, target))
    }

    /// Stop consuming `module` in `project`, undoing whatever `use` did.
    ///
    /// Only a link that resolves to the published module is removed; anything
    /// else at the alias path is an error and the record is kept.
    #[tracing::instrument(skip(self, store))]
    pub fn unuse(
        &self,
        store: &mut AliasStore<'_, R>,
        project: &Path,
        module: Option<&str>,
        alias: Option<&str>,
        args: &[String],
    ) -> Result<LinkOutcome, LinkError> {
        let module = require_module("unuse", module)?;
        self.guard_not_install_root("unuse", project)?;
        let target = self.guard_published("unuse", module)?;

        // The stored alias is what `use` created, so it wins over the argument
        let explicit = non_empty(alias);
        let stored = store.get(project, module).map(str::to_string);
        if let (Some(stored), Some(explicit)) = (&stored, &explicit)
            && stored != explicit
        {
            warn!(
                "{} is used as {} in {:?}, ignoring alias {}",
                module, stored, project, explicit
            );
        }
        let Some(alias) = stored.or(explicit) else {
            self.delegate_in_project("unlink", module, args, project)?;
            return Ok(LinkOutcome::delegated(module));
        };

        let link = module_path(&project.join("node_modules"), &alias);
        if self.points_to(&link, &target) {
            self.remove_symlink(&link)?;
        } else if self.runtime.is_symlink(&link) || self.runtime.exists(&link) {
            return Err(LinkError::filesystem(
                "remove symlink",
                link,
                anyhow!("path does not link to the published {}", module),
            ));
        } else {
            warn!("{:?} is already gone, dropping the alias record only", link);
        }
        store.remove(project, module)?;

        info!("Stopped using {} as {} in {:?}", module, alias, project);
        Ok(LinkOutcome::manual(module, Some(alias), link, target))
    }

    // ============== Guards & helpers ==============

    fn installed_source(&self, module: &str) -> Result<PathBuf, LinkError> {
        if !self.ctx.is_installed(self.runtime, module) {
            if self.ctx.manifest.declares(module) {
                warn!(
                    "package.json includes `{}` but is not installed in node_modules.",
                    module
                );
            }
            return Err(LinkError::ModuleNotInstalled {
                module: module.to_string(),
            });
        }
        Ok(self.ctx.installed_path(module))
    }

    fn guard_not_install_root(&self, command: &'static str, project: &Path) -> Result<(), LinkError> {
        let project = self
            .runtime
            .canonicalize(project)
            .unwrap_or_else(|_| project.to_path_buf());
        if project == self.ctx.install_root {
            return Err(LinkError::SelfOperationProhibited { command });
        }
        Ok(())
    }

    fn guard_published(&self, command: &'static str, module: &str) -> Result<PathBuf, LinkError> {
        match self.publish_state(module)? {
            PublishState::Published { real_path } => Ok(real_path),
            PublishState::NotPublished => Err(LinkError::NotLinked {
                command,
                module: module.to_string(),
            }),
        }
    }

    fn delegate_in_project(
        &self,
        subcommand: &str,
        module: &str,
        args: &[String],
        project: &Path,
    ) -> Result<(), LinkError> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(module.to_string());
        argv.extend(args.iter().cloned());
        self.delegate.run(subcommand, &argv, project)
    }

    fn points_to(&self, link: &Path, target: &Path) -> bool {
        self.runtime.is_symlink(link)
            && self
                .runtime
                .canonicalize(link)
                .is_ok_and(|resolved| resolved == target)
    }

    fn remove_stale_alias(&self, project: &Path, alias: &str, target: &Path) {
        let link = module_path(&project.join("node_modules"), alias);
        if self.points_to(&link, target) {
            match self.remove_symlink(&link) {
                Ok(()) => debug!("Removed previous alias link {:?}", link),
                Err(e) => warn!("Failed to remove previous alias link {:?}: {}", link, e),
            }
        }
    }

    fn create_symlink(&self, target: &Path, link: &Path) -> Result<(), LinkError> {
        if let Some(parent) = link.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime
                .create_dir_all(parent)
                .map_err(|e| LinkError::filesystem("create directory", parent, e))?;
        }
        self.runtime
            .symlink(target, link)
            .map_err(|e| LinkError::filesystem("create symlink", link, e))
    }

    fn remove_symlink(&self, link: &Path) -> Result<(), LinkError> {
        if !self.runtime.is_symlink(link) {
            return Err(LinkError::filesystem(
                "remove symlink",
                link,
                anyhow!("no symlink exists at this path"),
            ));
        }
        self.runtime
            .remove_symlink(link)
            .map_err(|e| LinkError::filesystem("remove symlink", link, e))
    }
}
