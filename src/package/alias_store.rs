//! Durable per-project alias decisions (`~/.kupler/conf.json`).
//!
//! The file is loaded once per invocation and rewritten in full after every
//! mutation. There is no lock and no atomic replace, so two concurrent
//! invocations race and the last writer wins.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// moduleName -> aliasName for one project.
pub type ProjectAliases = IndexMap<String, String>;

/// Contents of the configuration file.
///
/// Keys other than `links` and `showStack` are kept as-is and written back.
/// Projects and modules keep the order they were first recorded in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    #[serde(default)]
    pub links: IndexMap<PathBuf, ProjectAliases>,

    #[serde(
        rename = "showStack",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub show_stack: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

pub struct AliasStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
    config: Configuration,
}

impl<'a, R: Runtime> AliasStore<'a, R> {
    /// Load the store from `path`.
    ///
    /// A missing or unparsable file yields an empty configuration; the next
    /// write replaces it with a valid one.
    #[tracing::instrument(skip(runtime))]
    pub fn load(runtime: &'a R, path: PathBuf) -> Self {
        let config = match runtime.read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Configuration>(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring unreadable configuration {:?}: {}", path, e);
                    Configuration::default()
                }
            },
            Err(e) => {
                debug!("No configuration at {:?}: {:#}", path, e);
                Configuration::default()
            }
        };

        Self {
            runtime,
            path,
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn show_stack(&self) -> bool {
        self.config.show_stack
    }

    pub fn get(&self, project: &Path, module: &str) -> Option<&str> {
        self.config
            .links
            .get(project)
            .and_then(|aliases| aliases.get(module))
            .map(String::as_str)
    }

    pub fn aliases(&self, project: &Path) -> Option<&ProjectAliases> {
        self.config.links.get(project)
    }

    /// Record `alias` for `(project, module)`. A failed save leaves the
    /// in-memory records as they were.
    pub fn set(&mut self, project: &Path, module: &str, alias: &str) -> Result<()> {
        let previous = self
            .config
            .links
            .entry(project.to_path_buf())
            .or_default()
            .insert(module.to_string(), alias.to_string());

        if let Err(e) = self.save() {
            if let Some(aliases) = self.config.links.get_mut(project) {
                match previous {
                    Some(previous) => {
                        aliases.insert(module.to_string(), previous);
                    }
                    None => {
                        aliases.shift_remove(module);
                        if aliases.is_empty() {
                            self.config.links.shift_remove(project);
                        }
                    }
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Drop the record for `(project, module)`; a project left with no
    /// aliases is removed entirely. Returns the alias that was stored.
    pub fn remove(&mut self, project: &Path, module: &str) -> Result<Option<String>> {
        let removed = match self.config.links.get_mut(project) {
            Some(aliases) => {
                let removed = aliases.shift_remove(module);
                if aliases.is_empty() {
                    self.config.links.shift_remove(project);
                }
                removed
            }
            None => None,
        };
        self.save()?;
        Ok(removed)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.config)?;
        self.runtime
            .write(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to save configuration to {:?}", self.path))?;
        debug!("Saved configuration to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn conf_path() -> PathBuf {
        PathBuf::from("/home/user/.kupler/conf.json")
    }

    #[test]
    fn test_load_absent_file_is_empty() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read_to_string().returning(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "not found").into())
        });

        let store = AliasStore::load(&runtime, conf_path());
        assert_eq!(store.config(), &Configuration::default());
        assert!(store.get(Path::new("/work/app"), "react").is_none());
    }

    #[test]
    fn test_corrupt_file_recovers_and_next_set_writes_valid_json() {
        let mut runtime = MockRuntime::new();
        let written = Arc::new(Mutex::new(String::new()));
        let written_clone = written.clone();

        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{ this is not json".to_string()));
        runtime.expect_exists().returning(|_| true);
        runtime.expect_write().times(1).returning(move |_, contents| {
            *written_clone.lock().unwrap() = String::from_utf8(contents.to_vec()).unwrap();
            Ok(())
        });

        let mut store = AliasStore::load(&runtime, conf_path());
        assert!(store.config().links.is_empty());

        store.set(Path::new("/work/app"), "react16", "react").unwrap();

        let saved: serde_json::Value = serde_json::from_str(&written.lock().unwrap()).unwrap();
        assert_eq!(saved["links"]["/work/app"]["react16"], "react");
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let mut runtime = MockRuntime::new();
        let written = Arc::new(Mutex::new(String::new()));
        let written_clone = written.clone();

        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"{"theme": "dark", "showStack": true, "links": {"/work/app": {"vue2": "vue"}}}"#
                .to_string())
        });
        runtime.expect_exists().returning(|_| true);
        runtime.expect_write().returning(move |_, contents| {
            *written_clone.lock().unwrap() = String::from_utf8(contents.to_vec()).unwrap();
            Ok(())
        });

        let mut store = AliasStore::load(&runtime, conf_path());
        assert!(store.show_stack());
        assert_eq!(store.get(Path::new("/work/app"), "vue2"), Some("vue"));

        store.set(Path::new("/work/other"), "react16", "react").unwrap();

        let saved: serde_json::Value = serde_json::from_str(&written.lock().unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["showStack"], true);
        assert_eq!(saved["links"]["/work/app"]["vue2"], "vue");
        assert_eq!(saved["links"]["/work/other"]["react16"], "react");
    }

    #[test]
    fn test_set_creates_config_directory() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read_to_string().returning(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "not found").into())
        });
        runtime
            .expect_exists()
            .with(mockall::predicate::eq(PathBuf::from("/home/user/.kupler")))
            .returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(mockall::predicate::eq(PathBuf::from("/home/user/.kupler")))
            .times(1)
            .returning(|_| Ok(()));
        runtime.expect_write().times(1).returning(|_, _| Ok(()));

        let mut store = AliasStore::load(&runtime, conf_path());
        store.set(Path::new("/work/app"), "react16", "react").unwrap();
    }

    #[test]
    fn test_failed_save_keeps_previous_records() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"{"links": {"/work/app": {"react16": "p-old"}}}"#.to_string())
        });
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("read-only file system")));

        let mut store = AliasStore::load(&runtime, conf_path());
        let app = Path::new("/work/app");

        assert!(store.set(app, "react16", "p-new").is_err());
        assert_eq!(store.get(app, "react16"), Some("p-old"));

        assert!(store.set(app, "vue2", "vue").is_err());
        assert_eq!(store.get(app, "vue2"), None);

        assert!(store.set(Path::new("/work/other"), "vue2", "vue").is_err());
        assert!(store.aliases(Path::new("/work/other")).is_none());
    }

    #[test]
    fn test_set_overwrites_and_remove_prunes_project() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let path = dir.path().join(".kupler/conf.json");
        let project = Path::new("/work/app");

        let mut store = AliasStore::load(&runtime, path.clone());
        store.set(project, "react16", "react-old").unwrap();
        store.set(project, "react16", "react").unwrap();
        assert_eq!(store.get(project, "react16"), Some("react"));

        // Durable across loads
        let reloaded = AliasStore::load(&runtime, path.clone());
        assert_eq!(reloaded.get(project, "react16"), Some("react"));

        let mut store = reloaded;
        assert_eq!(store.remove(project, "react16").unwrap(), Some("react".to_string()));
        assert!(store.aliases(project).is_none());
        assert_eq!(store.remove(project, "react16").unwrap(), None);

        let reloaded = AliasStore::load(&runtime, path);
        assert!(reloaded.config().links.is_empty());
    }

    #[test]
    fn test_rewrite_keeps_project_order() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let path = dir.path().join(".kupler/conf.json");

        let mut store = AliasStore::load(&runtime, path.clone());
        store.set(Path::new("/work/zeta"), "react16", "react").unwrap();
        store.set(Path::new("/work/alpha"), "vue2", "vue").unwrap();
        store.set(Path::new("/work/zeta"), "lodash4", "lodash").unwrap();
        store.remove(Path::new("/work/zeta"), "react16").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let zeta = content.find("/work/zeta").unwrap();
        let alpha = content.find("/work/alpha").unwrap();
        assert!(zeta < alpha, "projects re-sorted: {}", content);

        let reloaded = AliasStore::load(&runtime, path);
        let projects: Vec<_> = reloaded.config().links.keys().cloned().collect();
        assert_eq!(
            projects,
            vec![PathBuf::from("/work/zeta"), PathBuf::from("/work/alpha")]
        );
    }
}
