//! The install root's `package.json`, reduced to its declared dependencies.

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::Path;

use crate::runtime::Runtime;

/// Parsed version specifier of a declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySpec {
    /// A plain range or tag (`^18.2.0`, `latest`, a git url, ...).
    Range(String),
    /// `npm:<package>@<version>`: installed under a local name but
    /// resolving to another published package.
    Alias {
        package: String,
        version: Option<String>,
    },
}

impl DependencySpec {
    pub fn parse(raw: &str) -> Self {
        let Some(target) = raw.strip_prefix("npm:") else {
            return DependencySpec::Range(raw.to_string());
        };

        // Skip a leading '@' so scoped packages keep their scope.
        let split_at = target
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '@')
            .map(|(i, _)| i);

        let (package, version) = match split_at {
            Some(i) => (&target[..i], Some(target[i + 1..].to_string())),
            None => (target, None),
        };

        if package.is_empty() {
            return DependencySpec::Range(raw.to_string());
        }

        DependencySpec::Alias {
            package: package.to_string(),
            version: version.filter(|v| !v.is_empty()),
        }
    }
}

/// A dependency declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDependency {
    pub name: String,
    pub version_spec: String,
    pub spec: DependencySpec,
    /// Computed once from `version_spec` when the manifest is loaded.
    pub is_alias_install: bool,
}

impl PackageDependency {
    pub fn new(name: impl Into<String>, version_spec: impl Into<String>) -> Self {
        let version_spec = version_spec.into();
        let spec = DependencySpec::parse(&version_spec);
        let is_alias_install = matches!(spec, DependencySpec::Alias { .. });
        Self {
            name: name.into(),
            version_spec,
            spec,
            is_alias_install,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawManifest {
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
}

/// Declared dependencies of the install root, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    dependencies: Vec<PackageDependency>,
}

impl Manifest {
    pub fn new(dependencies: Vec<PackageDependency>) -> Self {
        Self { dependencies }
    }

    /// Load `<install_root>/package.json`.
    ///
    /// A missing manifest means nothing is declared yet; a malformed one is an error.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, install_root: &Path) -> Result<Self> {
        let path = install_root.join("package.json");
        if !runtime.exists(&path) {
            debug!("No manifest at {:?}, treating as empty", path);
            return Ok(Self::default());
        }

        let content = runtime.read_to_string(&path)?;
        Self::parse(&content).with_context(|| format!("Failed to parse manifest {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawManifest = serde_json::from_str(content)?;
        let dependencies = raw
            .dependencies
            .into_iter()
            .map(|(name, value)| {
                let spec = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                PackageDependency::new(name, spec)
            })
            .collect();
        Ok(Self { dependencies })
    }

    pub fn dependencies(&self) -> &[PackageDependency] {
        &self.dependencies
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|d| d.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&PackageDependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_alias_install(&self, name: &str) -> bool {
        self.get(name).is_some_and(|d| d.is_alias_install)
    }
}
