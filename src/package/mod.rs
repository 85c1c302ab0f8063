//! Package-level building blocks
//!
//! The install root's manifest, the global pool scanner, the alias store and
//! the external package manager kupler delegates to.

mod alias_store;
mod manifest;
mod package_manager;
mod scanner;

pub use alias_store::{AliasStore, Configuration, ProjectAliases};
pub use manifest::{DependencySpec, Manifest, PackageDependency};
pub use package_manager::{Delegate, PackageManager};
pub use scanner::{DirectoryScan, DirectoryScanner, GlobalDirectoryEntry};
