//! The two independent state machines kupler tracks.
//!
//! Global pool, per module:  `NotPublished --link--> Published --unlink--> NotPublished`
//!
//! Per project and module:   `Unused --use--> Used --unuse--> Unused`
//!
//! `use` is only allowed while the module is `Published`.

use std::path::PathBuf;

/// Whether a module is currently published to the global pool by kupler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    NotPublished,
    /// `real_path` is where the global entry resolves inside the install root.
    Published { real_path: PathBuf },
}

impl PublishState {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishState::Published { .. })
    }
}

/// Whether a project currently consumes a published module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseState {
    Unused,
    /// `alias` is `None` when the module is linked under its own name.
    Used { alias: Option<String> },
}

impl UseState {
    pub fn is_used(&self) -> bool {
        matches!(self, UseState::Used { .. })
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            UseState::Used { alias } => alias.as_deref(),
            UseState::Unused => None,
        }
    }
}
