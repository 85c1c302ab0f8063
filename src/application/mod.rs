//! Application layer - the link engine and the status reporter.
//!
//! Both work against a [`LinkContext`] resolved once per invocation and share
//! the directory scanner and alias store, but never call each other.

mod context;
mod link;
mod state;
mod status;

pub use context::LinkContext;
pub use link::{LinkEngine, LinkMethod, LinkOutcome};
pub use state::{PublishState, UseState};
pub use status::{StatusCounts, StatusReport, StatusReporter, StatusRow, StatusScope};
