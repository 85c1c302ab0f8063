use anyhow::Result;
use std::path::PathBuf;

use crate::application::LinkEngine;
use crate::runtime::Runtime;

use super::config::Config;
use super::{split_alias, success_message};

/// Consume a published module in the current project
#[tracing::instrument(skip(runtime, config))]
pub fn use_module<R: Runtime>(
    runtime: R,
    module: Option<&str>,
    args: &[String],
    config: Config,
) -> Result<()> {
    let (alias, args) = split_alias(args);
    let project = current_project(&runtime)?;
    let ctx = config.context(&runtime)?;
    let mut store = config.alias_store(&runtime);

    let outcome =
        LinkEngine::new(&runtime, &ctx).use_module(&mut store, &project, module, alias, &args)?;

    println!("{}", success_message("used", "unuse", "unuse", &outcome.module));
    Ok(())
}

/// Stop consuming a module in the current project
#[tracing::instrument(skip(runtime, config))]
pub fn unuse<R: Runtime>(
    runtime: R,
    module: Option<&str>,
    args: &[String],
    config: Config,
) -> Result<()> {
    let (alias, args) = split_alias(args);
    let project = current_project(&runtime)?;
    let ctx = config.context(&runtime)?;
    let mut store = config.alias_store(&runtime);

    let outcome =
        LinkEngine::new(&runtime, &ctx).unuse(&mut store, &project, module, alias, &args)?;

    println!("{}", success_message("unused", "use", "reuse", &outcome.module));
    Ok(())
}

/// Alias records are keyed by the canonical working directory.
fn current_project<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let cwd = runtime.current_dir()?;
    Ok(runtime.canonicalize(&cwd).unwrap_or(cwd))
}
