use anyhow::Result;

use crate::application::LinkEngine;
use crate::runtime::Runtime;

use super::config::Config;
use super::{APP_NAME, split_alias, success_message};

/// Publish an installed module to the global pool
#[tracing::instrument(skip(runtime, config))]
pub fn link<R: Runtime>(
    runtime: R,
    module: Option<&str>,
    args: &[String],
    config: Config,
) -> Result<()> {
    let (alias, args) = split_alias(args);
    if reject_alias("link", module, alias) {
        return Ok(());
    }

    let ctx = config.context(&runtime)?;
    let outcome = LinkEngine::new(&runtime, &ctx).link(module, &args)?;

    println!("{}", success_message("linked", "use", "use", &outcome.module));
    Ok(())
}

/// Withdraw a module from the global pool
#[tracing::instrument(skip(runtime, config))]
pub fn unlink<R: Runtime>(
    runtime: R,
    module: Option<&str>,
    args: &[String],
    config: Config,
) -> Result<()> {
    let (alias, args) = split_alias(args);
    if reject_alias("unlink", module, alias) {
        return Ok(());
    }

    let ctx = config.context(&runtime)?;
    let outcome = LinkEngine::new(&runtime, &ctx).unlink(module, &args)?;

    println!(
        "{}",
        success_message("unlinked", "unuse", "unuse", &outcome.module)
    );
    Ok(())
}

/// Publishing never takes an alias; point the user at `use` instead.
fn reject_alias(command: &str, module: Option<&str>, alias: Option<&str>) -> bool {
    let Some(alias) = alias else {
        return false;
    };
    eprintln!(
        "Alias {} is not valid for command `{}`, did you mean to run: `{} use {} {}`?",
        alias,
        command,
        APP_NAME,
        module.unwrap_or("<module>"),
        alias
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_root;

    fn config() -> Config {
        Config {
            install_root: test_root(),
            global_dir: Some("/opt/global".into()),
            config_file: test_root().join("conf.json"),
        }
    }

    #[test]
    fn test_link_with_alias_is_rejected_before_touching_anything() {
        // No expectations: any runtime call would panic
        let runtime = MockRuntime::new();
        link(
            runtime,
            Some("react16"),
            &["react".to_string()],
            config(),
        )
        .unwrap();

        let runtime = MockRuntime::new();
        unlink(runtime, Some("react16"), &["react".to_string()], config()).unwrap();
    }

    #[test]
    fn test_link_without_module_fails() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));
        runtime.expect_exists().returning(|_| false);

        let err = link(runtime, None, &[], config()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot `link` using package name of undefined."
        );
    }

    #[test]
    fn test_reject_alias_only_with_alias() {
        assert!(!reject_alias("link", Some("react16"), None));
        assert!(reject_alias("link", Some("react16"), Some("react")));
    }
}
