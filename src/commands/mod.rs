//! Presentation layer: one function per CLI command, printing results for humans.

pub mod config;
mod consume;
mod link;
mod passthrough;
mod paths;
mod status;

pub use config::Config;
pub use consume::{unuse, use_module};
pub use link::{link, unlink};
pub use passthrough::{install, open, path, prefix, upgrade};
pub use paths::{config_file, default_install_root};
pub use status::status;

pub(crate) const APP_NAME: &str = "kupler";

/// Split trailing arguments into the first positional (an alias) and the rest.
pub(crate) fn split_alias(args: &[String]) -> (Option<&str>, Vec<String>) {
    match args.iter().position(|a| !a.starts_with('-')) {
        Some(index) => {
            let rest = args
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, a)| a.clone())
                .collect();
            (Some(args[index].as_str()), rest)
        }
        None => (None, args.to_vec()),
    }
}

pub(crate) fn success_message(done: &str, next: &str, purpose: &str, module: &str) -> String {
    format!(
        "success {} \"{}\"\ninfo you can now run `{} {} \"{}\"` in projects you wish to {} this resource with.",
        done, module, APP_NAME, next, module, purpose
    )
}
