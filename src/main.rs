use clap::Parser;
use kupler::commands::{self, Config, config_file};
use kupler::package::AliasStore;
use kupler::runtime::RealRuntime;
use std::path::PathBuf;
use std::process::ExitCode;

/// kupler - link and alias globally installed node modules
///
/// Keeps its own install root of node modules, publishes them to the package
/// manager's global pool and links them into projects, optionally under a
/// different name.
///
/// Examples:
///   kupler install react16@npm:react@16.14.1
///   kupler link react16
///   kupler use react16 react     # run inside a project
#[derive(Parser, Debug)]
#[command(author, version = env!("KUPLER_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Install root directory (defaults to ~/.kupler; also via KUPLER_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "KUPLER_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub install_root: Option<PathBuf>,

    /// Global module directory (defaults to the package manager's; also via KUPLER_GLOBAL_DIR)
    #[arg(
        long = "global-dir",
        short = 'G',
        env = "KUPLER_GLOBAL_DIR",
        value_name = "PATH",
        global = true
    )]
    pub global_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install modules into the install root
    #[command(visible_alias = "add")]
    Install(ModuleArgs),

    /// Remove modules from the install root
    #[command(visible_alias = "remove")]
    Uninstall(ModuleArgs),

    /// Upgrade the install root's dependencies
    Upgrade(PassthroughArgs),

    /// Publish an installed module to the global pool
    Link(ModuleArgs),

    /// Withdraw a module from the global pool
    Unlink(ModuleArgs),

    /// Link a published module into the current project, optionally as ALIAS
    Use(ModuleArgs),

    /// Remove a module linked with `use` from the current project
    Unuse(ModuleArgs),

    /// Show declared modules and whether they are linked
    #[command(visible_alias = "show")]
    Status(StatusArgs),

    /// Open the global module directory
    Open,

    /// Print the install root
    Path,

    /// Print the npm global prefix
    Prefix,
}

#[derive(clap::Args, Debug)]
pub struct ModuleArgs {
    /// Module name as declared in the install root's package.json
    #[arg(value_name = "MODULE")]
    pub module: Option<String>,

    /// Alias and extra arguments passed to the package manager
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct PassthroughArgs {
    /// Arguments passed to the package manager
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// List every module in the global directory, not only declared ones
    #[arg(short = 'g', long = "global")]
    pub global: bool,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let runtime = RealRuntime;
    let config = Config::new(&runtime, cli.install_root, cli.global_dir)?;

    match cli.command {
        Commands::Install(args) => commands::install(
            runtime,
            "install",
            args.module.as_deref(),
            &args.args,
            config,
        ),
        Commands::Uninstall(args) => commands::install(
            runtime,
            "uninstall",
            args.module.as_deref(),
            &args.args,
            config,
        ),
        Commands::Upgrade(args) => commands::upgrade(runtime, &args.args, config),
        Commands::Link(args) => commands::link(runtime, args.module.as_deref(), &args.args, config),
        Commands::Unlink(args) => {
            commands::unlink(runtime, args.module.as_deref(), &args.args, config)
        }
        Commands::Use(args) => {
            commands::use_module(runtime, args.module.as_deref(), &args.args, config)
        }
        Commands::Unuse(args) => commands::unuse(runtime, args.module.as_deref(), &args.args, config),
        Commands::Status(args) => commands::status(runtime, args.global, config),
        Commands::Open => commands::open(runtime, config),
        Commands::Path => commands::path(config),
        Commands::Prefix => commands::prefix(runtime),
    }
}

/// `showStack` in the configuration file switches on the full cause chain.
fn report_error(err: &anyhow::Error) {
    let runtime = RealRuntime;
    let show_stack = config_file(&runtime)
        .map(|path| AliasStore::load(&runtime, path).show_stack())
        .unwrap_or(false);

    if show_stack {
        eprintln!("error: {:?}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}
