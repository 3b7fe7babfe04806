//! dev-template - Scaffold a Python project with its own virtual environment

use anyhow::Result;
use clap::Parser;
use dev_template_core::tui::CreateArgs;
use dev_template_core::{ConfigStore, PackageSpec, ScaffoldError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dev-template")]
#[command(about = "Scaffold a Python project, create its virtual environment and install packages")]
#[command(version)]
pub struct Args {
    /// Edit the saved defaults (packages, project path, manifest files)
    #[arg(short, long)]
    pub config: bool,

    /// Write a debug log to the log directory
    #[arg(short, long)]
    pub debug: bool,

    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory to create the project in
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Packages to install (comma-separated, name or name==version)
    #[arg(long, value_delimiter = ',', value_parser = parse_package)]
    pub packages: Option<Vec<PackageSpec>>,

    /// Accept saved defaults for anything not given (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<&Args> for CreateArgs {
    fn from(args: &Args) -> Self {
        CreateArgs {
            name: args.name.clone(),
            path: args.path.clone(),
            packages: args.packages.clone(),
            yes: args.yes,
        }
    }
}

fn parse_package(input: &str) -> Result<PackageSpec, String> {
    PackageSpec::parse(input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    if let Some(path) = dev_template_core::logging::init(args.debug)? {
        eprintln!("Debug log: {}", path.display());
    }

    let store = ConfigStore::from_env()?;

    let result = if args.config {
        dev_template_core::tui::configure(&store)
    } else {
        dev_template_core::run(&store, CreateArgs::from(&args))
            .await
            .map(|_| ())
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        // Already reported by the prompts; only the exit code is left
        Err(e) if e.downcast_ref::<ScaffoldError>().is_some() => {
            log::debug!("Exiting after pipeline failure: {:#}", e);
            std::process::exit(1);
        }
        other => other,
    }
}
