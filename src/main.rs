use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use ysamba_tools::launcher::{
    plan, DryRunner, Flags, Launcher, SystemRunner, ToolError, ToolRunner,
};
use ysamba_tools::{logging, ProjectLayout};

/// Utils for building and running ysamba. Without flags the project is
/// configured, compiled and run.
#[derive(Debug, Parser)]
#[command(name = "ysamba-run", version)]
struct Cli {
    /// Run an already built binary
    #[arg(short, long)]
    run: bool,
    /// Build the project
    #[arg(short, long)]
    make: bool,
    /// Configure and build the project
    #[arg(short, long)]
    build: bool,
    /// Format the C++ sources
    #[arg(short, long)]
    format: bool,
    /// Run static analysis on a file
    #[arg(short, long, value_name = "FILE")]
    check: Option<PathBuf>,
    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,
    /// Layout file (defaults to <root>/ysamba.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn flags(&self) -> Flags {
        Flags {
            build: self.build,
            make: self.make,
            run: self.run,
            format: self.format,
            check: self.check.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:?}");
        let code = err
            .downcast_ref::<ToolError>()
            .map_or(1, ToolError::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = env::current_dir()
        .context("failed to get current directory")?
        .join(&cli.root);
    let layout = ProjectLayout::load(root, cli.config.as_deref())
        .context("failed to load project layout")?;
    debug!("project layout: {layout:?}");

    let steps = plan(&cli.flags());
    let runner: Box<dyn ToolRunner> = if cli.dry_run {
        Box::new(DryRunner)
    } else {
        Box::new(SystemRunner)
    };
    Launcher::new(layout, runner).execute(&steps)
}
