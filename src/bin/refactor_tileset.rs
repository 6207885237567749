//! One-shot migration of `tileset_old.json` to the face-based `tileset.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use ysamba_tools::logging;
use ysamba_tools::migrate::{self, LEGACY_TILESET_FILE, TILESET_FILE};
use ysamba_tools::Tileset;

/// Rewrites a legacy tileset (angle / front_face_id) into the face-based schema.
#[derive(Debug, Parser)]
#[command(name = "refactor-tileset", version)]
struct Cli {
    /// Legacy tileset to read
    #[arg(default_value = LEGACY_TILESET_FILE)]
    input: PathBuf,
    /// Where to write the migrated tileset
    #[arg(default_value = TILESET_FILE)]
    output: PathBuf,
    /// Print the migrated tileset instead of writing it
    #[arg(long)]
    dry_run: bool,
    /// Load the written tileset back the way the game does
    #[arg(long, conflicts_with = "dry_run")]
    verify: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if !cli.dry_run {
        migrate::migrate_file(&cli.input, &cli.output)?;
        if cli.verify {
            verify(&cli.output)?;
        }
        return Ok(());
    }

    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("unable to read {}", cli.input.display()))?;
    let (document, report) = migrate::migrate_str(&source)
        .with_context(|| format!("failed to migrate {}", cli.input.display()))?;
    migrate::log_report(&report);
    print!("{}", migrate::render_document(&document)?);
    Ok(())
}

fn verify(path: &Path) -> Result<()> {
    let tileset = Tileset::from_file(path)?;
    for frame in tileset.frames().filter(|frame| frame.faces.is_empty()) {
        warn!(
            "{} frame for game id {} has no faces",
            frame.frame_type, frame.game_id
        );
    }
    let multi_cell = tileset
        .frames()
        .filter(|frame| frame.multi_cell.is_some())
        .count();
    info!(
        "{} loads as {} frame(s), {} multi-cell",
        path.display(),
        tileset.len(),
        multi_cell
    );
    Ok(())
}
