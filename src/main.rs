use astro_inventory::{ScanConfig, ScanEvent, Scanner};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Scan an astrophotography archive and write a CSV inventory.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Root folder of the archive.
    root: PathBuf,

    /// Output CSV file.
    #[arg(short, long, default_value = "inventory.csv")]
    output: PathBuf,

    /// JSON configuration replacing the built-in patterns and tables.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the exiftool executable.
    #[arg(long)]
    exiftool: Option<PathBuf>,

    /// Also scan hidden files and folders.
    #[arg(long)]
    include_hidden: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };

    let mut scanner = Scanner::builder()
        .config(config)
        .maybe_exiftool_path(args.exiftool)
        .include_hidden(args.include_hidden)
        .build();

    let inventory = scanner.run(&args.root, |event| match event {
        ScanEvent::Discovered { total } => info!(total, "files found"),
        ScanEvent::Progress { processed, total } => info!("{processed}/{total} files processed"),
        ScanEvent::Skipped(skipped) => warn!(path = %skipped.path.display(), "{}", skipped.reason),
        ScanEvent::Finished(_) => {}
    })?;

    inventory.write_csv(&args.output)?;
    println!(
        "Wrote {} records to {} ({} skipped)",
        inventory.len(),
        args.output.display(),
        inventory.skipped.len()
    );
    Ok(())
}
