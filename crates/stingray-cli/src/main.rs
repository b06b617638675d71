//! Command-line extractor for Stingray game archives.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{Level, info};

use stingray_archive::{ArchiveDirectory, ExplicitPath, GameLocator};
use stingray_extract::template::default_template;
use stingray_extract::{
    CommandTranscoder, NullTranscoder, ResolvedConfig, Transcoder, default_registry,
    run_extraction, select,
};
use stingray_hash::NameTable;

#[derive(Parser)]
#[command(
    name = "stingray",
    about = "Extractor for Stingray engine archive files",
    version,
    author,
    long_about = "Scans a Stingray game installation, selects files by glob pattern \
and per-type configuration, and extracts or converts them into an output tree."
)]
struct Cli {
    /// Game installation root (must contain settings.ini and data/)
    #[arg(short, long, env = "STINGRAY_GAME_DIR")]
    game_dir: PathBuf,

    /// Output directory root
    #[arg(short, long, default_value = "extract")]
    output: PathBuf,

    /// Include glob, repeatable; empty means everything
    #[arg(short, long = "include")]
    include: Vec<String>,

    /// Exclude glob, repeatable
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// Extractor configuration string, e.g. "texture:format=source enable:raw"
    #[arg(short, long, default_value = "")]
    config: String,

    /// Extra wordlist file mapping hashes back to names, repeatable
    #[arg(long = "names")]
    names: Vec<PathBuf>,

    /// External transcoder command for codecs without a built-in decoder
    #[arg(long)]
    transcoder: Option<String>,

    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    // Install, config and directory failures are fatal; per-file
    // extraction failures are logged by the run loop and only counted.
    let Some(root) = ExplicitPath(cli.game_dir.clone()).locate() else {
        bail!(
            "{} is not a Stingray installation (no settings.ini)",
            cli.game_dir.display()
        );
    };

    let template = default_template();
    let config = ResolvedConfig::parse(&cli.config, &template)
        .context("invalid extractor configuration")?;

    let mut names = NameTable::new();
    for ty in template.type_names() {
        names.insert(ty);
    }
    for path in &cli.names {
        let count = names
            .load_wordlist_file(path)
            .with_context(|| format!("failed to read wordlist {}", path.display()))?;
        info!("loaded {count} names from {}", path.display());
    }

    let dir = ArchiveDirectory::load(&root, &mut |done, total| {
        if done == total {
            info!("scanned {done} archive segments");
        }
    })
    .context("failed to open the archive directory")?;
    info!("directory lists {} files", dir.len());

    let working_set = select(
        &cli.include,
        &cli.exclude,
        &template,
        &config,
        &names,
        &dir,
    )?;
    if working_set.is_empty() {
        info!("nothing matched the given patterns and configuration");
        return Ok(());
    }

    let transcoder: Box<dyn Transcoder> = match cli.transcoder {
        Some(program) => Box::new(CommandTranscoder::new(program)),
        None => Box::new(NullTranscoder),
    };
    let registry = default_registry();

    let report = run_extraction(
        &working_set,
        &dir,
        &names,
        &registry,
        &template,
        &config,
        transcoder.as_ref(),
        &cli.output,
    )?;

    println!(
        "extracted {}/{} files to {}",
        report.succeeded,
        report.selected,
        cli.output.display()
    );
    Ok(())
}
