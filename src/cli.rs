use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

mod build;
mod emit;
mod inspect;
mod terminal;

use anyhow::Context;
use build::Build;
use clap::ArgAction;
use emit::Emit;
use hfs_tables::{emit::Format, Config, Tables};
use inspect::Inspect;

/// Configuration file picked up from the working directory.
const DEFAULT_CONFIG: &str = "hfs-tables.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file [default: ./hfs-tables.toml if present]
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // stdout may carry emitted tables
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Build tables from a saved copy of the HFS+ decomposition table
    Build(Build),

    /// Emit tables written by `build` in another format
    ///
    /// Provenance recorded by `build` is carried over unchanged.
    Emit(Emit),

    /// Show table statistics and look up single entries
    Inspect(Inspect),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Build(command) => command.run(config)?,
            Self::Emit(command) => command.run(config)?,
            Self::Inspect(command) => command.run()?,
        }
        Ok(())
    }
}

/// Loads the configuration from `path`, or from `hfs-tables.toml` in the
/// working directory, falling back to defaults when neither exists.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).is_file() => Path::new(DEFAULT_CONFIG),
        None => {
            tracing::debug!("No {DEFAULT_CONFIG} found, using default configuration");
            return Ok(Config::default());
        }
    };

    tracing::debug!("Loading configuration from {}", path.display());
    Config::load(path).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}

/// Reads tables written by `build --emit json`.
fn read_tables(path: &Path) -> anyhow::Result<Tables> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    hfs_tables::emit::json::read(io::BufReader::new(file))
        .with_context(|| format!("failed to read tables from {}", path.display()))
}

/// Writes tables to `output`, or to stdout when no path is given.
fn write_tables(
    tables: &Tables,
    format: Format,
    config: &Config,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = output {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        hfs_tables::emit::write(tables, format, config, &mut writer)
            .with_context(|| format!("failed to write {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote {format:?} tables to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        hfs_tables::emit::write(tables, format, config, &mut stdout)?;
        stdout.flush()?;
    }
    Ok(())
}
