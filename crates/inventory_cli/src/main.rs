//! Console inventory manager.
//!
//! # Responsibility
//! - Parse command-line options and start file logging.
//! - Open the inventory database, run the menu, and close the store on exit.

mod menu;

use anyhow::Context;
use clap::Parser;
use inventory_core::{default_log_level, init_logging, open_inventory};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "inventory", version, about = "Console inventory manager backed by SQLite")]
struct Cli {
    /// SQLite database file; created when missing.
    #[arg(long, default_value = "inventory.db")]
    db: PathBuf,

    /// trace|debug|info|warn|error (defaults by build mode).
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for rotated log files (defaults to `./logs`).
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    /// Absolute log directory; relative values are resolved against `cwd`.
    fn resolved_log_dir(&self, cwd: &Path) -> PathBuf {
        match &self.log_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.join("logs"),
        }
    }

    fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("failed to resolve the working directory")?;
    let log_dir = cli.resolved_log_dir(&cwd);
    init_logging(cli.log_level(), &log_dir).context("failed to initialize logging")?;

    let mut inventory = open_inventory(&cli.db)
        .with_context(|| format!("failed to open inventory at `{}`", cli.db.display()))?;

    let stdin = io::stdin();
    let mut output = BufWriter::new(io::stdout());
    menu::run(&mut inventory, stdin.lock(), &mut output)?;
    drop(output);

    inventory.close().context("failed to close inventory")?;
    Ok(())
}
