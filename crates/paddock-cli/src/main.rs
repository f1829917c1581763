//! # paddock — minimal Linux container manager
//!
//! A single binary acting as both the interactive supervisor and, when
//! re-executed with the `init` argument, the in-container init that
//! performs the sandbox setup before handing control to the payload.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod menu;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use paddock_common::config::ManagerConfig;
use paddock_runtime::manager::Manager;

/// Paddock — minimal Linux container manager.
#[derive(Parser, Debug)]
#[command(name = "paddock", version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute; none starts the interactive manager.
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to an optional JSON configuration file.
    #[arg(long, global = true, default_value = "paddock.json")]
    config: PathBuf,

    /// Directory holding the per-container staging dirs.
    #[arg(long, global = true)]
    work_root: Option<PathBuf>,

    /// Prebuilt base rootfs copied into each new container.
    #[arg(long, global = true)]
    base_rootfs: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// In-container init entry used by the re-exec handoff.
    #[command(hide = true)]
    Init,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Some(Command::Init) = cli.command {
        run_init();
    }

    let mut config = ManagerConfig::load(&cli.config).map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(work_root) = cli.work_root {
        config.work_root = work_root;
    }
    if let Some(base_rootfs) = cli.base_rootfs {
        config.base_rootfs = base_rootfs;
    }

    menu::run(Manager::new(config))
}

/// Runs the in-container setup and execs the payload.
///
/// Never returns: either the process image is replaced by the payload
/// or the process exits non-zero with a diagnostic for the parent.
fn run_init() -> ! {
    let result = paddock_core::init::InitConfig::from_env()
        .and_then(|config| paddock_core::init::run(&config));
    match result {
        Err(e) => {
            eprintln!("Container init error: {e}");
            std::process::exit(1);
        }
        Ok(never) => match never {},
    }
}
