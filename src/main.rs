use clap::Parser;
use eyre::Result;
use std::io;
use std::process;
use tasktrack::{Config, TaskStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    setup_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    debug!(?config, "Resolved config");

    // Open store
    let mut store = TaskStore::open_with_key(config.open_backend()?, config.key.clone());

    cli::execute(&mut store, cli.command, io::stdin().lock(), io::stdout().lock())
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
