//! quire entry point.
//!
//! ```bash
//! quire list collections
//! quire --workspace team history
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use quire_cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var); stdout is for command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let output = quire_cli::run(&cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
