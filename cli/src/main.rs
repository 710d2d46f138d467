//! Tally CLI
//!
//! Command-line driver for the tally ledger and accumulator.
//!
//! # Usage
//!
//! ```bash
//! # Run the mint-and-spend ledger walkthrough
//! tally demo
//!
//! # Run the commutative checksum walkthrough
//! tally checksum-demo
//!
//! # Generate a keypair and print the public point
//! tally keygen
//! ```

use clap::{Parser, Subcommand};

mod commands;
mod logging;

use commands::{ChecksumDemoCommand, DemoCommand, KeygenCommand};

/// Tally ledger driver
#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Receipt-chain ledger and commutative checksum demos", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint-and-spend ledger walkthrough
    Demo(DemoCommand),

    /// Commutative checksum walkthrough
    ChecksumDemo(ChecksumDemoCommand),

    /// Generate a keypair and print the public point
    Keygen(KeygenCommand),

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Demo(cmd) => cmd.execute(),
        Commands::ChecksumDemo(cmd) => cmd.execute(),
        Commands::Keygen(cmd) => cmd.execute(),
        Commands::Version => {
            println!("tally {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
