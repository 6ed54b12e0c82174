//! Canal CLI
//!
//! Command-line tools for Canal packet files.
//!
//! # Commands
//!
//! - `encode` - Encode JSON-lines change events into a framed packet file
//! - `inspect` - Display the packets and entries in a framed packet file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Canal packet encoding tools.
#[derive(Parser)]
#[command(name = "canal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode change events into a framed packet file
    Encode {
        /// JSON-lines input file, `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output packet file
        #[arg(short, long)]
        output: PathBuf,

        /// Rows per packet
        #[arg(short, long, default_value_t = canal_codec::DEFAULT_MAX_BATCH_SIZE)]
        max_batch_size: usize,
    },

    /// Display the contents of a framed packet file
    Inspect {
        /// Packet file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            input,
            output,
            max_batch_size,
        } => {
            let summary = commands::encode::run(&input, &output, max_batch_size)?;
            println!(
                "Wrote {} packets ({} rows, {} DDLs, {} checkpoints skipped)",
                summary.packets, summary.rows, summary.ddls, summary.checkpoints
            );
        }
        Commands::Inspect { input, format } => {
            commands::inspect::run(&input, &format)?;
        }
        Commands::Version => {
            println!("Canal CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Packet version {}", canal_proto::PACKET_VERSION);
        }
    }

    Ok(())
}
