mod commands;
mod config;
mod storage;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(name = "blobpack", about = "Chunk files into versioned, length-prefixed blob containers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk every file under the input directory and write manifest + containers
    Pack {
        /// Directory to walk for input files
        #[arg(long)]
        input: Option<String>,

        /// Directory containers are written into
        #[arg(long)]
        output: Option<String>,

        /// Manifest file path
        #[arg(long)]
        manifest: Option<String>,

        /// Nominal chunk size in bytes
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Write one combined container (optionally naming it) instead of one per file
        #[arg(long, num_args = 0..=1, default_missing_value = blobpack_core::constants::DEFAULT_COMBINED_NAME)]
        combined: Option<String>,
    },

    /// Print the blobs recorded in a manifest
    Inspect {
        /// Manifest file path
        #[arg(long)]
        manifest: Option<String>,
    },

    /// Rebuild the original files from containers and their manifest
    Unpack {
        /// Destination directory for rebuilt files
        dest: String,

        /// Manifest file path
        #[arg(long)]
        manifest: Option<String>,

        /// Directory holding the containers
        #[arg(long)]
        output: Option<String>,

        /// Name of the combined container, if the run used one
        #[arg(long, num_args = 0..=1, default_missing_value = blobpack_core::constants::DEFAULT_COMBINED_NAME)]
        combined: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file first so a RUST_LOG set there reaches the filter.
    let dotenv = dotenvy::dotenv();

    // Initialize tracing (controlled by RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal if missing.
    if let Err(e) = dotenv {
        tracing::debug!("no .env file loaded: {e}");
    }

    let cli = Cli::parse();
    let base = Config::from_env();

    let result = match cli.command {
        Commands::Pack {
            input,
            output,
            manifest,
            chunk_size,
            combined,
        } => {
            let config = base.with_overrides(input, output, manifest, chunk_size, combined);
            commands::pack::run_pack(&config).await
        }
        Commands::Inspect { manifest } => {
            let config = base.with_overrides(None, None, manifest, None, None);
            commands::inspect::run_inspect(&config).await
        }
        Commands::Unpack {
            dest,
            manifest,
            output,
            combined,
        } => {
            let config = base.with_overrides(None, output, manifest, None, combined);
            commands::unpack::run_unpack(&config, &dest).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
