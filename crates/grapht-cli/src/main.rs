use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use grapht::{
    assemble_files, compare_files, flatten_file, load_config, unflatten_file, write_json,
    AssembleInputs,
};
use grapht_core::Comparison;

#[derive(Parser)]
#[command(name = "grapht")]
#[command(about = "Validate, default, flatten and compare JSON parameter trees", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Assembler configuration file (TOML)
    #[arg(short, long, global = true, env = "GRAPHT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate user parameters and fill in defaults
    Assemble {
        /// Schema of required parameters
        #[arg(short, long)]
        required: Option<PathBuf>,

        /// Schema of optional parameters
        #[arg(short = 'p', long)]
        optional: Option<PathBuf>,

        /// Default parameter values
        #[arg(short = 'D', long)]
        defaults: Option<PathBuf>,

        /// User parameter values
        #[arg(short, long)]
        user: Option<PathBuf>,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Flatten a tree into (path, (key, value)) leaf records
    Flatten {
        /// Input tree (JSON)
        input: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rebuild a tree from leaf records
    Unflatten {
        /// Input leaf records (JSON)
        input: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the structure of one tree appears in another
    Compare {
        left: PathBuf,
        right: PathBuf,

        /// Also check the right tree against the left one
        #[arg(short, long)]
        symmetric: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Assemble {
            required,
            optional,
            defaults,
            user,
            output,
        } => {
            let inputs = AssembleInputs {
                required,
                optional,
                defaults,
                user,
            };
            let tree = assemble_files(&config, &inputs)?;
            write_json(&tree, output.as_deref())
        }
        Commands::Flatten { input, output } => {
            let records = flatten_file(&input)?;
            write_json(&records, output.as_deref())
        }
        Commands::Unflatten { input, output } => {
            let tree = unflatten_file(&input)?;
            write_json(&tree, output.as_deref())
        }
        Commands::Compare {
            left,
            right,
            symmetric,
        } => match compare_files(&left, &right, symmetric)? {
            Comparison::Equivalent => {
                info!("{} and {} are equivalent", left.display(), right.display());
                Ok(())
            }
            Comparison::Diverged(divergence) => {
                anyhow::bail!(
                    "{} and {} are not equivalent: {}",
                    left.display(),
                    right.display(),
                    divergence
                )
            }
        },
    }
}
