mod commands;
mod deploy;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Dependency-ordered stack synthesis for the two-tier deployment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize all stacks into an artifact directory
    Synth {
        /// Artifact output directory
        #[arg(short, long, default_value = "out", env = "STRATA_OUT_DIR")]
        out_dir: PathBuf,
    },
    /// Print the resolved stack synthesis order
    Order,
    /// Diff a fresh synthesis against previously written artifacts
    Diff {
        /// Artifact directory of the previous synthesis
        #[arg(short, long, default_value = "out", env = "STRATA_OUT_DIR")]
        out_dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Synth { out_dir } => commands::synth::handle(&out_dir),
        Commands::Order => commands::order::handle(),
        Commands::Diff { out_dir } => commands::diff::handle(&out_dir),
    };

    if let Err(e) = result {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}
