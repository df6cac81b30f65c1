//! CLI module for Contentgraph.
//!
//! Subcommands:
//! - `paper`: Create a paper from a JSON payload
//! - `contribution`: Add a contribution to an existing paper

mod create;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Contentgraph - research knowledge graph content creation
#[derive(Parser)]
#[command(name = "contentgraph")]
#[command(about = "Create papers and contributions in a research knowledge graph")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Graph snapshot to load (JSON). A seeded empty graph is used when absent.
    #[arg(long, global = true)]
    pub graph: Option<PathBuf>,

    /// Write the resulting graph back to the snapshot file
    #[arg(long, global = true)]
    pub save: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a paper with its authors, publication info and contents
    Paper {
        /// Path to a JSON create-paper payload
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Add a contribution to an existing paper
    Contribution {
        /// Path to a JSON create-contribution payload
        #[arg(short, long)]
        input: PathBuf,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match &self.command {
            Command::Paper { input } => self.run_paper(input).await,
            Command::Contribution { input } => self.run_contribution(input).await,
        }
    }
}
