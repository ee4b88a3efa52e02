//! Command-line interface definitions for contentgen

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the contentgen application
#[derive(Parser)]
#[command(name = "contentgen")]
#[command(version)]
#[command(about = "Build a section/page tree from a CMS export", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for contentgen
#[derive(Subcommand)]
pub enum Commands {
    /// Generate collections and documents and write the site manifest
    Generate {
        /// Site root containing site.toml (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Export file to read instead of the one configured in site.toml
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Manifest output path
        #[arg(short, long, default_value = "manifest.yaml")]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check the export for missing fields, dangling references and loops
    Validate {
        /// Site root containing site.toml (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Export file to read instead of the one configured in site.toml
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Show detailed validation results
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the generated section tree
    Tree {
        /// Site root containing site.toml (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Export file to read instead of the one configured in site.toml
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
}
