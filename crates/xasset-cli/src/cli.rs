//! Command line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xasset")]
#[command(version, about = "Export assets from the memory of running games")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which process to read and how to interpret it
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Attach to this process id instead of searching by name
    #[arg(short, long)]
    pub pid: Option<u32>,

    /// Title id or name (e.g. "bo2", "mw"); detected from the process name when omitted
    #[arg(short, long)]
    pub title: Option<String>,
}

/// Which assets to process
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Only process this asset type; may be repeated
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// Only process assets whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(short, long, env = "XASSET_JOBS", default_value_t = 0)]
    pub jobs: usize,
}

#[derive(Subcommand)]
pub enum Command {
    /// List supported titles and the asset types they can export
    Titles,

    /// Locate the asset catalog and print live pool metadata
    Pools {
        #[command(flatten)]
        target: TargetArgs,

        /// Also save a full pool dump as JSON
        #[arg(long)]
        dump: Option<PathBuf>,
    },

    /// Enumerate assets without exporting them
    List {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export assets to disk
    Export {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Output directory
        #[arg(short, long, env = "XASSET_OUTPUT", default_value = "exported_files")]
        output: PathBuf,

        /// Do not write DBAssetPools.json
        #[arg(long)]
        no_pool_report: bool,

        /// Write every export result to this JSON file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Scan the main module for a byte signature
    Scan {
        #[command(flatten)]
        target: TargetArgs,

        /// Signature, e.g. "48 8D 04 40 ?? ?? 4D"
        pattern: String,

        /// Maximum number of matches to print
        #[arg(short = 'n', long, default_value_t = 16)]
        limit: usize,
    },
}
