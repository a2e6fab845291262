use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tabwire - inspect, verify and dump zero-copy serialized buffers
#[derive(Debug, Parser)]
#[command(name = "tabwire", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display the buffer header and the root table's vtable.
    Info {
        /// Path to the serialized buffer.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Layout metadata (JSON) used to name the root table's fields.
        #[arg(short, long, value_name = "LAYOUT")]
        schema: Option<PathBuf>,
    },

    /// Verify a buffer, structurally or against layout metadata.
    Verify {
        /// Path to the serialized buffer.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Layout metadata (JSON) to verify every field against.
        #[arg(short, long, value_name = "LAYOUT")]
        schema: Option<PathBuf>,

        /// Require this 4-character file identifier.
        #[arg(long, value_name = "IDENT")]
        identifier: Option<String>,

        /// Maximum table nesting depth.
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Maximum number of tables visited.
        #[arg(long, value_name = "N")]
        max_tables: Option<usize>,

        /// Start from the strict budget for small untrusted messages.
        #[arg(long, conflicts_with = "relaxed")]
        strict: bool,

        /// Start from the relaxed budget and skip alignment checks.
        #[arg(long)]
        relaxed: bool,
    },

    /// Render a buffer as JSON using layout metadata.
    Dump {
        /// Path to the serialized buffer.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Layout metadata (JSON) describing the buffer.
        #[arg(short, long, value_name = "LAYOUT")]
        schema: PathBuf,
    },
}
