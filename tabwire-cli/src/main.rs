mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show tabwire info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("tabwire", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Info { path, schema } => {
            commands::info::run(path, schema.as_deref(), &cli.global)
        }
        Command::Verify {
            path,
            schema,
            identifier,
            max_depth,
            max_tables,
            strict,
            relaxed,
        } => commands::verify::run(
            path,
            &commands::verify::VerifyOptions {
                schema: schema.as_deref(),
                identifier: identifier.as_deref(),
                max_depth: *max_depth,
                max_tables: *max_tables,
                strict: *strict,
                relaxed: *relaxed,
            },
            &cli.global,
        ),
        Command::Dump { path, schema } => commands::dump::run(path, schema),
    }
}
