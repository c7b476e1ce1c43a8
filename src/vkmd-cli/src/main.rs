mod cli;
mod commands;
mod config;

use anyhow::{bail, Result};
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;
use commands::configure::ConfigUpdate;
use commands::SourceOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Configure {
            set_source,
            set_chunk_size,
            set_load_only,
            show,
        }) => {
            let update = ConfigUpdate {
                source: set_source,
                chunk_size: set_chunk_size,
                load_only: set_load_only,
            };
            commands::configure::handle(update, show)?;
        }

        Some(Commands::Segments { source }) => {
            let opts = source_options(&source)?;
            commands::segments::handle(&opts)?;
        }

        None => {
            let (Some(address), Some(length)) = (cli.dump.address, cli.dump.length) else {
                bail!("Both ADDRESS and LENGTH are required");
            };

            let opts = source_options(&cli.source)?;
            commands::dump::handle(
                &opts,
                address,
                length,
                cli.dump.output.as_deref(),
                cli.dump.hash,
            )?;
        }
    }

    Ok(())
}

fn source_options(args: &SourceArgs) -> Result<SourceOptions> {
    let config = Config::load()?;
    Ok(SourceOptions::resolve(
        args.source.clone(),
        args.chunk_size,
        args.load_only(),
        &config,
    ))
}

/// Log to stderr so stdout stays a clean data stream. RUST_LOG wins over -v.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("vkmd={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
