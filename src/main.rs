//! Gramgate - Instagram Graph API gateway with local snapshots

use std::process::ExitCode;

use clap::Parser;

mod cache;
mod cli;
mod client;
mod clock;
mod config;
mod context;
mod error;
mod limiter;
mod models;
mod output;
mod query;
mod scheduler;
mod snapshot;

use cli::admit::AdmitRequest;
use cli::args::GlobalOptions;
use cli::{CacheCommands, Cli, Commands};
use error::Result;

/// Exit status when `admit` rejects a request
const EXIT_RATE_LIMITED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging; `--debug` wins over `RUST_LOG`.
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp_secs().init();
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Status => cli::status::run(&opts)?,
        Commands::Version => println!("gramgate version {}", env!("CARGO_PKG_VERSION")),
        Commands::Hashtag { tag, kind, listing } => {
            cli::media::hashtag(&opts, &tag, kind, &listing).await?
        }
        Commands::SelfMedia { listing } => cli::media::self_media(&opts, &listing).await?,
        Commands::Tags { listing } => cli::media::tags(&opts, &listing).await?,
        Commands::Merged { listing } => cli::media::merged(&opts, &listing).await?,
        Commands::Children { media_id, fields } => {
            cli::media::children(&opts, &media_id, fields.as_deref()).await?
        }
        Commands::Refresh {
            collection,
            crawl,
            every,
        } => cli::refresh::run(&opts, collection.into(), &crawl, every).await?,
        Commands::Local { collection, query } => {
            cli::local::run(&opts, collection.into(), &query)?
        }
        Commands::Admit {
            group,
            remote_addr,
            forwarded_for,
            admin_token,
        } => {
            let request = AdmitRequest {
                group: &group,
                remote_addr: &remote_addr,
                forwarded_for: forwarded_for.as_deref(),
                admin_token: admin_token.as_deref(),
            };
            if !cli::admit::run(&opts, &request)? {
                return Ok(ExitCode::from(EXIT_RATE_LIMITED));
            }
        }
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Status => cli::cache::status(&opts)?,
            CacheCommands::Clear => cli::cache::clear(&opts)?,
            CacheCommands::Path => cli::cache::path(&opts)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
