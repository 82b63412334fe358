mod config;
mod consumer;
mod engine;
mod error;
mod indicator;
mod model;
mod publisher;
mod summary;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use consumer::ConsumerOptions;
use publisher::Publisher;
use publisher::json_lines::StdoutPublisher;
use publisher::log::LogPublisher;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("input error")]
    Input,
}

#[derive(Parser)]
#[command(
    name = "momentum-indicators",
    about = "Momentum indicator analysis over price batches"
)]
struct Cli {
    /// Path to the TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Newline-delimited JSON price batches ("-" for stdin); overrides input.source
    #[arg(short, long)]
    input: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => config::load(Path::new(path)).change_context(AppError::Config)?,
        None => AppConfig::default(),
    };
    if let Some(input) = cli.input {
        config.input.source = input;
    }

    init_tracing(&config);

    info!(
        source = %config.input.source,
        sink = %config.output.sink,
        concurrency = config.worker.concurrency,
        "starting momentum indicator analysis service"
    );

    let publisher = build_publisher(&config);
    let reader = consumer::open_source(&config.input.source)
        .await
        .change_context(AppError::Input)?;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl+c received, shutting down");
            ctrl_c_cancel.cancel();
        }
    });

    let options = ConsumerOptions {
        channel_capacity: config.input.channel_capacity,
        concurrency: config.worker.concurrency,
        include_series: config.output.include_series,
    };
    consumer::run(reader, options, publisher, cancel)
        .await
        .change_context(AppError::Input)?;

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn build_publisher(config: &AppConfig) -> Arc<dyn Publisher> {
    match config.output.sink.as_str() {
        "log" => Arc::new(LogPublisher),
        _ => Arc::new(StdoutPublisher::stdout()),
    }
}
