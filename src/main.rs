use clap::Parser;
use pocket_ledger::args::{Args, Command};
use pocket_ledger::{commands, Config, ErrorType, IntoResult, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().pocket_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.schema(), init_args.currency())
                .await?
                .print()
        }

        Command::Add(add_args) => commands::add(load_config(home).await?, add_args.clone())
            .await?
            .print(),

        Command::Update(update_args) => {
            commands::update(load_config(home).await?, update_args.clone())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            commands::delete(load_config(home).await?, delete_args.clone())
                .await?
                .print()
        }

        Command::List(list_args) => commands::list(load_config(home).await?, list_args.clone())
            .await?
            .print(),

        Command::Summary => commands::summary(load_config(home).await?)
            .await?
            .print(),
    };
    Ok(())
}

async fn load_config(home: &Path) -> Result<Config> {
    Config::load(home).await.pub_result(ErrorType::Config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
