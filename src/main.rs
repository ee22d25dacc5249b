use std::{
    io::stdout,
    path::{Path, PathBuf},
    process::exit,
};

use clap::Parser;
use tracing::{error, info, subscriber, warn};
use tracing_log::LogTracer;
use tracing_subscriber::filter::EnvFilter;

use dyntable::{
    cli::{run_command, Command},
    config::{
        context::build_service,
        schema::{load_config, DynTableConfig, Misc, DEFAULT_CONFIG_PATH},
    },
};

#[derive(Debug, Parser)]
#[clap(name = "dyntable", about = "Define, alter and fill relational tables at runtime")]
struct Args {
    #[clap(short = 'c', long = "config", default_value = DEFAULT_CONFIG_PATH)]
    config_path: PathBuf,

    #[clap(long, help = "Log in JSON format")]
    json_logs: bool,

    #[clap(subcommand)]
    command: Command,
}

fn prepare_tracing(misc: &Misc, json_logs: bool) {
    // Redirect all `log`'s events to our subscriber, to collect the ones from
    // our deps too
    LogTracer::init().expect("Failed to set logger");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&misc.log_level));

    let sub = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter);

    let result = if json_logs || misc.json_logs {
        subscriber::set_global_default(sub.json().finish())
    } else {
        subscriber::set_global_default(sub.compact().finish())
    };
    result.expect("Failed to set the global tracing subscriber");
}

fn read_config(path: &Path) -> Option<DynTableConfig> {
    if !path.exists() {
        return None;
    }

    match load_config(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading the config from {}: {e}", path.display());
            exit(1)
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let loaded = read_config(&args.config_path);
    let config = loaded.clone().unwrap_or_default();
    prepare_tracing(&config.misc, args.json_logs);

    if loaded.is_none() {
        warn!(
            "Config file {} not found, using the default SQLite catalog",
            args.config_path.display()
        );
    }

    info!("Starting dyntable {}", env!("CARGO_PKG_VERSION"));

    let service = match build_service(config).await {
        Ok(service) => service,
        Err(e) => {
            error!("Error setting up the catalog: {e}");
            eprintln!("{e}");
            exit(1)
        }
    };

    if let Err(e) = run_command(&service, args.command, &mut stdout().lock()).await {
        eprintln!("{e}");
        exit(1)
    }
}
