mod cli;
mod client;
mod commands;

use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use libris_catalog::CachedCatalog;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use client::HttpLibraryApi;
use commands::{Console, StderrNotifier};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve => serve().await,
        _ => {
            init_client_logging();
            run_client(cli).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let settings = libris_kernel::settings::Settings::load()
        .with_context(|| "failed to load Libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    libris_app::run(settings).await
}

fn init_client_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

async fn run_client(cli: Cli) -> anyhow::Result<()> {
    let api = HttpLibraryApi::new(
        &cli.api_url,
        cli.token,
        Duration::from_secs(cli.timeout_secs),
    )?;
    let catalog = CachedCatalog::new(api);

    let stdout = std::io::stdout();
    let mut confirm = prompt_yes_no;
    let mut console = Console {
        out: stdout.lock(),
        notifier: &StderrNotifier,
        confirm: &mut confirm,
    };

    commands::execute(&catalog, cli.command, &mut console).await
}

fn prompt_yes_no(question: &str) -> anyhow::Result<bool> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{question} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
