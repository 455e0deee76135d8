mod api;
mod cli;
mod config;
mod input;

use clap::Parser;
use colored::*;
use std::io::Write;
use std::process::ExitCode;

use cli::Cli;

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "info,zoho_cli=debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {:<8} | {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dotenv = config::load_dotenv();
    init_logger(cli.global.verbose);
    match dotenv {
        Ok(Some(path)) => log::debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => log::warn!("Failed to load .env: {}", e),
    }

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
