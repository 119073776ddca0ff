// src/main.rs
use std::process::ExitCode;

use clap::Parser;

use vault_cli::app;
use vault_cli::types::Cli;
use vault_cli::ui::Ui;
use vault_cli::utils::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.debug, cli.global.log_file.as_deref()) {
        eprintln!("Failed to open log file: {e}");
        return ExitCode::FAILURE;
    }

    let ui = Ui::terminal(Ui::color_enabled(cli.global.no_color));
    match app::execute(cli, &ui).await {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
