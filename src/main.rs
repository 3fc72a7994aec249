use clap::Parser;
use log::*;
use std::process::ExitCode;

use release_cut::{Args, Result, command};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("release_cut")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = Args::parse();

    if let Err(err) = color_eyre::install() {
        eprintln!("failed to install error reporter: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = initialize_logger(cli_args.debug) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match command::execute(&cli_args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
