use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use uupconv_core::backend::{CommandMediaCreator, DEFAULT_BACKEND};
use uupconv_core::logger::Logger;
use uupconv_core::run::RunOptions;

#[derive(Parser)]
#[command(name = "uupconv")]
#[command(about = "Converts an UUP file set to a usable ISO file", version)]
struct Cli {
    /// <UUP File set path> <Destination ISO file> <Language Code> [Edition]
    #[arg(value_name = "ARGS", num_args = 0..)]
    args: Vec<String>,

    /// Wait for Enter after an error is reported
    #[arg(long)]
    pause_on_error: bool,

    /// Media creation backend to run, looked up on PATH
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_BACKEND)]
    backend: String,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let logger = Arc::new(Logger::stdout());
    let creator = CommandMediaCreator::new(&cli.backend);
    let options = RunOptions {
        pause_on_error: cli.pause_on_error,
    };

    let outcome = uupconv_core::run(&cli.args, &creator, logger, options)?;

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
