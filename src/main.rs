use clap::Parser;
use commands::cleanup::Cleanup;
use errors::ReaperError;

mod commands;
mod config;
mod core;
mod errors;
mod github;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "branch-reaper")]
#[command(about = "Delete inactive branches from a GitHub repository", long_about = None)]
struct Cli {
    #[command(flatten)]
    cleanup: Cleanup,
}

fn main() {
    env_logger::init();

    let args = Cli::parse();

    if let Err(e) = args.cleanup.execute() {
        eprintln!("{}", error_message(&e));
        std::process::exit(1);
    }
}

fn error_message(e: &ReaperError) -> String {
    if e.is_configuration() {
        format!("Configuration error: {}\nNothing was queried or deleted.", e)
    } else {
        format!("Error: {}", e)
    }
}
