use clap::Parser;
use thumbned::args::Args;
use thumbned::prompt::TerminalPrompter;
use thumbned::workflow::{Outcome, ThreadRandom, Workflow};
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(Outcome::Aborted) => {
            println!("Aborted.");
        }
        Ok(Outcome::Thumbned(_)) => {}
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<Outcome> {
    let args = Args::parse();
    init_logging(args.log_level());

    let media = args.media_tool();
    media.ensure_available()?;

    let mut prompter = TerminalPrompter::stdio();
    let mut random = ThreadRandom;

    Workflow::new(&mut prompter, &media, &mut random, args.workflow_config()).run()
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
