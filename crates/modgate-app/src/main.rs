//! Modgate - content moderation step for GitHub workflows.
//!
//! Reads its inputs from the `INPUT_*` variables the runner sets, classifies
//! the text, hides flagged content and fails the step when it is flagged.

use std::process::ExitCode;

use clap::Parser;
use modgate_app::inputs::Args;
use modgate_app::pipeline::{run_action, Verdict};
use modgate_app::runner;
use tracing_subscriber::EnvFilter;

fn init_logging(args: &Args) {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "modgate={0},modgate_app={0},modgate_core={0},modgate_github={0},warn",
            log_level
        ))
    });

    // The runner timestamps every line already.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stdout)
        .init();
}

async fn run(args: Args) -> anyhow::Result<Verdict> {
    let config = args.into_config()?;
    tracing::debug!("Event source: {:?}", config.github.event);

    let mut outputs = runner::output_sink(config.output_file.clone());
    Ok(run_action(config, outputs.as_mut()).await?)
}

fn fail(message: &str) -> ExitCode {
    tracing::error!("{}", message);
    println!("{}", runner::error_command(message));
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(args).await {
        Ok(Verdict::Appropriate) => ExitCode::SUCCESS,
        Ok(Verdict::Flagged { message, .. }) => fail(&message),
        Err(e) => fail(&e.to_string()),
    }
}
