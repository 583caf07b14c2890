mod commands;

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

use focusmode_core::{FocusConfig, SessionOutcome, SessionPlan};

#[derive(Parser, Debug)]
#[command(name = "focusmode", version)]
#[command(about = "FocusMode - Kill distractions and enter deep work.", long_about = None)]
struct Cli {
    /// Focus session duration in minutes
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    duration: Option<u32>,

    /// Apps to block (e.g. chrome discord steam)
    #[arg(long, num_args = 1..)]
    block: Vec<String>,

    /// Enable strict mode: can't exit early
    #[arg(long)]
    strict: bool,

    /// Log focus sessions to the history file
    #[arg(long)]
    log_history: bool,

    /// Websites to block (e.g. youtube.com reddit.com)
    #[arg(long, num_args = 0..)]
    websites: Vec<String>,

    /// Show weekly focus summary
    #[arg(long)]
    summary: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    /// The session to run, or a usage error when required flags are missing
    fn session_plan(&self) -> Result<SessionPlan, clap::Error> {
        match self.duration {
            Some(duration) if !self.block.is_empty() => {
                Ok(SessionPlan::new(duration, &self.block, self.websites.clone())
                    .strict(self.strict)
                    .log_history(self.log_history))
            }
            _ => Err(Self::command().error(
                ErrorKind::MissingRequiredArgument,
                "Please provide --duration and --block for a focus session or use --summary.",
            )),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = FocusConfig::load(cli.config.as_deref())?;

    if cli.summary {
        return commands::summary::show_weekly_summary(&config);
    }

    let plan = match cli.session_plan() {
        Ok(plan) => plan,
        Err(e) => e.exit(),
    };

    match commands::session::run_session(&config, &plan).await? {
        SessionOutcome::Completed(report) => {
            commands::session::print_end_summary(&report);
            Ok(())
        }
        SessionOutcome::Interrupted { elapsed_secs, .. } => {
            println!();
            println!("Focus session interrupted after {elapsed_secs}s.");
            std::process::exit(1);
        }
    }
}
