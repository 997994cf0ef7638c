use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod schedule_cmd;
mod state;

use schedule_cmd::ScheduleArgs;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("FOCUSPLAN_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "focusplan",
    version,
    long_version = LONG_VERSION,
    about = "Auto-schedule pending tasks into free working time"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place pending tasks and print the updates/inserts to persist
    Schedule(ScheduleArgs),

    /// Show the order tasks would be handed out in (priority + dependencies)
    Queue {
        /// JSON array of task rows
        #[arg(long)]
        tasks: PathBuf,

        /// Include tasks that already have a start and end time
        #[arg(long, default_value_t = false)]
        allow_reshuffle: bool,
    },

    /// Show the free working intervals for one day
    FreeSlots {
        /// Day to inspect (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// JSON array of task rows; placed ones count as busy
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// JSON array of calendar event rows
        #[arg(long)]
        events: Option<PathBuf>,

        /// Settings row (defaults from config.toml)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Manage ~/.focusplan/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cfg.log.filter.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Schedule(args) => {
            schedule_cmd::schedule(args, &cfg)?;
        }

        Command::Queue {
            tasks,
            allow_reshuffle,
        } => {
            schedule_cmd::queue(&tasks, allow_reshuffle, &cfg)?;
        }

        Command::FreeSlots {
            date,
            tasks,
            events,
            settings,
        } => {
            schedule_cmd::free_slots(
                &date,
                tasks.as_deref(),
                events.as_deref(),
                settings.as_deref(),
                &cfg,
            )?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}
