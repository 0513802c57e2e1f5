use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod config;
mod console;
mod current_command;
mod datetime;
mod display;
mod error;
mod host;
mod logger;
mod terminal_host;
mod timer_record;
mod toggl;
mod updater;
mod watch_command;

use current_command::CurrentCommand;
use datetime::SystemClock;
use toggl::TogglClient;
use watch_command::{watch_command, WatchArgs};

/// 実行中のToggl timerを表示するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- watch
/// $ cargo run -- current
/// $ cargo run -- settings
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        short = 'c',
        long = "config",
        global = true,
        parse(from_os_str),
        help = "Path to the settings json file"
    )]
    config: Option<PathBuf>,

    #[clap(
        short = 'v',
        long = "verbose",
        global = true,
        parse(from_occurrences),
        help = "Increase log verbosity"
    )]
    verbose: u64,

    #[clap(long = "log-file", global = true, parse(from_os_str), help = "Also write logs to this file")]
    log_file: Option<PathBuf>,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Keep showing the running timer in the terminal
    Watch(WatchArgs),
    /// Print the running timer once
    Current,
    /// Print the settings form definition
    Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logger::setup_logger(
        logger::level_from_verbosity(args.verbose),
        args.log_file.as_deref(),
    )?;

    match args.subcommand {
        SubCommands::Watch(watch) => {
            let settings = config::load_settings(args.config.as_deref())?;
            watch_command(watch, settings).await?
        }
        SubCommands::Current => {
            let settings = config::load_settings(args.config.as_deref())?;
            let client = TogglClient::new();
            CurrentCommand::new(&client, &SystemClock)
                .run(&settings, &mut io::stdout())
                .await?
        }
        SubCommands::Settings => {
            let form = serde_json::to_string_pretty(&config::settings_form())
                .context("Failed to serialize settings form")?;
            println!("{}", form);
        }
    }

    Ok(())
}
