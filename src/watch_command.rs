use std::{io, time::Duration};

use anyhow::{Context, Result};
use log::info;
use tokio::{signal, time::interval};

use crate::config::Settings;
use crate::console::ConsoleScreen;
use crate::datetime::SystemClock;
use crate::terminal_host::{TcpNetwork, TerminalAppManager};
use crate::toggl::TogglClient;
use crate::updater::{TimerDisplayUpdater, CAN_BE_AUTO_SWITCHED, FETCH_INTERVAL_SECS, NAME};

/// ターミナルを画面としてタイマーを表示し続けるためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct WatchArgs {
    #[clap(
        short = 'i',
        long = "interval",
        default_value_t = 1,
        help = "Seconds between screen refreshes"
    )]
    interval: u64,

    #[clap(
        long = "fetch-interval",
        default_value_t = FETCH_INTERVAL_SECS,
        help = "Seconds after which the current time entry is fetched again"
    )]
    fetch_interval: i64,

    #[clap(
        short = 'w',
        long = "width",
        default_value_t = 32,
        help = "Screen width used to center the label"
    )]
    width: usize,

    #[clap(long = "no-clear", help = "Do not clear the terminal before redrawing")]
    no_clear: bool,
}

/// `watch`サブコマンドの処理を行う。
///
/// 起動後は`interval`秒ごとに表示を更新し、Ctrl-Cで終了する。
///
/// # Arguments
///
/// * `args` - `watch`サブコマンドの引数
/// * `settings` - 読み込み済みの設定
pub async fn watch_command(args: WatchArgs, settings: Settings) -> Result<()> {
    let screen = ConsoleScreen::new(io::stdout(), args.width, !args.no_clear);
    let mut updater = TimerDisplayUpdater::new(
        TogglClient::new(),
        TcpNetwork::default(),
        SystemClock,
        screen,
    )
    .with_fetch_interval(args.fetch_interval);

    updater.on_boot(TerminalAppManager::new(settings, io::stderr()));
    info!("Starting {} (auto switch: {})", NAME, CAN_BE_AUTO_SWITCHED);
    if let Err(err) = updater.on_start().await {
        if updater
            .app_manager()
            .map_or(false, TerminalAppManager::exit_requested)
        {
            info!("{} exited by application manager", NAME);
        }
        return Err(err).context("Failed to start timer display");
    }

    let mut ticker = interval(Duration::from_secs(args.interval.max(1)));
    // 最初のtickは即座に完了するため読み捨てる
    ticker.tick().await;
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => updater.on_running_foreground().await,
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Stopping {}", NAME);
                break;
            }
        }
    }

    updater.on_stop();
    Ok(())
}
