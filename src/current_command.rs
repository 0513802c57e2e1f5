use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::config::Settings;
use crate::display::format_timer;
use crate::error::TimerError;
use crate::host::Clock;
use crate::toggl::TogglRepository;

/// 実行中のタイマーを一度だけ表示するためのサブコマンド。
pub struct CurrentCommand<'a, T: TogglRepository, C: Clock> {
    toggl_client: &'a T,
    clock: &'a C,
}

impl<'a, T: TogglRepository, C: Clock> CurrentCommand<'a, T, C> {
    /// 新しい`CurrentCommand`を返す。
    ///
    /// # Arguments
    /// * `toggl_client` - Toggl APIと通信するためのリポジトリ
    /// * `clock` - 経過時間の計算に利用する時計
    pub fn new(toggl_client: &'a T, clock: &'a C) -> Self {
        Self {
            toggl_client,
            clock,
        }
    }

    /// `current`サブコマンドの処理を行う。
    ///
    /// `watch`と異なり、取得に失敗した場合はエラーを返す。
    pub async fn run<W: Write>(&self, settings: &Settings, writer: &mut W) -> Result<()> {
        let token = settings.toggl_api.trim();
        if token.is_empty() {
            return Err(TimerError::MissingCredential.into());
        }

        let entry = self
            .toggl_client
            .read_current_time_entry(token)
            .await
            .context("Failed to retrieve current time entry")?;
        info!("Current time entry retrieved successfully.");

        writeln!(writer, "{}", format_timer(entry.as_ref(), Some(self.clock.now())))
            .context("Failed to write current time entry")?;

        Ok(())
    }
}
