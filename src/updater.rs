//! 実行中のタイマーを画面に表示し続けるウィジェット本体。

use log::{debug, info, warn};

use crate::display::{format_timer, LOADING, NO_NETWORK};
use crate::error::TimerError;
use crate::host::{AppManager, Clock, ErrorPrompt, Label, Network, Screen};
use crate::timer_record::TimerRecord;
use crate::toggl::TogglRepository;

/// ランチャーに表示するアプリ名。
pub const NAME: &str = "Toggl";

/// ホストが自動でこのアプリに切り替えてよいかどうか。
pub const CAN_BE_AUTO_SWITCHED: bool = true;

/// APIから再取得するまでの間隔(秒)。
pub const FETCH_INTERVAL_SECS: i64 = 600;

/// Toggl APIから実行中のタイマーを取得し、経過時間を画面に表示する。
///
/// ホストは`on_boot`、`on_start`、`on_running_foreground`、`on_stop`の順に直列で呼び出す。
pub struct TimerDisplayUpdater<R, M, N, C, S>
where
    R: TogglRepository,
    M: AppManager,
    N: Network,
    C: Clock,
    S: Screen,
{
    repository: R,
    network: N,
    clock: C,
    screen: S,
    app_manager: Option<M>,
    label: Option<S::Label>,
    api_token: String,
    cache: Option<TimerRecord>,
    last_fetch: i64,
    fetch_interval: i64,
}

impl<R, M, N, C, S> TimerDisplayUpdater<R, M, N, C, S>
where
    R: TogglRepository,
    M: AppManager,
    N: Network,
    C: Clock,
    S: Screen,
{
    /// 新しい`TimerDisplayUpdater`を返す。
    pub fn new(repository: R, network: N, clock: C, screen: S) -> Self {
        Self {
            repository,
            network,
            clock,
            screen,
            app_manager: None,
            label: None,
            api_token: String::new(),
            cache: None,
            last_fetch: 0,
            fetch_interval: FETCH_INTERVAL_SECS,
        }
    }

    /// APIから再取得するまでの間隔(秒)を変更する。
    pub fn with_fetch_interval(mut self, secs: i64) -> Self {
        self.fetch_interval = secs;
        self
    }

    pub fn app_manager(&self) -> Option<&M> {
        self.app_manager.as_ref()
    }

    /// アプリケーションマネージャを保持する。
    pub fn on_boot(&mut self, app_manager: M) {
        self.app_manager = Some(app_manager);
    }

    /// トークンを読み込み、ラベルを作成して最初の取得を行う。
    ///
    /// トークンが設定されていない場合はエラーダイアログを表示してアプリを終了し、
    /// `TimerError::MissingCredential`を返す。この場合ラベルは作成しない。
    pub async fn on_start(&mut self) -> Result<(), TimerError> {
        self.load_config()?;

        let mut label = self.screen.create_label();
        label.center();
        label.set_text(LOADING);
        self.label = Some(label);
        self.screen.load();

        self.update_label().await;
        Ok(())
    }

    /// 前回の取得から`fetch_interval`秒を超えていればAPIから再取得し、
    /// そうでなければキャッシュから経過時間のみを更新する。
    pub async fn on_running_foreground(&mut self) {
        let now = self.clock.now();
        if now - self.last_fetch > self.fetch_interval {
            self.update_label().await;
        } else {
            self.refresh_running_time();
        }
    }

    /// 画面を破棄する。
    pub fn on_stop(&mut self) {
        self.screen.clean();
        self.label = None;
    }

    fn load_config(&mut self) -> Result<(), TimerError> {
        let app_manager = self.app_manager.as_mut().ok_or(TimerError::NotBooted)?;
        let token = app_manager.config().toggl_api.trim().to_string();
        if token.is_empty() {
            warn!("Toggl API token is not configured");
            app_manager.error(&ErrorPrompt {
                title: "Toggl Token Missing".to_string(),
                message: "Configure your Toggl API token in settings.".to_string(),
                confirm: "OK".to_string(),
                cancel: None,
            });
            app_manager.exit();
            return Err(TimerError::MissingCredential);
        }

        self.api_token = token;
        Ok(())
    }

    /// APIから取得し、キャッシュとラベルを更新する。
    async fn update_label(&mut self) {
        if !self.network.is_connected().await {
            info!("Network is not connected");
            self.set_text(NO_NETWORK);
            return;
        }

        let timer = self.fetch_timer().await;
        self.cache = timer;
        self.last_fetch = self.clock.now();
        let text = format_timer(self.cache.as_ref(), Some(self.last_fetch));
        self.set_text(&text);
    }

    /// APIから取得する。失敗した場合は`None`として扱う。
    async fn fetch_timer(&self) -> Option<TimerRecord> {
        let result = self
            .repository
            .read_current_time_entry(&self.api_token)
            .await
            .map_err(|source| TimerError::Fetch { source });
        match result {
            Ok(timer) => timer,
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    /// キャッシュから経過時間を再計算する。キャッシュがない場合は何もしない。
    fn refresh_running_time(&mut self) {
        if self.cache.is_none() {
            debug!("No cached timer, skip refresh");
            return;
        }
        let text = format_timer(self.cache.as_ref(), Some(self.clock.now()));
        self.set_text(&text);
    }

    fn set_text(&mut self, text: &str) {
        if let Some(label) = self.label.as_mut() {
            label.set_text(text);
        }
    }
}
