//! ターミナル上でウィジェットを動かすためのホスト実装。

use std::{io::Write, time::Duration};

use log::{debug, error, info};
use tokio::{net::TcpStream, time::timeout};

use crate::config::Settings;
use crate::host::{AppManager, ErrorPrompt, Network};

/// 読み込み済みの設定を返し、エラーダイアログをwriterに出力するアプリケーションマネージャ。
pub struct TerminalAppManager<W: Write> {
    settings: Settings,
    writer: W,
    exit_requested: bool,
}

impl<W: Write> TerminalAppManager<W> {
    pub fn new(settings: Settings, writer: W) -> Self {
        Self {
            settings,
            writer,
            exit_requested: false,
        }
    }

    /// `exit`が呼ばれたかどうか。
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

impl<W: Write> AppManager for TerminalAppManager<W> {
    fn config(&self) -> Settings {
        self.settings.clone()
    }

    // 対話的な確認はせず、表示した時点で確認されたものとする。
    fn error(&mut self, prompt: &ErrorPrompt) {
        error!("{}: {}", prompt.title, prompt.message);
        let buttons = match &prompt.cancel {
            Some(cancel) => format!("[{}] [{}]", prompt.confirm, cancel),
            None => format!("[{}]", prompt.confirm),
        };
        let result = writeln!(self.writer, "{}\n{}\n{}", prompt.title, prompt.message, buttons);
        if let Err(err) = result {
            debug!("Failed to write error prompt: {}", err);
        }
    }

    fn exit(&mut self) {
        info!("Exit requested");
        self.exit_requested = true;
    }
}

/// APIのホストにTCP接続できるかどうかでネットワークの状態を判定する。
pub struct TcpNetwork {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl TcpNetwork {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            connect_timeout: Duration::from_secs(3),
        }
    }
}

impl Default for TcpNetwork {
    fn default() -> Self {
        Self::new("api.track.toggl.com", 443)
    }
}

impl Network for TcpNetwork {
    async fn is_connected(&self) -> bool {
        let address = (self.host.as_str(), self.port);
        match timeout(self.connect_timeout, TcpStream::connect(address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(err)) => {
                debug!("Failed to connect to {}:{}: {}", self.host, self.port, err);
                false
            }
            Err(_) => {
                debug!("Connection to {}:{} timed out", self.host, self.port);
                false
            }
        }
    }
}
