use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// APIトークンを上書きする環境変数。
pub const TOKEN_ENV: &str = "TOGGL_API_TOKEN";

/// 設定画面の入力フィールド名。
pub const TOKEN_FIELD: &str = "toggl_api";

/// 設定画面で入力された値。
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub toggl_api: String,
}

impl Settings {
    /// JSON文字列から設定を読み込む。
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Failed to parse settings json")
    }

    /// 環境変数`TOGGL_API_TOKEN`が空でなければ、トークンを上書きする。
    fn with_env_override(mut self) -> Self {
        match env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => {
                debug!("{} is set, overriding {}", TOKEN_ENV, TOKEN_FIELD);
                self.toggl_api = token;
            }
            Ok(_) => debug!("{} is empty, keeping {}", TOKEN_ENV, TOKEN_FIELD),
            Err(_) => {}
        }
        self
    }
}

/// 既定の設定ファイルのパスを返す。
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("settings.json"))
}

/// 設定を読み込む。
///
/// ファイルが存在しない場合は空の設定とする。
///
/// # Arguments
///
/// * `path` - 設定ファイルのパス。`None`の場合は既定のパスを利用する
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_settings_path(),
    };

    let settings = match path {
        Some(path) => match fs::read_to_string(&path) {
            Ok(contents) => {
                info!("Settings loaded from {}", path.display());
                Settings::from_json_str(&contents)
                    .with_context(|| format!("Invalid settings file: {}", path.display()))?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("Settings file not found at {}", path.display());
                Settings::default()
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read settings file: {}", path.display()))
            }
        },
        None => Settings::default(),
    };

    Ok(settings.with_env_override())
}

/// ホストの設定画面に渡すフォーム定義を返す。
pub fn settings_form() -> Value {
    json!({
        "form": [{
            "type": "input",
            "default": "",
            "caption": "Toggl API Token",
            "name": TOKEN_FIELD,
            "attributes": {"placeholder": "Toggl Api"},
        }]
    })
}
