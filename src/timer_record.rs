use serde::Deserialize;

/// 実行中のタイムエントリー。
///
/// `description`がない場合はタイマーが動いていないものとして扱う。
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TimerRecord {
    #[serde(default)]
    pub description: Option<String>,
    /// 例: `2024-06-18T06:29:23+00:00`
    #[serde(default)]
    pub start: Option<String>,
}
