//! ウィジェットを動かすホスト側の機能。
//!
//! 画面、アプリケーションマネージャ、ネットワーク、時計はホストが提供する。
//! ライフサイクルの呼び出しはホストが直列に行う前提とする。

use crate::config::Settings;

/// ホストが表示するエラーダイアログの内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPrompt {
    pub title: String,
    pub message: String,
    pub confirm: String,
    /// キャンセルボタンの文言。`None`の場合は表示しない。
    pub cancel: Option<String>,
}

/// アプリケーションマネージャ。
pub trait AppManager {
    /// 設定画面で入力された値を返す。
    fn config(&self) -> Settings;

    /// エラーダイアログを表示し、確認されるまで待つ。
    fn error(&mut self, prompt: &ErrorPrompt);

    /// アプリケーションを終了する。
    fn exit(&mut self);
}

/// ネットワーク接続の確認。
#[allow(async_fn_in_trait)]
pub trait Network {
    async fn is_connected(&self) -> bool;
}

/// epoch秒を返す時計。
pub trait Clock {
    fn now(&self) -> i64;
}

/// テキストを表示するラベル。
pub trait Label {
    fn set_text(&mut self, text: &str);

    /// ラベルを画面中央に配置する。
    fn center(&mut self);
}

/// ラベルを配置する画面。
pub trait Screen {
    type Label: Label;

    fn create_label(&mut self) -> Self::Label;

    /// 画面を表示対象にする。
    fn load(&mut self);

    /// 画面上のオブジェクトを全て破棄する。
    fn clean(&mut self);
}
