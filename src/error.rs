/// タイマー表示で発生するエラー。
///
/// `MissingCredential`以外は利用側で「データなし」「経過時間不明」として扱われる。
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("Toggl API token is not configured")]
    MissingCredential,

    #[error("Application manager was not provided before start")]
    NotBooted,

    #[error("Failed to fetch current time entry: {source:#}")]
    Fetch {
        #[source]
        source: anyhow::Error,
    },

    #[error("Malformed start timestamp: '{input}'")]
    Parse { input: String },
}
