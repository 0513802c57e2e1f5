use crate::datetime::{elapsed_str, parse_start_time};
use crate::timer_record::TimerRecord;

pub const NO_TIMER: &str = "No timer running.";
pub const NO_DESCRIPTION: &str = "(No Description)";
pub const NO_START: &str = "--:--:--";
pub const NO_NETWORK: &str = "No network.";
pub const LOADING: &str = "Loading Toggl...";

/// ラベルに表示する文字列を作成する。
///
/// `description`がない場合は開始時刻があってもタイマー停止中として扱う。
///
/// # Arguments
///
/// * `record` - 実行中のタイムエントリー
/// * `now` - 現在時刻のepoch秒
pub fn format_timer(record: Option<&TimerRecord>, now: Option<i64>) -> String {
    let record = match record {
        Some(record) if record.description.is_some() => record,
        _ => return NO_TIMER.to_string(),
    };

    let description = record
        .description
        .as_deref()
        .filter(|description| !description.is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let elapsed = match record.start.as_deref() {
        Some(start) if !start.is_empty() => elapsed_str(parse_start_time(start), now),
        _ => NO_START.to_string(),
    };

    format!("{}\nRunning: {}", description, elapsed)
}
