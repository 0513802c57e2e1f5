use std::ops::Range;

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use log::debug;

use crate::error::TimerError;
use crate::host::Clock;

/// 経過時間が計算できない場合の表示。
pub const UNKNOWN_ELAPSED: &str = "??:??:??";

#[cfg(not(test))]
/// 現在のUTC時間を取得する。
pub fn now() -> DateTime<Utc> {
    Utc::now()
}


#[cfg(test)]
pub use mock_datetime::now;

/// システム時計からepoch秒を返す`Clock`。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        now().timestamp()
    }
}

/// Toggl APIの開始時刻文字列をepoch秒に変換する。
///
/// `YYYY-MM-DDTHH:MM:SS`を固定位置で切り出し、UTCとして扱う。
/// 以降のタイムゾーン表記は無視する。
/// 各フィールドの範囲は確認せず、`02-30`や`:60`は次の日付や分に繰り上げる。
/// 短すぎる、数値でない場合は`None`を返す。
///
/// # Arguments
///
/// * `start` - 例: `2024-06-18T06:29:23+00:00`
pub fn parse_start_time(start: &str) -> Option<i64> {
    match try_parse_start_time(start) {
        Ok(epoch) => Some(epoch),
        Err(err) => {
            debug!("{}", err);
            None
        }
    }
}

fn try_parse_start_time(start: &str) -> Result<i64, TimerError> {
    let invalid = || TimerError::Parse {
        input: start.to_string(),
    };
    let field = |range: Range<usize>| -> Result<u32, TimerError> {
        start
            .get(range)
            .and_then(|digits| digits.parse::<u32>().ok())
            .ok_or_else(invalid)
    };

    let year = field(0..4)?;
    let month = field(5..7)?;
    let day = field(8..10)?;
    let hour = field(11..13)?;
    let minute = field(14..16)?;
    let second = field(17..19)?;

    // 1月1日0時を起点に各フィールドを加算し、範囲外の値は繰り上げる。
    // 4桁なのでi32に収まる
    let new_year = NaiveDate::from_ymd_opt(year as i32, 1, 1).ok_or_else(invalid)?;
    let date = match month {
        0 => new_year.checked_sub_months(Months::new(1)),
        _ => new_year.checked_add_months(Months::new(month - 1)),
    }
    .ok_or_else(invalid)?;
    let offset = (i64::from(day) - 1) * 86_400
        + i64::from(hour) * 3_600
        + i64::from(minute) * 60
        + i64::from(second);

    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(Duration::seconds(offset)))
        .map(|datetime| datetime.and_utc().timestamp())
        .ok_or_else(invalid)
}

/// 開始時刻から現在時刻までの経過時間を`H:MM:SS`形式で返す。
///
/// どちらかが`None`、または現在時刻が開始時刻より前の場合は`??:??:??`を返す。
/// 時間はゼロ埋めせず、分と秒は2桁でゼロ埋めする。
pub fn elapsed_str(start_epoch: Option<i64>, now_epoch: Option<i64>) -> String {
    let (start, now) = match (start_epoch, now_epoch) {
        (Some(start), Some(now)) if now >= start => (start, now),
        _ => return UNKNOWN_ELAPSED.to_string(),
    };

    let secs = now - start;
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
