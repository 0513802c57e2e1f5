use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};

use crate::timer_record::TimerRecord;

/// Toggl API v9のエンドポイント。
pub const DEFAULT_API_URL: &str = "https://api.track.toggl.com/api/v9";

/// リクエストのタイムアウト。
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 実行中のタイムエントリーを取得するためのリポジトリ。
#[allow(async_fn_in_trait)]
#[cfg_attr(test, automock)]
pub trait TogglRepository {
    /// 実行中のタイムエントリーを取得する。
    ///
    /// タイマーが動いていない場合は`None`を返す。
    ///
    /// # Arguments
    ///
    /// * `api_token` - Toggl APIトークン
    async fn read_current_time_entry(&self, api_token: &str) -> Result<Option<TimerRecord>>;
}

/// Toggl APIと通信するためのクライアント。
///
/// # Examples
///
/// ```ignore
/// let client = TogglClient::new();
/// let entry = client.read_current_time_entry("token").await.unwrap();
/// ```
pub struct TogglClient {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl TogglClient {
    /// Toggl APIに接続する`TogglClient`を返す。
    pub fn new() -> Self {
        Self::with_api_url(DEFAULT_API_URL).with_timeout(REQUEST_TIMEOUT)
    }

    /// 接続先を指定した`TogglClient`を返す。
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// リクエストのタイムアウトを変更する。
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for TogglClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TogglRepository for TogglClient {
    async fn read_current_time_entry(&self, api_token: &str) -> Result<Option<TimerRecord>> {
        if api_token.is_empty() {
            debug!("No api token, skip request");
            return Ok(None);
        }

        let url = format!("{}/me/time_entries/current", self.api_url);
        let response = self
            .client
            .get(&url)
            .basic_auth(api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Toggl API at {}", url))?;

        let status = response.status();
        if status != StatusCode::OK {
            bail!("Request returned an unexpected status: {}", status);
        }

        let entry = response
            .json::<Option<TimerRecord>>()
            .await
            .context("Failed to deserialize response")?;
        info!("Current time entry running: {}", entry.is_some());

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use base64::{engine::general_purpose::STANDARD, Engine};
    use rstest::rstest;
    use tokio::net::TcpListener;

    use super::{TogglClient, TogglRepository};
    use crate::timer_record::TimerRecord;

    const PATH: &str = "/me/time_entries/current";

    fn expected_auth(token: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:api_token", token)))
    }

    #[tokio::test]
    async fn test_read_current_time_entry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_header("authorization", expected_auth("secret").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 1, "description": "Write docs", "start": "2024-06-18T06:29:23+00:00", "duration": -1}"#)
            .create_async()
            .await;

        let client = TogglClient::with_api_url(&server.url());
        let entry = client.read_current_time_entry("secret").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            entry,
            Some(TimerRecord {
                description: Some("Write docs".to_string()),
                start: Some("2024-06-18T06:29:23+00:00".to_string()),
            })
        );
    }

    /// タイマーが動いていない場合、APIは`null`を返す。
    #[tokio::test]
    async fn test_read_current_time_entry_no_timer() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let client = TogglClient::with_api_url(&server.url());
        let entry = client.read_current_time_entry("secret").await.unwrap();

        assert_eq!(entry, None);
    }

    #[tokio::test]
    async fn test_read_current_time_entry_null_fields() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body(r#"{"description": null, "start": null}"#)
            .create_async()
            .await;

        let client = TogglClient::with_api_url(&server.url());
        let entry = client.read_current_time_entry("secret").await.unwrap();

        assert_eq!(entry, Some(TimerRecord::default()));
    }

    #[tokio::test]
    #[rstest]
    #[case::unauthorized(403, r#"{"error": "forbidden"}"#)]
    #[case::created(201, "null")]
    #[case::server_error(500, "")]
    #[case::malformed_json(200, "{description")]
    async fn test_read_current_time_entry_error(#[case] status: usize, #[case] body: &str) {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;

        let client = TogglClient::with_api_url(&server.url());
        let result = client.read_current_time_entry("secret").await;

        assert!(result.is_err());
    }

    /// トークンが空の場合はリクエストしない。
    #[tokio::test]
    async fn test_read_current_time_entry_empty_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", PATH).expect(0).create_async().await;

        let client = TogglClient::with_api_url(&server.url());
        let entry = client.read_current_time_entry("").await.unwrap();

        mock.assert_async().await;
        assert_eq!(entry, None);
    }

    /// 応答がない場合はタイムアウトでエラーになる。
    #[tokio::test]
    async fn test_read_current_time_entry_timeout() {
        // 接続を受け付けるだけで応答しないサーバー
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = TogglClient::with_api_url(&format!("http://{}", address))
            .with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let result = client.read_current_time_entry("secret").await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
        server.abort();
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(TogglClient::new().timeout, Duration::from_secs(10));
    }
}
