use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{WeatherBotError, error::truncate_body, model::CombinedReport};

use super::Notifier;

/// Posts markdown messages to a DingTalk custom robot webhook.
#[derive(Debug, Clone)]
pub struct DingTalkNotifier {
    webhook_url: String,
    title: String,
    http: Client,
}

#[derive(Debug, Serialize)]
pub struct MarkdownMessage<'a> {
    msgtype: &'static str,
    markdown: MarkdownBody<'a>,
}

#[derive(Debug, Serialize)]
struct MarkdownBody<'a> {
    title: &'a str,
    text: String,
}

impl<'a> MarkdownMessage<'a> {
    pub fn new(title: &'a str, report: &CombinedReport) -> Self {
        Self {
            msgtype: "markdown",
            markdown: MarkdownBody {
                title,
                text: report.render(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RobotReply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

impl DingTalkNotifier {
    pub fn new(
        webhook_url: impl Into<String>,
        title: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherBotError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            title: title.into(),
            http,
        })
    }
}

#[async_trait]
impl Notifier for DingTalkNotifier {
    async fn notify(&self, report: &CombinedReport) -> Result<(), WeatherBotError> {
        let payload = MarkdownMessage::new(&self.title, report);

        let res = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WeatherBotError::notify(format!("failed to reach DingTalk webhook: {e}")))?;

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        debug!(%status, %body, "DingTalk response");

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "DingTalk webhook rejected the message");
            return Ok(());
        }

        match serde_json::from_str::<RobotReply>(&body) {
            Ok(reply) if reply.errcode != 0 => warn!(
                errcode = reply.errcode,
                errmsg = %reply.errmsg,
                "DingTalk robot returned an error"
            ),
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fragment;
    use chrono::NaiveDate;
    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::{TcpListener, TcpStream},
        thread,
    };

    fn report() -> CombinedReport {
        CombinedReport::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), vec![])
    }

    fn notifier(url: &str, timeout: Duration) -> DingTalkNotifier {
        DingTalkNotifier::new(url, "每日天气播报", timeout).unwrap()
    }

    /// Reads one full HTTP request (headers plus `Content-Length` body).
    fn read_request(stream: &TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            head.push_str(&line);
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        head + &String::from_utf8_lossy(&body)
    }

    /// Serves a single canned response on a loopback port and returns its URL.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/robot/send", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&stream);
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            request
        });
        (url, handle)
    }

    #[test]
    fn payload_is_markdown_with_title_and_rendered_report() {
        let report = CombinedReport::new(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            vec![Fragment::Failure {
                name: "Nowhere".into(),
                detail: "位置查询失败: {}".into(),
            }],
        );

        let value = serde_json::to_value(MarkdownMessage::new("每日天气播报", &report)).unwrap();

        assert_eq!(value["msgtype"], "markdown");
        assert_eq!(value["markdown"]["title"], "每日天气播报");
        assert_eq!(
            value["markdown"]["text"],
            "### ⏰ 晨间天气预报 07/01\n\n❌ Nowhere播报失败: 位置查询失败: {}"
        );
    }

    #[test]
    fn robot_reply_tolerates_missing_fields() {
        let reply: RobotReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.errcode, 0);
        assert!(reply.errmsg.is_empty());
    }

    #[tokio::test]
    async fn posts_payload_and_accepts_ok_reply() {
        let (url, server) = serve_once("200 OK", r#"{"errcode":0,"errmsg":"ok"}"#);

        notifier(&url, Duration::from_secs(5)).notify(&report()).await.unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /robot/send"));
        assert!(request.contains(r#""msgtype":"markdown""#));
    }

    #[tokio::test]
    async fn server_error_status_is_logged_not_returned() {
        let (url, server) = serve_once("500 Internal Server Error", "{}");

        let result = notifier(&url, Duration::from_secs(5)).notify(&report()).await;

        assert!(result.is_ok());
        server.join().unwrap();
    }

    #[tokio::test]
    async fn robot_errcode_is_logged_not_returned() {
        let (url, server) = serve_once("200 OK", r#"{"errcode":310000,"errmsg":"sign not match"}"#);

        let result = notifier(&url, Duration::from_secs(5)).notify(&report()).await;

        assert!(result.is_ok());
        server.join().unwrap();
    }

    #[tokio::test]
    async fn unreachable_webhook_is_notify_error() {
        let err = notifier("http://127.0.0.1:1/", Duration::from_secs(5))
            .notify(&report())
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherBotError::Notify { .. }));
    }

    #[tokio::test]
    async fn silent_webhook_times_out_as_notify_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(3));
            drop(stream);
        });

        let started = std::time::Instant::now();
        let err = notifier(&url, Duration::from_millis(300))
            .notify(&report())
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherBotError::Notify { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
        server.join().unwrap();
    }
}
