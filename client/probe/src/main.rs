use std::{env, process::ExitCode};

use reqwest::{header, Client, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing_subscriber::EnvFilter;

const DEFAULT_RECEIVER_URL: &str = "http://127.0.0.1:8000/";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn receiver_url(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_RECEIVER_URL.to_string())
}

#[derive(Debug, PartialEq, Eq)]
enum PayloadSource {
    Stdin,
    File(String),
}

impl PayloadSource {
    /// No argument, or `-`, means stdin.
    fn from_arg(arg: Option<String>) -> Self {
        match arg {
            Some(path) if path != "-" => PayloadSource::File(path),
            _ => PayloadSource::Stdin,
        }
    }
}

async fn read_payload<R: AsyncRead + Unpin>(
    source: &PayloadSource,
    mut stdin: R,
) -> std::io::Result<Vec<u8>> {
    match source {
        PayloadSource::File(path) => tokio::fs::read(path).await,
        PayloadSource::Stdin => {
            let mut buf = Vec::new();
            stdin.read_to_end(&mut buf).await?;
            Ok(buf)
        }
    }
}

// Bytes go out untouched so malformed input reaches the receiver's error path.
async fn send(
    client: &Client,
    url: &str,
    payload: Vec<u8>,
) -> Result<(StatusCode, String), reqwest::Error> {
    let response = client
        .post(url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

fn render_ack(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => body.to_string(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let url = receiver_url(env::var("RECEIVER_URL").ok());
    let source = PayloadSource::from_arg(env::args().nth(1));
    let payload = match read_payload(&source, tokio::io::stdin()).await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(source = ?source, error = %err, "failed to read payload");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%url, payload_bytes = payload.len(), "sending payload");
    let client = Client::new();
    match send(&client, &url, payload).await {
        Ok((status, body)) => {
            println!("{} {}", status.as_u16(), render_ack(&body));
            if status.is_success() {
                ExitCode::SUCCESS
            } else {
                tracing::warn!(status = status.as_u16(), "receiver rejected payload");
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "request failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_is_compacted_when_json() {
        assert_eq!(render_ack("{ \"status\": \"ok\" }"), "{\"status\":\"ok\"}");
        assert_eq!(render_ack("Bad Request"), "Bad Request");
    }

    #[test]
    fn receiver_url_trims_and_falls_back() {
        assert_eq!(receiver_url(None), DEFAULT_RECEIVER_URL);
        assert_eq!(receiver_url(Some("   ".to_string())), DEFAULT_RECEIVER_URL);
        assert_eq!(
            receiver_url(Some(" http://10.0.0.5:8000/ ".to_string())),
            "http://10.0.0.5:8000/"
        );
    }

    #[test]
    fn dash_or_no_argument_means_stdin() {
        assert_eq!(PayloadSource::from_arg(None), PayloadSource::Stdin);
        assert_eq!(PayloadSource::from_arg(Some("-".to_string())), PayloadSource::Stdin);
        assert_eq!(
            PayloadSource::from_arg(Some("reading.json".to_string())),
            PayloadSource::File("reading.json".to_string())
        );
    }

    #[tokio::test]
    async fn reads_stdin_bytes_untouched() {
        let stdin: &[u8] = b"{\"temp\": 21.5}\n";
        let payload = read_payload(&PayloadSource::Stdin, stdin).await.unwrap();
        assert_eq!(payload, b"{\"temp\": 21.5}\n");
    }

    #[tokio::test]
    async fn reads_file_and_ignores_stdin() {
        let path = env::temp_dir().join(format!("device-probe-{}.json", std::process::id()));
        tokio::fs::write(&path, b"{\"humidity\": 60}").await.unwrap();
        let source = PayloadSource::File(path.to_string_lossy().into_owned());
        let payload = read_payload(&source, &b"ignored"[..]).await.unwrap();
        assert_eq!(payload, b"{\"humidity\": 60}");
        let _ = tokio::fs::remove_file(&path).await;
    }
}
