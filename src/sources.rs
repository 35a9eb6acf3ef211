use crate::statistics::{Period, StatisticsPayload};
use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const HTTP_TIMEOUT_SECONDS: u64 = 20;
const USER_AGENT: &str = concat!("zipkart-dash/", env!("CARGO_PKG_VERSION"));
const STATISTICS_ENDPOINT: &str = "statistics";

/// Where the dashboard reads its statistics from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatisticsSource {
    Api { base_url: String, token: Option<String> },
    File(PathBuf),
}

impl StatisticsSource {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Api { base_url, .. } => base_url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
        .build()
        .context("failed to build HTTP client")
}

pub async fn load_statistics(
    source: &StatisticsSource,
    period: Period,
) -> Result<StatisticsPayload> {
    match source {
        StatisticsSource::Api { base_url, token } => {
            let client = build_client()?;
            fetch_statistics(&client, base_url, token.as_deref(), period).await
        }
        StatisticsSource::File(path) => load_statistics_file(path).await,
    }
}

/// Fetches the statistics for `period` from the backend. Issues one request.
pub async fn fetch_statistics(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    period: Period,
) -> Result<StatisticsPayload> {
    let url = statistics_url(base_url, period);
    debug!(%url, "requesting statistics");

    let mut request = client.get(&url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request
        .send()
        .await
        .map_err(|err| {
            anyhow!(
                "failed to fetch {url}: {}",
                describe_error(&anyhow::Error::from(err))
            )
        })?;
    let response = response
        .error_for_status()
        .with_context(|| format!("backend rejected statistics request {url}"))?;
    response
        .json::<StatisticsPayload>()
        .await
        .with_context(|| format!("failed to decode statistics from {url}"))
}

pub async fn load_statistics_file(path: &Path) -> Result<StatisticsPayload> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read statistics file {}", path.display()))?;
    parse_statistics(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn parse_statistics(raw: &str) -> Result<StatisticsPayload> {
    serde_json::from_str(raw).context("statistics payload is not valid JSON")
}

pub fn statistics_url(base_url: &str, period: Period) -> String {
    format!(
        "{}/{STATISTICS_ENDPOINT}?period={}",
        base_url.trim_end_matches('/'),
        period.as_str()
    )
}

fn describe_error(error: &anyhow::Error) -> String {
    let mut pieces: Vec<String> = Vec::new();
    for (idx, cause) in error.chain().enumerate() {
        let text = cause.to_string();
        if text.is_empty() {
            continue;
        }
        if idx == 0 {
            pieces.push(text);
        } else {
            pieces.push(format!("caused by {text}"));
        }
    }

    if pieces.is_empty() {
        format!("{error:?}")
    } else {
        pieces.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_period() {
        assert_eq!(
            statistics_url("http://localhost:8080/api/", Period::Year),
            "http://localhost:8080/api/statistics?period=year"
        );
        assert_eq!(
            statistics_url("http://localhost:8080", Period::Month),
            "http://localhost:8080/statistics?period=month"
        );
    }

    #[test]
    fn describe_error_joins_causes() {
        let error = anyhow!("socket closed").context("request failed");
        assert_eq!(
            describe_error(&error),
            "request failed | caused by socket closed"
        );
    }

    #[test]
    fn parse_reports_invalid_json() {
        assert!(parse_statistics("[1, 2").is_err());
        assert!(parse_statistics(r#"{"sales": {"current": 1}}"#).is_ok());
    }

    #[tokio::test]
    async fn loads_statistics_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, r#"{"sales": {"current": 10, "previous": 8}}"#).unwrap();
        let payload = load_statistics_file(&path).await.unwrap();
        assert_eq!(payload.sales.change().to_string(), "+25%");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_statistics_file(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("failed to read statistics file"));
    }

    #[test]
    fn describes_sources() {
        let api = StatisticsSource::Api {
            base_url: "http://api".to_string(),
            token: None,
        };
        assert_eq!(api.describe(), "http://api");
    }
}
