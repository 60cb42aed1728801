//! Retrieving the raw export from a file path or an http(s) URL.
//!
//! This is the only suspend point of a load. Everything after it runs
//! synchronously.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

use super::ingest_bytes;
use crate::error::{IngestError, IngestResult};
use crate::logs::{log_error, log_info, log_success};
use crate::models::Dataset;
use crate::schema::Schema;

/// Where the CSV export lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// `http://` / `https://` strings are URLs, anything else a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Raw bytes plus what the transport told us about them.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub location: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Fetch with a default HTTP client.
pub async fn fetch(source: &Source) -> IngestResult<Fetched> {
    fetch_with(&reqwest::Client::new(), source).await
}

/// Fetch using the given HTTP client for URL sources.
pub async fn fetch_with(client: &reqwest::Client, source: &Source) -> IngestResult<Fetched> {
    let location = source.to_string();

    match source {
        Source::Path(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| IngestError::fetch(&location, e))?;
            let last_modified = tokio::fs::metadata(path)
                .await
                .ok()
                .and_then(|meta| meta.modified().ok())
                .map(DateTime::<Utc>::from);

            Ok(Fetched { bytes, location, last_modified })
        }
        Source::Url(url) => {
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| IngestError::fetch(&location, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(IngestError::fetch(
                    &location,
                    format!("HTTP {} beim Laden der CSV", status.as_u16()),
                ));
            }

            let last_modified = response
                .headers()
                .get(reqwest::header::LAST_MODIFIED)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_http_date);

            let bytes = response
                .bytes()
                .await
                .map_err(|e| IngestError::fetch(&location, e))?
                .to_vec();

            Ok(Fetched { bytes, location, last_modified })
        }
    }
}

/// Parse an HTTP `Last-Modified` value.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fetch and ingest in one step.
pub async fn load(source: &Source, schema: &Schema) -> IngestResult<Dataset> {
    load_with(&reqwest::Client::new(), source, schema).await
}

pub async fn load_with(
    client: &reqwest::Client,
    source: &Source,
    schema: &Schema,
) -> IngestResult<Dataset> {
    log_info(format!("Reading {} (schema '{}')", source, schema.name));

    let fetched = fetch_with(client, source).await.map_err(|err| {
        log_error(format!("CSV load error: {}", err));
        err
    })?;
    log_success(format!("Fetched {} bytes", fetched.bytes.len()));

    let dataset = ingest_bytes(&fetched.bytes, schema)?;
    Ok(dataset.with_source(Some(fetched.location), fetched.last_modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::presets;
    use chrono::{Datelike, Timelike};
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn quiet() {
        crate::logs::LOG_BROADCASTER.set_echo(false);
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    /// Serve exactly one canned HTTP response on a local port.
    async fn serve_once(response: String) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/data/medications.csv", addr)
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.org/a.csv"),
            Source::Url("https://example.org/a.csv".into())
        );
        assert_eq!(
            Source::parse(" data/medications.csv "),
            Source::Path(PathBuf::from("data/medications.csv"))
        );
        assert_eq!(Source::parse("data/x.csv").to_string(), "data/x.csv");
    }

    #[test]
    fn test_parse_http_date() {
        let dt = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2015, 10, 21));
        assert_eq!(dt.hour(), 7);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        quiet();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "medication,Category,Indication\nAspirin,Analgesic,Pain\n").unwrap();

        let source = Source::Path(file.path().to_path_buf());
        let dataset = load(&source, &presets::medications()).await.unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.info().location.as_deref(), Some(source.to_string().as_str()));
        assert!(dataset.info().last_modified.is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_failure() {
        quiet();
        let dir = tempfile::tempdir().unwrap();
        let source = Source::Path(dir.path().join("nope.csv"));
        let err = load(&source, &presets::medications()).await.unwrap_err();
        assert!(matches!(err, IngestError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_http_success_with_last_modified() {
        quiet();
        let body = "Name;Disease;Indication\nAspirin;Pain;Headache\n";
        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nLast-Modified: Wed, 21 Oct 2015 07:28:00 GMT\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ))
        .await;

        let dataset = load_with(&local_client(), &Source::parse(&url), &presets::ema())
            .await
            .unwrap();

        assert_eq!(dataset.records()[0].get("name"), "Aspirin");
        assert_eq!(
            dataset.info().last_modified,
            parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT")
        );
    }

    #[tokio::test]
    async fn test_http_error_status() {
        quiet();
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
        )
        .await;

        let err = fetch_with(&local_client(), &Source::parse(&url)).await.unwrap_err();
        match err {
            IngestError::FetchFailed { reason, .. } => assert!(reason.contains("404")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
