use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use url::Url;

use crate::config::FetchConfig;
use crate::coverage::ProjectDescriptor;
use crate::error::{CovHubError, FetchError, Result};

/// Retrieves raw report documents.
///
/// Remote reports are requested with `no-cache` headers so every run sees the
/// latest upload. Local paths and `file://` URLs are read from disk. Each fetch
/// is bounded by the configured deadline and never retried.
pub struct ReportFetcher {
    client: Client,
    timeout: Duration,
}

/// Where a report document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReportLocation {
    Remote(Url),
    Local(PathBuf),
}

impl ReportFetcher {
    /// Creates a fetcher from the `[fetch]` settings.
    ///
    /// # Errors
    ///
    /// Returns `CovHubError::Config` if the HTTP client cannot be built.
    pub fn new(settings: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CovHubError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: settings.timeout(),
        })
    }

    /// Fetches the report document for `project` as text.
    ///
    /// # Errors
    ///
    /// - `FetchError::Status` for a non-success HTTP response
    /// - `FetchError::Network` for transport failures
    /// - `FetchError::Timeout` when the deadline passes
    /// - `FetchError::Io` when a local report cannot be read
    pub async fn fetch(&self, project: &ProjectDescriptor) -> std::result::Result<String, FetchError> {
        let location = resolve_location(&project.report_location).ok_or_else(|| {
            FetchError::InvalidLocation {
                project: project.key().to_owned(),
                location: project.report_location.clone(),
            }
        })?;

        match location {
            ReportLocation::Remote(url) => self.fetch_remote(project, url).await,
            ReportLocation::Local(path) => self.read_local(project, path).await,
        }
    }

    async fn fetch_remote(
        &self,
        project: &ProjectDescriptor,
        url: Url,
    ) -> std::result::Result<String, FetchError> {
        debug!("Fetching report for {} from {url}", project.key());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(project, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                project: project.key().to_owned(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(project, e))
    }

    async fn read_local(
        &self,
        project: &ProjectDescriptor,
        path: PathBuf,
    ) -> std::result::Result<String, FetchError> {
        debug!("Reading report for {} from {}", project.key(), path.display());

        match tokio::time::timeout(self.timeout, tokio::fs::read_to_string(&path)).await {
            Ok(Ok(contents)) => Ok(contents),
            Ok(Err(source)) => Err(FetchError::Io {
                project: project.key().to_owned(),
                path: path.display().to_string(),
                source,
            }),
            Err(_) => Err(self.timeout_error(project)),
        }
    }

    fn transport_error(&self, project: &ProjectDescriptor, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            self.timeout_error(project)
        } else {
            FetchError::Network {
                project: project.key().to_owned(),
                source,
            }
        }
    }

    fn timeout_error(&self, project: &ProjectDescriptor) -> FetchError {
        FetchError::Timeout {
            project: project.key().to_owned(),
            timeout_secs: self.timeout.as_secs(),
        }
    }
}

/// Classifies a report location. Anything that does not parse as an absolute
/// URL is taken as a filesystem path; single-letter schemes are Windows drive
/// letters. Schemes other than http, https and file are rejected.
fn resolve_location(location: &str) -> Option<ReportLocation> {
    let location = location.trim();
    match Url::parse(location) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Some(ReportLocation::Remote(url)),
            "file" => url.to_file_path().ok().map(ReportLocation::Local),
            scheme if scheme.len() == 1 => Some(ReportLocation::Local(PathBuf::from(location))),
            _ => None,
        },
        Err(_) => Some(ReportLocation::Local(PathBuf::from(location))),
    }
}
