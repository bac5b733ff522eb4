//! AppVeyor REST API client.
//!
//! Two calls are needed to get a console feed: the project status (for the
//! latest build's version and first job id) and the job's console.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Public AppVeyor API endpoint.
pub const DEFAULT_API_URL: &str = "https://ci.appveyor.com/api";

/// Errors retrieving a console log.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AppVeyor API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Build {version} has no jobs")]
    NoJobs { version: String },

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The build a console log belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRef {
    /// Build version, e.g. "1.0.1234"
    pub version: String,
    /// Id of the first job of the build
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectStatus {
    build: BuildStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildStatus {
    version: String,
    #[serde(default)]
    jobs: Vec<JobStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    job_id: String,
}

impl BuildRef {
    fn from_status(status: ProjectStatus) -> Result<Self, FetchError> {
        let BuildStatus { version, jobs } = status.build;
        match jobs.into_iter().next() {
            Some(job) => Ok(Self {
                version,
                job_id: job.job_id,
            }),
            None => Err(FetchError::NoJobs { version }),
        }
    }
}

/// Thin client over the AppVeyor REST API
pub struct AppVeyorClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl AppVeyorClient {
    pub fn new(
        api_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.http.get(format!("{}/{}", self.api_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Version and first job id of a project's latest build.
    pub async fn latest_build(&self, account: &str, project: &str) -> Result<BuildRef, FetchError> {
        let response = self
            .get(&format!("projects/{}/{}", account, project))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status: ProjectStatus = ensure_success(response).await?.json().await?;
        let build = BuildRef::from_status(status)?;
        debug!(version = %build.version, job = %build.job_id, "latest build resolved");
        Ok(build)
    }

    /// Raw console feed of one job.
    pub async fn console_log(&self, job_id: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .get(&format!("buildjobs/{}/console", job_id))
            .send()
            .await?;
        let body = ensure_success(response).await?.bytes().await?;
        debug!(job = %job_id, bytes = body.len(), "console log downloaded");
        Ok(body.to_vec())
    }
}

async fn ensure_success(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status { status, body })
}
