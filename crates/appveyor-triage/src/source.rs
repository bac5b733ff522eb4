//! Where console feeds come from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::appveyor::{AppVeyorClient, FetchError};

/// A console feed and the build it belongs to.
#[derive(Debug, Clone)]
pub struct FetchedLog {
    /// Build identifier, used to name the report
    pub build_id: String,
    /// Raw (unrepaired) console feed
    pub bytes: Vec<u8>,
}

/// Abstraction over console feed providers.
///
/// `AppVeyorSource` implements this for the live API, `FileSource` for a
/// saved feed. Tests can provide a mock implementation.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedLog, FetchError>;

    /// Human-readable origin, for log messages.
    fn describe(&self) -> String;
}

/// A console feed saved to disk. The build id is the file stem.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn build_id(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "local".to_string())
    }
}

#[async_trait]
impl LogSource for FileSource {
    async fn fetch(&self) -> Result<FetchedLog, FetchError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::FileRead {
                path: self.path.clone(),
                source,
            })?;
        Ok(FetchedLog {
            build_id: self.build_id(),
            bytes,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// The latest build of an AppVeyor project.
pub struct AppVeyorSource {
    client: AppVeyorClient,
    account: String,
    project: String,
}

impl AppVeyorSource {
    pub fn new(client: AppVeyorClient, account: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            client,
            account: account.into(),
            project: project.into(),
        }
    }
}

#[async_trait]
impl LogSource for AppVeyorSource {
    async fn fetch(&self) -> Result<FetchedLog, FetchError> {
        let build = self.client.latest_build(&self.account, &self.project).await?;
        info!(version = %build.version, job = %build.job_id, "fetching console log");
        let bytes = self.client.console_log(&build.job_id).await?;
        Ok(FetchedLog {
            build_id: build.version,
            bytes,
        })
    }

    fn describe(&self) -> String {
        format!("appveyor:{}/{}", self.account, self.project)
    }
}
