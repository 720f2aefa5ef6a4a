//! Report download: fetch the binary document and hand it to a save action.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::api::{ApiError, Backend, ReportRequest};

/// Client-side save action for a downloaded report.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist `bytes` under (a sanitized form of) `filename` and return
    /// where it ended up.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Saves reports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Keep only the final path component so a server-suggested name cannot
/// escape the target directory.
fn sanitize_filename(filename: &str) -> Option<&str> {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
}

#[async_trait]
impl ReportSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = sanitize_filename(filename)
            .with_context(|| format!("unusable report filename {filename:?}"))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create report directory {}", self.dir.display()))?;

        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;

        Ok(path)
    }
}

/// Why a report download did not produce a saved file.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to save report: {0}")]
    Save(String),
}

impl ReportError {
    /// Alert-level message for the user.
    pub fn alert(&self) -> String {
        let reason = match self {
            Self::Api(err) => err.detail().map(str::to_owned).unwrap_or_else(|| err.to_string()),
            Self::Save(_) => self.to_string(),
        };
        format!("Error downloading report: {reason}")
    }
}

/// Request the report and save it under the server-suggested filename, or
/// `Fitness_Report_{session_id}.pdf` when none is given.
pub async fn fetch_and_save(
    backend: &dyn Backend,
    sink: &dyn ReportSink,
    req: &ReportRequest,
) -> Result<PathBuf, ReportError> {
    let document = backend.generate_report(req).await?;
    let filename = document.suggested_filename(req.session_id);
    sink.save(&filename, &document.bytes)
        .await
        .map_err(|e| ReportError::Save(format!("{e:#}")))
}
