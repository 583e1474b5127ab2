//! Persisted launch state kept in the state directory.
//!
//! # Design
//! - `launch.json` records the first completed launch; absence means first launch.
//! - A corrupt record is surfaced rather than silently treated as a first launch.
//! - The device identifier is generated once and reused across launches.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// File holding the first-launch record.
pub const LAUNCH_FILE_NAME: &str = "launch.json";
/// File holding the generated device identifier.
pub const DEVICE_ID_FILE_NAME: &str = "device_id";

/// Contents of `launch.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRecord {
    /// When the first launch completed.
    pub first_launch_at: DateTime<Utc>,
}

/// File-backed store for launch bookkeeping.
#[derive(Debug, Clone)]
pub struct LaunchStore {
    dir: PathBuf,
}

impl LaunchStore {
    /// Store rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the state directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| AppError::io("store.create_dir", &self.dir, err))
    }

    /// Read the launch record, if one was written.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or decoded.
    pub async fn record(&self) -> AppResult<Option<LaunchRecord>> {
        let path = self.dir.join(LAUNCH_FILE_NAME);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AppError::io("store.read_launch", path, err)),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| AppError::StateFile { path, source })
    }

    /// Whether a previous launch completed.
    ///
    /// # Errors
    ///
    /// Returns an error when the launch record is unreadable or corrupt.
    pub async fn has_launched_before(&self) -> AppResult<bool> {
        Ok(self.record().await?.is_some())
    }

    /// Record a completed launch. An existing record is kept as-is.
    ///
    /// # Errors
    ///
    /// Returns an error when the record cannot be read or written.
    pub async fn mark_launched(&self) -> AppResult<LaunchRecord> {
        if let Some(existing) = self.record().await? {
            return Ok(existing);
        }
        self.ensure_dir().await?;
        let record = LaunchRecord {
            first_launch_at: Utc::now(),
        };
        let path = self.dir.join(LAUNCH_FILE_NAME);
        let body = serde_json::to_vec_pretty(&record)
            .map_err(|source| AppError::StateFile {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, body)
            .await
            .map_err(|err| AppError::io("store.write_launch", &path, err))?;
        info!(first_launch_at = %record.first_launch_at, "first launch recorded");
        Ok(record)
    }

    /// Device identifier, generated and persisted on first use.
    ///
    /// # Errors
    ///
    /// Returns an error when the identifier file cannot be read or written.
    pub async fn device_id(&self) -> AppResult<String> {
        let path = self.dir.join(DEVICE_ID_FILE_NAME);
        match fs::read_to_string(&path).await {
            Ok(existing) if !existing.trim().is_empty() => return Ok(existing.trim().to_string()),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(AppError::io("store.read_device_id", path, err)),
        }
        self.ensure_dir().await?;
        let id = Uuid::new_v4().to_string();
        fs::write(&path, &id)
            .await
            .map_err(|err| AppError::io("store.write_device_id", &path, err))?;
        debug!("generated device identifier");
        Ok(id)
    }
}
