//! JSON dataset file backing the in-memory repositories.

use std::io::ErrorKind;
use std::path::Path;

use remedi_service::reminder::{Dataset, InMemoryStore};

use crate::error::{AppError, AppResult};

/// ## Summary
/// Reads the dataset at `path`. A missing file yields an empty dataset.
///
/// ## Errors
/// Returns `AppError::IoError` if the file exists but cannot be read, or a
/// service JSON error if its contents are not a dataset.
pub async fn load_store(path: &Path) -> AppResult<InMemoryStore> {
    let dataset = match tokio::fs::read_to_string(path).await {
        Ok(json) => Dataset::from_json(&json)?,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Dataset file not found, starting empty");
            Dataset::default()
        }
        Err(source) => {
            return Err(AppError::IoError {
                path: path.display().to_string(),
                source,
            });
        }
    };

    tracing::info!(
        path = %path.display(),
        users = dataset.users.len(),
        medications = dataset.medications.len(),
        schedules = dataset.schedules.len(),
        "Dataset loaded"
    );
    Ok(InMemoryStore::new(dataset))
}

/// ## Summary
/// Writes the store's dataset back to `path`, replacing the file whole.
///
/// ## Errors
/// Returns `AppError::IoError` if the file cannot be written.
pub async fn save_store(path: &Path, store: &InMemoryStore) -> AppResult<()> {
    let dataset = store.snapshot().await;
    let json = serde_json::to_string_pretty(&dataset)?;
    let io_error = |source| AppError::IoError {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, json).await.map_err(io_error)?;
    tokio::fs::rename(&staging, path).await.map_err(io_error)?;

    tracing::debug!(path = %path.display(), take_logs = dataset.take_logs.len(), "Dataset saved");
    Ok(())
}
