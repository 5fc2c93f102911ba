use std::path::{Path, PathBuf};

use chrono::Utc;
use rocket::fs::TempFile;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;

/// Filesystem home for player documents (medical fitness certificate and the
/// two ID scans). Rows only ever reference the generated filename; the files
/// themselves are served back under `/uploads`.
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|err| AppError::Internal(format!("Cannot create uploads dir: {}", err)))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists one uploaded slot and returns the filename stored on the
    /// player row. Names are timestamp + uuid so re-uploads never collide.
    #[instrument(skip(self, file), fields(slot))]
    pub async fn save(&self, slot: &str, file: &mut TempFile<'_>) -> Result<String, AppError> {
        let extension = file
            .content_type()
            .and_then(|ct| ct.extension())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let filename = format!(
            "{}-{}-{}{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            slot,
            extension
        );

        let destination = self.root.join(&filename);
        // copy_to rather than persist_to: the uploads dir may live on a
        // different filesystem than the request's temp dir.
        file.copy_to(&destination)
            .await
            .map_err(|err| AppError::Internal(format!("Cannot store uploaded file: {}", err)))?;

        info!(filename = %filename, "Stored uploaded document");
        Ok(filename)
    }
}
