//! Multipart upload intake.
//!
//! Each file field is streamed chunk by chunk into its own file in the staging
//! directory. Nothing moves files out again; they live until tear-down.
//!
//! A request stages all of its files or none of them. Files written so far are
//! removed when a later field fails or the request future is dropped (client
//! disconnect, request timeout).

use std::path::{Path, PathBuf};

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// A file written to the staging directory.
#[derive(Debug, Clone, Serialize)]
pub struct StagedFile {
    /// Multipart field name.
    pub field: String,
    /// Name inside the staging directory.
    pub file_name: String,
    /// Absolute path of the staged file.
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<StagedFile>,
}

/// Reduce a client file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Removes a staged file on drop unless it was committed.
struct PendingFile {
    path: PathBuf,
    committed: bool,
}

impl PendingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::warn!(path = %self.path.display(), "Removed incomplete upload");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove incomplete upload"
                );
            }
        }
    }
}

/// `POST /upload`
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut files = Vec::new();
    let mut pending = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(&original_name));
        let path = state.staging.file_path(&file_name);

        pending.push(PendingFile::new(path.clone()));
        let bytes = stream_to_file(field, &path).await?;

        tracing::info!(
            field = %field_name,
            original_name = %original_name,
            path = %path.display(),
            bytes,
            "Upload staged"
        );

        files.push(StagedFile {
            field: field_name,
            file_name,
            path,
            bytes,
        });
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No file provided".to_string()));
    }

    pending.into_iter().for_each(PendingFile::commit);
    for file in &files {
        metrics::record_upload(file.bytes);
    }

    Ok((StatusCode::CREATED, Json(UploadResponse { files })))
}

async fn stream_to_file(mut field: Field<'_>, path: &Path) -> Result<u64, ApiError> {
    let mut file = fs::File::create(path).await?;
    let mut bytes = 0u64;

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(bytes)
}

/// Staged files currently present, sorted by name.
pub async fn list_staged(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}
