//! HTTP routes.
//!
//! | Method | Path                   | Handler            |
//! |--------|------------------------|--------------------|
//! | GET    | `/`                    | service banner     |
//! | GET    | `/api/health`          | liveness           |
//! | POST   | `/api/upload`          | one file (`file`)  |
//! | POST   | `/api/upload-multiple` | many (`files`)     |
//! | GET    | `/api/files`           | list, newest first |
//! | GET    | `/api/files/{id}`      | one record         |
//! | DELETE | `/api/files/{id}`      | blob + record      |
//! | GET    | `/uploads/{filename}`  | stored blob        |

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::blobs::{BlobStore, PUBLIC_PREFIX};
use crate::config::UploadConfig;
use crate::error::{Result, UploadError};
use crate::store::{NewUpload, UploadRecord, UploadStore};

/// Multipart field read by `/api/upload`.
pub const SINGLE_FIELD: &str = "file";
/// Multipart field read by `/api/upload-multiple`.
pub const MULTI_FIELD: &str = "files";

/// Slack on top of the file caps for multipart framing and headers.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Shared service state.
#[derive(Debug)]
pub struct AppState {
    /// Metadata store. Never held across an `.await`.
    pub store: Mutex<UploadStore>,
    /// Blob directory.
    pub blobs: BlobStore,
    /// Active configuration.
    pub config: UploadConfig,
}

impl AppState {
    /// Open the store and blob directory named by `config`.
    ///
    /// # Errors
    /// Returns an error if either cannot be opened.
    pub fn open(config: UploadConfig) -> Result<Self> {
        let blobs = BlobStore::open(&config.upload_dir)?;
        let store = UploadStore::open(&config.database_path, config.wal_mode)?;
        Ok(Self {
            store: Mutex::new(store),
            blobs,
            config,
        })
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let single_limit = state.config.max_file_size.saturating_add(BODY_OVERHEAD);
    let multi_limit = state
        .config
        .max_file_size
        .saturating_mul(state.config.max_files)
        .saturating_add(BODY_OVERHEAD);
    let blob_service = ServeDir::new(state.blobs.root());

    Router::new()
        .route("/", get(banner))
        .route("/api/health", get(health))
        .route(
            "/api/upload",
            post(upload_single).layer(DefaultBodyLimit::max(single_limit)),
        )
        .route(
            "/api/upload-multiple",
            post(upload_multiple).layer(DefaultBodyLimit::max(multi_limit)),
        )
        .route("/api/files", get(list_files))
        .route("/api/files/{id}", get(get_file).delete(delete_file))
        .nest_service(PUBLIC_PREFIX, blob_service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct UploadResponse {
    success: bool,
    message: &'static str,
    file: UploadRecord,
}

#[derive(Debug, Serialize)]
struct UploadManyResponse {
    success: bool,
    message: &'static str,
    files: Vec<UploadRecord>,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    success: bool,
    total: usize,
    files: Vec<UploadRecord>,
}

#[derive(Debug, Serialize)]
struct FileResponse {
    success: bool,
    file: UploadRecord,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn banner() -> Json<Value> {
    Json(json!({
        "message": "Memories API Server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "Server is running" }))
}

async fn upload_single(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut incoming = read_files(multipart, SINGLE_FIELD, 1, state.config.max_file_size).await?;
    let file = incoming.pop().ok_or(UploadError::MissingFile)?;
    let file = persist(&state, file).await?;
    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully",
        file,
    }))
}

async fn upload_multiple(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadManyResponse>> {
    let incoming = read_files(
        multipart,
        MULTI_FIELD,
        state.config.max_files,
        state.config.max_file_size,
    )
    .await?;
    if incoming.is_empty() {
        return Err(UploadError::MissingFile);
    }

    let mut files = Vec::with_capacity(incoming.len());
    for file in incoming {
        match persist(&state, file).await {
            Ok(record) => files.push(record),
            Err(e) => {
                rollback(&state, &files).await;
                return Err(e);
            }
        }
    }
    Ok(Json(UploadManyResponse {
        success: true,
        message: "Files uploaded successfully",
        files,
    }))
}

async fn list_files(State(state): State<Arc<AppState>>) -> Result<Json<ListResponse>> {
    let files = state.store.lock().list()?;
    Ok(Json(ListResponse {
        success: true,
        total: files.len(),
        files,
    }))
}

async fn get_file(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<FileResponse>> {
    let id = file_id(id)?;
    let file = state.store.lock().get(id)?.ok_or(UploadError::NotFound)?;
    Ok(Json(FileResponse {
        success: true,
        file,
    }))
}

async fn delete_file(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>> {
    let id = file_id(id)?;
    let record = state.store.lock().get(id)?.ok_or(UploadError::NotFound)?;

    match state.blobs.remove(&record.filename).await {
        Ok(true) => {}
        Ok(false) => warn!(id, filename = %record.filename, "Blob already missing"),
        Err(e) => warn!(id, filename = %record.filename, error = %e, "Failed to remove blob"),
    }

    if !state.store.lock().delete(id)? {
        return Err(UploadError::NotFound);
    }
    info!(id, filename = %record.filename, "Upload deleted");
    Ok(Json(json!({
        "success": true,
        "message": "File deleted successfully",
    })))
}

/// Unwrap the `{id}` segment, turning axum's plain-text rejection into the
/// JSON error body every route answers with.
fn file_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| UploadError::InvalidId(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// Multipart intake
// ---------------------------------------------------------------------------

/// A file read fully into memory, not yet stored.
#[derive(Debug)]
struct IncomingFile {
    field: &'static str,
    original_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Read every file part named `field`. Other parts are skipped. Nothing
/// is written until the whole body has been accepted.
async fn read_files(
    mut multipart: Multipart,
    field: &'static str,
    max_files: usize,
    max_file_size: usize,
) -> Result<Vec<IncomingFile>> {
    let mut files = Vec::new();
    while let Some(mut part) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::from_multipart(&e, max_file_size))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let Some(original_name) = part.file_name().map(str::to_owned) else {
            continue;
        };
        if files.len() == max_files {
            return Err(UploadError::TooManyFiles { max: max_files });
        }
        let mime_type = part
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();

        let mut bytes = Vec::new();
        while let Some(chunk) = part
            .chunk()
            .await
            .map_err(|e| UploadError::from_multipart(&e, max_file_size))?
        {
            if bytes.len() + chunk.len() > max_file_size {
                return Err(UploadError::FileTooLarge {
                    limit: max_file_size,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        files.push(IncomingFile {
            field,
            original_name,
            mime_type,
            bytes,
        });
    }
    Ok(files)
}

/// Write the blob, then record it. A failed insert removes the blob again.
async fn persist(state: &AppState, file: IncomingFile) -> Result<UploadRecord> {
    let filename = BlobStore::unique_name(
        file.field,
        &file.original_name,
        Utc::now().timestamp_millis(),
        &mut rand::thread_rng(),
    );
    state.blobs.write(&filename, &file.bytes).await?;

    let upload = NewUpload {
        file_path: BlobStore::public_path(&filename),
        filename,
        original_name: file.original_name,
        size: file.bytes.len() as u64,
        mime_type: file.mime_type,
    };
    let inserted = state.store.lock().insert(&upload);
    match inserted {
        Ok(record) => {
            info!(
                id = record.id,
                filename = %record.filename,
                original = %record.original_name,
                bytes = record.size,
                "Upload stored"
            );
            Ok(record)
        }
        Err(e) => {
            if let Err(cleanup) = state.blobs.remove(&upload.filename).await {
                warn!(filename = %upload.filename, error = %cleanup, "Failed to remove orphaned blob");
            }
            Err(e)
        }
    }
}

/// Undo the uploads already stored by a multi-file request that failed
/// part way through.
async fn rollback(state: &AppState, stored: &[UploadRecord]) {
    for record in stored {
        let deleted = state.store.lock().delete(record.id);
        if let Err(e) = deleted {
            warn!(id = record.id, error = %e, "Failed to roll back upload record");
        }
        if let Err(e) = state.blobs.remove(&record.filename).await {
            warn!(filename = %record.filename, error = %e, "Failed to roll back blob");
        }
    }
    if !stored.is_empty() {
        warn!(count = stored.len(), "Rolled back partial multi-file upload");
    }
}
