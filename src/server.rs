//! HTTP JSON API.
//!
//! Exposes the chat and document Q&A flows plus document upload and listing.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/upload` | Upload a plain-text document (multipart field `document`) |
//! | `POST` | `/general` | General chat with optional history |
//! | `POST` | `/docs-qa` | Document-grounded question answering |
//! | `GET`  | `/documents` | List stored documents with previews |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Error responses carry a JSON body `{ "error": "<message>" }`. Validation
//! failures are 400 and short-circuit before any document read or completion
//! call; completion failures are 500 with the provider's stable message.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support the browser
//! frontend.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::answer;
use crate::completion::{create_provider, CompletionError, CompletionProvider};
use crate::config::Config;
use crate::matcher;
use crate::models::ChatMessage;
use crate::store::{excerpt, DocumentStore};

/// Fixed reply when no document matches a Q&A question. The completion
/// service is not called in that case.
pub const NO_DOCUMENTS_MESSAGE: &str = "I couldn't find any relevant documents for your \
    question. Please try a different query or check if documents are available.";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: DocumentStore,
    provider: Arc<dyn CompletionProvider>,
}

/// Start the HTTP server with the provider named in the configuration.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let provider: Arc<dyn CompletionProvider> = create_provider(&config.completion)?.into();
    run_server_with_provider(config, provider).await
}

/// Start the HTTP server with an explicit completion provider.
///
/// Split out from [`run_server`] so tests and embedders can substitute a
/// fake provider.
pub async fn run_server_with_provider(
    config: &Config,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let model = provider.model_name().to_string();
    let app = build_router(Arc::new(config.clone()), provider);

    tracing::info!(addr = %bind_addr, model = %model, "doc-chat server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(config: Arc<Config>, provider: Arc<dyn CompletionProvider>) -> Router {
    let store = DocumentStore::new(&config.documents);

    // Leave headroom above the upload cap so oversize uploads reach our own
    // size check and get the 400 + message instead of a bare 413.
    let body_limit = (config.documents.max_upload_bytes as usize).saturating_mul(2);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        config,
        store,
        provider,
    };

    Router::new()
        .route("/upload", post(handle_upload))
        .route("/general", post(handle_general))
        .route("/docs-qa", post(handle_docs_qa))
        .route("/documents", get(handle_documents))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error body: `{ "error": "<message>" }`.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /documents ============

#[derive(Serialize)]
struct DocumentListItem {
    name: String,
    preview: String,
}

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<DocumentListItem>,
    total: usize,
}

async fn handle_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let preview_chars = state.config.documents.preview_chars;
    let documents: Vec<DocumentListItem> = state
        .store
        .list()
        .into_iter()
        .map(|doc| DocumentListItem {
            preview: format!("{}...", excerpt(&doc.content, preview_chars)),
            name: doc.name,
        })
        .collect();

    let total = documents.len();
    Json(DocumentListResponse { documents, total })
}

// ============ POST /upload ============

#[derive(Serialize)]
struct UploadedFile {
    name: String,
    size: u64,
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    file: UploadedFile,
}

async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("document") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|n| n.to_string())
            .ok_or_else(|| bad_request("Upload is missing a filename"))?;
        let content_type = field.content_type().map(|c| c.to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read upload: {}", e)))?;

        validate_upload(
            &state.store,
            &file_name,
            content_type.as_deref(),
            bytes.len() as u64,
            state.config.documents.max_upload_bytes,
        )?;

        let stored = state.store.save(&file_name, &bytes).map_err(|e| {
            tracing::error!(error = %e, "failed to store upload");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Failed to store upload".to_string(),
            }
        })?;

        tracing::info!(name = %stored.name, size = stored.size, "document uploaded");

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully!".to_string(),
            file: UploadedFile {
                name: stored.name,
                size: stored.size,
            },
        }));
    }

    Err(bad_request("No file uploaded"))
}

/// Upload acceptance policy: plain text only, bounded size.
///
/// A file passes when its name carries a recognized extension or its
/// declared content type is `text/plain` (the stored name gets the text
/// extension appended in the latter case). The type check runs first so an
/// oversize `.bin` is rejected for its type, not its size.
fn validate_upload(
    store: &DocumentStore,
    file_name: &str,
    content_type: Option<&str>,
    size: u64,
    max_bytes: u64,
) -> Result<(), AppError> {
    let plain_text = content_type == Some("text/plain");
    let recognized = store.has_recognized_extension(std::path::Path::new(file_name));

    if !plain_text && !recognized {
        return Err(bad_request("Only .txt files are allowed"));
    }

    if size > max_bytes {
        return Err(bad_request(format!(
            "File exceeds the {}MB size limit",
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(())
}

// ============ POST /general ============

#[derive(Deserialize)]
struct GeneralChatRequest {
    message: Option<String>,
    history: Option<Vec<ChatMessage>>,
}

#[derive(Serialize)]
struct GeneralChatResponse {
    response: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

async fn handle_general(
    State(state): State<AppState>,
    Json(request): Json<GeneralChatRequest>,
) -> Result<Json<GeneralChatResponse>, AppError> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| bad_request("Message is required"))?;

    let history = request.history.unwrap_or_default();

    let response = answer::general_chat(
        state.provider.as_ref(),
        &state.config.completion,
        message,
        &history,
    )
    .await?;

    Ok(Json(GeneralChatResponse {
        response,
        kind: "general",
    }))
}

// ============ POST /docs-qa ============

#[derive(Deserialize)]
struct DocsQaRequest {
    question: Option<String>,
}

#[derive(Serialize)]
struct DocsQaResponse {
    answer: String,
    sources: Vec<String>,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "documentsFound")]
    documents_found: usize,
}

async fn handle_docs_qa(
    State(state): State<AppState>,
    Json(request): Json<DocsQaRequest>,
) -> Result<Json<DocsQaResponse>, AppError> {
    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| bad_request("Question is required"))?;

    let documents = state.store.list();
    let matched = matcher::find_relevant(&documents, &state.config.topics, question);

    tracing::debug!(question, matched = matched.len(), "document match");

    if matched.is_empty() {
        return Ok(Json(DocsQaResponse {
            answer: NO_DOCUMENTS_MESSAGE.to_string(),
            sources: Vec::new(),
            kind: "docs-qa",
            documents_found: 0,
        }));
    }

    let documents_found = matched.len();
    let qa = answer::answer_question(
        state.provider.as_ref(),
        &state.config.completion,
        question,
        &matched,
    )
    .await?;

    Ok(Json(DocsQaResponse {
        answer: qa.answer,
        sources: qa.sources,
        kind: "docs-qa",
        documents_found,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, DocumentStore) {
        let tmp = TempDir::new().unwrap();
        let config = crate::config::DocumentsConfig {
            dir: tmp.path().to_path_buf(),
            extensions: vec!["txt".to_string()],
            max_upload_bytes: 5 * 1024 * 1024,
            preview_chars: 200,
        };
        let store = DocumentStore::new(&config);
        (tmp, store)
    }

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_upload_txt_within_limit_accepted() {
        let (_tmp, store) = store();
        assert!(validate_upload(&store, "notes.txt", Some("text/plain"), 4 * MB, 5 * MB).is_ok());
    }

    #[test]
    fn test_upload_binary_rejected_regardless_of_size() {
        let (_tmp, store) = store();
        let err =
            validate_upload(&store, "notes.bin", Some("application/octet-stream"), 10, 5 * MB)
                .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains(".txt"));
    }

    #[test]
    fn test_upload_oversize_rejected_with_size_error() {
        let (_tmp, store) = store();
        let err =
            validate_upload(&store, "big.txt", Some("text/plain"), 6 * MB, 5 * MB).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("size limit"));
    }

    #[test]
    fn test_upload_extensionless_plain_text_accepted() {
        let (_tmp, store) = store();
        // Stored with the text extension appended by the store.
        assert!(validate_upload(&store, "notes", Some("text/plain"), 10, 5 * MB).is_ok());
        // Without a plain-text content type an unrecognized name is rejected.
        assert!(validate_upload(&store, "notes", None, 10, 5 * MB).is_err());
    }

    #[test]
    fn test_completion_error_maps_to_500_with_stable_body() {
        let err: AppError = CompletionError::QuotaExceeded.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message,
            "OpenAI API quota exceeded. Please check your plan and billing details."
        );
    }
}
