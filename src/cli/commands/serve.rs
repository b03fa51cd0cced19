//! HTTP API server for the meeting minutes pipeline.
//!
//! Provides REST endpoints for transcription, minutes generation, and PDF
//! rendering/download.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::ReferatError;
use crate::pipeline::Pipeline;
use crate::render::order_sections;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    std::fs::create_dir_all(settings.output_dir())?;
    std::fs::create_dir_all(settings.upload_dir())?;

    let pipeline = Pipeline::new(settings.clone())?;
    let state = Arc::new(AppState { pipeline, settings });

    let app = build_router(state.clone());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Referat API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcribe", "POST /transcribe");
    Output::kv("Minutes", "POST /meeting-minutes");
    Output::kv("Save as PDF", "POST /save-as-pdf");
    Output::kv("Download", "GET  /output/:filename");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_upload = state.settings.server.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(health))
        .route("/transcribe", post(transcribe))
        .route("/meeting-minutes", post(meeting_minutes))
        .route("/save-as-pdf", post(save_as_pdf))
        .route("/output/{filename}", get(download_output))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct MeetingMinutesRequest {
    transcription: Option<String>,
    chunk_size: Option<usize>,
}

#[derive(Deserialize)]
struct SaveAsPdfRequest {
    minutes: Option<HashMap<String, String>>,
    filename: Option<String>,
}

#[derive(Serialize)]
struct TranscribeResponse {
    transcription: String,
}

#[derive(Serialize)]
struct SaveAsPdfResponse {
    #[serde(rename = "pdfUrl")]
    pdf_url: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(msg: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(stage: &str, e: ReferatError) -> axum::response::Response {
    error!("{} failed: {}", stage, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return bad_request("audio file is missing"),
            Err(e) => return bad_request(&format!("Invalid multipart request: {}", e)),
        };

        if field.name() != Some("audio") {
            continue;
        }

        let file_name = sanitize_filename(field.file_name().unwrap_or("audio"));
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return bad_request(&format!("Failed to read upload: {}", e)),
        };

        let audio_path = state.settings.upload_dir().join(file_name);
        if let Err(e) = tokio::fs::write(&audio_path, &data).await {
            return internal_error("upload", e.into());
        }

        // The uploaded file is kept on disk; the transcription cache is keyed
        // by this path.
        return match state.pipeline.transcribe(&audio_path).await {
            Ok(transcription) => Json(TranscribeResponse { transcription }).into_response(),
            Err(e) => internal_error("transcription", e),
        };
    }
}

async fn meeting_minutes(
    State(state): State<Arc<AppState>>,
    Form(req): Form<MeetingMinutesRequest>,
) -> impl IntoResponse {
    let transcription = match req.transcription {
        Some(t) if !t.trim().is_empty() => t,
        _ => return bad_request("Transcription is missing"),
    };

    let minutes = match state
        .pipeline
        .generate_minutes(&transcription, req.chunk_size)
        .await
    {
        Ok(minutes) => minutes,
        Err(e @ ReferatError::InvalidInput(_)) => return bad_request(&e.to_string()),
        Err(e) => return internal_error("meeting minutes", e),
    };

    // Best-effort PDF alongside the JSON response; a render failure does not
    // fail the request.
    let pdf_path = state.settings.output_dir().join("meeting_minutes.pdf");
    if let Err(e) = state.pipeline.renderer().render(&minutes.sections(), &pdf_path) {
        warn!("Failed to render minutes PDF: {}", e);
    }

    Json(minutes).into_response()
}

async fn save_as_pdf(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveAsPdfRequest>,
) -> impl IntoResponse {
    let minutes = match req.minutes {
        Some(m) if !m.is_empty() => m,
        _ => return bad_request("Minutes data is missing"),
    };

    let filename = sanitize_filename(req.filename.as_deref().unwrap_or("meeting_minutes.pdf"));
    let pdf_path = state.settings.output_dir().join(&filename);

    match state
        .pipeline
        .renderer()
        .render(&order_sections(&minutes), &pdf_path)
    {
        Ok(()) => Json(SaveAsPdfResponse {
            pdf_url: format!("/output/{}", filename),
        })
        .into_response(),
        Err(e) => internal_error("save as PDF", e),
    }
}

async fn download_output(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(filename): axum::extract::Path<String>,
) -> impl IntoResponse {
    // Reject anything that does not survive sanitization unchanged.
    if sanitize_filename(&filename) != filename {
        return bad_request("Invalid filename");
    }

    let path = state.settings.output_dir().join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/pdf")],
            bytes,
        )
            .into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("File not found: {}", filename),
            }),
        )
            .into_response(),
    }
}

/// Restrict a client-supplied filename to a safe basename.
///
/// Keeps alphanumerics, dots, hyphens and underscores; everything else maps
/// to an underscore. Leading dots are stripped so the result can never be a
/// relative path component.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
