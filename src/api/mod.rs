pub mod error;

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

pub use error::{ApiError, ErrorBody};

use crate::models::types::GenerationMode;
use crate::services::dispatcher::Dispatcher;

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    // Каждая запущенная задача обмена держит клон; канал закрывается, когда все завершились
    inflight: mpsc::Sender<()>,
}

/// Request body of both generate endpoints. A missing `prompt` is treated as
/// empty and rejected by validation.
#[derive(Debug, Deserialize)]
pub struct PromptBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/generate", post(generate_stub))
        .route("/generate-llama", post(generate_backend))
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` resolves, then drains
/// in-flight requests.
///
/// Returns only after every started exchange has finished, including those
/// whose client already went away, so the interaction log can be closed
/// right after.
pub async fn serve<F>(listener: TcpListener, dispatcher: Arc<Dispatcher>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "http: listening");

    let (inflight, mut drained) = mpsc::channel::<()>(1);
    let state = AppState { dispatcher, inflight };
    let served = axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await;

    // recv() вернёт None, когда последний отправитель будет удалён
    let _ = drained.recv().await;
    info!("http: in-flight exchanges drained");
    served
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "MiniVault API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "POST /generate - Generate a stub response for a prompt",
            "generate-llama": "POST /generate-llama - Generate a response with the local model backend",
            "health": "GET /health - Check API health"
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn generate_stub(
    State(state): State<AppState>,
    payload: Result<Json<PromptBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    generate(state, GenerationMode::Stub, payload).await
}

async fn generate_backend(
    State(state): State<AppState>,
    payload: Result<Json<PromptBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    generate(state, GenerationMode::Backend, payload).await
}

async fn generate(
    state: AppState,
    mode: GenerationMode,
    payload: Result<Json<PromptBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(body) = payload?;
    let prompt = body.prompt.unwrap_or_default();
    // Обмен доводится до конца даже после отключения клиента
    let dispatcher = Arc::clone(&state.dispatcher);
    let inflight = state.inflight.clone();
    let task = tokio::spawn(async move {
        let _inflight = inflight;
        dispatcher.handle(mode, &prompt).await
    });
    let result = task.await.map_err(|e| {
        error!(mode = %mode, error = %e, "dispatch task failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error while generating response")
    })??;
    Ok(Json(GenerateResponse { response: result.text }))
}
