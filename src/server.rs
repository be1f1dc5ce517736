//! HTTP surface: `POST /chat` for tutoring turns, `POST /ocr` for worksheet photos.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::error::{PayloadError, TutorError};
use crate::lexicon::Language;
use crate::state::LearningState;
use crate::tutor::{TurnReply, Tutor};
use crate::worksheet::{
    clean_image_payload, scan_worksheet, ProblemStructurer, ScanResult, TextDetector,
};

pub struct AppState {
    pub tutor: Tutor,
    pub detector: Arc<dyn TextDetector>,
    pub structurer: Arc<dyn ProblemStructurer>,
    pub max_image_base64: usize,
    pub max_body_bytes: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: message.into() }))
}

/// The problem may arrive as plain text or as a structured problem object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProblemField {
    Text(String),
    Object {
        question: Option<String>,
        text: Option<String>,
    },
}

impl ProblemField {
    fn into_text(self) -> String {
        match self {
            ProblemField::Text(text) => text,
            ProblemField::Object { question, text } => question
                .filter(|q| !q.is_empty())
                .or(text)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    problem: Option<ProblemField>,
    message: Option<String>,
    language: Option<String>,
    learning_state: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrRequest {
    image_base64: Option<String>,
}

#[axum::debug_handler]
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<TurnReply>, ApiError> {
    let problem_text = body.problem.map(ProblemField::into_text).unwrap_or_default();
    let message = body.message.unwrap_or_default();
    let language = Language::from_code(body.language.as_deref());
    // Anything that isn't a state object starts a fresh session.
    let prior = body
        .learning_state
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value::<LearningState>(v).ok());

    match state.tutor.next_turn(&problem_text, &message, language, prior).await {
        Ok(reply) => Ok(Json(reply)),
        Err(TutorError::EmptyMessage) => Err(api_error(
            StatusCode::BAD_REQUEST,
            "message is required",
        )),
    }
}

#[axum::debug_handler]
async fn ocr(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OcrRequest>,
) -> Result<Json<ScanResult>, ApiError> {
    let image = clean_image_payload(
        body.image_base64.as_deref().unwrap_or_default(),
        state.max_image_base64,
    )
    .map_err(|e| {
        let status = match e {
            PayloadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            PayloadError::Missing | PayloadError::InvalidBase64 => StatusCode::BAD_REQUEST,
        };
        api_error(status, e.to_string())
    })?;

    info!(base64_len = image.len(), "Processing image");
    match scan_worksheet(state.detector.as_ref(), state.structurer.as_ref(), &image).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!(error = %e, "Worksheet scan failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process image",
            ))
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/chat", post(chat))
        .route("/ocr", post(ocr))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
