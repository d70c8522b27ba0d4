use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::captioner::Captioner;
use crate::error::CaptionError;
use crate::page::INDEX_HTML;

#[derive(Clone)]
pub struct AppState {
    pub captioner: Captioner,
}

#[derive(Debug, Default, Deserialize)]
pub struct CaptionBody {
    #[serde(default)]
    pub image: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptionResponse {
    pub caption: String,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn create_caption(
    State(state): State<AppState>,
    body: Result<Json<CaptionBody>, JsonRejection>,
) -> Result<Json<CaptionResponse>, CaptionError> {
    state.captioner.ensure_configured()?;
    let Json(body) = body.map_err(|rejection| CaptionError::InvalidBody(rejection.body_text()))?;

    let caption = state.captioner.caption(body.image.as_ref()).await?;
    Ok(Json(CaptionResponse { caption }))
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/caption", post(create_caption))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
