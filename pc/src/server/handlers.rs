//! Route handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::AppState;
use super::error::ApiError;
use crate::domain::{BuildPromptResult, PitchContext, PitchResult, TimestampedCodePrompt};
use crate::generator::GenerateError;
use crate::store::{DEFAULT_PAGE_LIMIT, Page, PitchRecord, PitchStore};
use crate::validation::{IdeaLimit, validate};

/// Successful response envelope
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    data: T,
}

impl<T> Success<T> {
    fn json(data: T) -> Json<Self> {
        Json(Self { success: true, data })
    }
}

/// Validate the raw body and pull out the idea text and pitch context
///
/// Only returns once the body has passed validation, so the idea is a string
/// and any context has the right shape.
fn checked_input(body: &Value, limit: IdeaLimit, with_context: bool) -> Result<(String, Option<PitchContext>), ApiError> {
    let idea = body.get("idea");
    let context = if with_context { body.get("pitchData") } else { None };

    let validation = validate(idea, context, limit);
    if !validation.is_valid {
        return Err(GenerateError::Validation(validation).into());
    }

    let idea = idea.and_then(Value::as_str).unwrap_or_default().to_string();
    let context = match context {
        Some(Value::Null) | None => None,
        Some(value) => serde_json::from_value::<PitchContext>(value.clone())
            .inspect_err(|e| warn!("Ignoring unreadable pitch data: {}", e))
            .ok(),
    };
    Ok((idea, context))
}

/// POST /generate
pub async fn generate_pitch(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Success<PitchResult>>, ApiError> {
    debug!("generate_pitch: called");
    let Json(body) = body?;
    let (idea, _) = checked_input(&body, IdeaLimit::Standard, false)?;

    let pitch = state.generators.pitch.generate(&idea).await?;

    if let Some(store) = state.store.clone() {
        let (idea, record) = (idea.clone(), pitch.clone());
        let saved = tokio::task::spawn_blocking(move || store.save(&idea, &record)).await;
        match saved {
            Ok(Ok(record)) => debug!(id = %record.id, "generate_pitch: stored"),
            Ok(Err(e)) => warn!("Failed to store pitch: {}", e),
            Err(e) => warn!("Pitch store task failed: {}", e),
        }
    }

    Ok(Success::json(pitch))
}

/// POST /code-prompt
pub async fn code_prompt(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Success<TimestampedCodePrompt>>, ApiError> {
    debug!("code_prompt: called");
    let Json(body) = body?;
    let (idea, context) = checked_input(&body, IdeaLimit::Standard, true)?;

    let result = state.generators.code_prompt.generate(&idea, context.as_ref()).await?;
    Ok(Success::json(result.into()))
}

/// POST /buildprompt
pub async fn build_prompt(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Success<BuildPromptResult>>, ApiError> {
    debug!("build_prompt: called");
    let Json(body) = body?;
    let (idea, context) = checked_input(&body, IdeaLimit::Quick, true)?;

    let result = state.generators.build_prompt.generate(&idea, context.as_ref()).await?;
    Ok(Success::json(result))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

fn require_store(state: &AppState) -> Result<std::sync::Arc<PitchStore>, ApiError> {
    state.store.clone().ok_or(ApiError::StorageDisabled)
}

/// GET /history
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Success<Page>>, ApiError> {
    debug!(?query, "list_history: called");
    let store = require_store(&state)?;
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

    let page = tokio::task::spawn_blocking(move || store.list(page, limit))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))??;
    Ok(Success::json(page))
}

/// GET /history/:id
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Success<PitchRecord>>, ApiError> {
    debug!(%id, "get_history: called");
    let store = require_store(&state)?;

    let lookup = id.clone();
    let record = tokio::task::spawn_blocking(move || store.get(&lookup))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))??;
    record.map(Success::json).ok_or(ApiError::NotFound(id))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let remote = if state.generators.remote_configured() {
        "configured"
    } else {
        "unconfigured"
    };
    Json(json!({
        "status": "ok",
        "remote": remote,
        "storage": state.store.is_some(),
    }))
}
