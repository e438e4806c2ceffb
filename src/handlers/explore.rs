//! Mind map, resource finder and summarizer

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::domain::{MindMapNode, ResourceItem};
use crate::state::AppState;
use crate::study::actions;

#[derive(Deserialize)]
pub struct SummarizeRequest {
  pub text: String,
}

#[derive(Serialize)]
pub struct SummaryReply {
  pub summary: String,
}

pub async fn mind_map(State(state): State<AppState>) -> ApiResult<Json<MindMapNode>> {
  Ok(Json(actions::generate_mind_map(&state).await?))
}

pub async fn find_resources(State(state): State<AppState>) -> ApiResult<Json<Vec<ResourceItem>>> {
  Ok(Json(actions::find_resources(&state).await?))
}

pub async fn summarize(
  State(state): State<AppState>,
  Json(req): Json<SummarizeRequest>,
) -> ApiResult<Json<SummaryReply>> {
  let summary = actions::summarize(&state, &req.text).await?;
  Ok(Json(SummaryReply { summary }))
}

pub async fn summarize_clear(State(state): State<AppState>) -> ApiResult<StatusCode> {
  actions::clear_summary(&state)?;
  Ok(StatusCode::NO_CONTENT)
}
