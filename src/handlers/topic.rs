use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::state::AppState;
use crate::study::actions;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRequest {
  pub sub_topic: String,
}

#[derive(Deserialize)]
pub struct AnalogyRequest {
  pub concept: String,
}

#[derive(Serialize)]
pub struct MarkdownReply {
  pub content: String,
}

pub async fn topic_content(
  State(state): State<AppState>,
  Json(req): Json<TopicRequest>,
) -> ApiResult<Json<MarkdownReply>> {
  let content = actions::load_topic_content(&state, &req.sub_topic).await?;
  Ok(Json(MarkdownReply { content }))
}

pub async fn topic_rephrase(State(state): State<AppState>) -> ApiResult<Json<MarkdownReply>> {
  let content = actions::rephrase_topic_content(&state).await?;
  Ok(Json(MarkdownReply { content }))
}

pub async fn topic_analogy(
  State(state): State<AppState>,
  Json(req): Json<AnalogyRequest>,
) -> ApiResult<Json<MarkdownReply>> {
  let content = actions::topic_analogy(&state, &req.concept).await?;
  Ok(Json(MarkdownReply { content }))
}

pub async fn topic_clear(State(state): State<AppState>) -> ApiResult<StatusCode> {
  actions::clear_topic(&state)?;
  Ok(StatusCode::NO_CONTENT)
}
