use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::ApiResult;
use crate::domain::{PersonalizedReview, QuizQuestion};
use crate::state::AppState;
use crate::study::actions::{self, QuizSubmission};

#[derive(Deserialize)]
pub struct SubmitRequest {
  pub answers: Vec<String>,
}

pub async fn create_quiz(State(state): State<AppState>) -> ApiResult<Json<Vec<QuizQuestion>>> {
  Ok(Json(actions::create_quiz(&state).await?))
}

pub async fn submit_quiz(
  State(state): State<AppState>,
  Json(req): Json<SubmitRequest>,
) -> ApiResult<Json<QuizSubmission>> {
  Ok(Json(actions::submit_quiz(&state, req.answers).await?))
}

pub async fn quiz_review(State(state): State<AppState>) -> ApiResult<Json<PersonalizedReview>> {
  Ok(Json(actions::personalized_review(&state).await?))
}

pub async fn quiz_redemption(State(state): State<AppState>) -> ApiResult<Json<Vec<QuizQuestion>>> {
  Ok(Json(actions::start_redemption_quiz(&state)?))
}

pub async fn quiz_clear(State(state): State<AppState>) -> ApiResult<StatusCode> {
  actions::clear_quiz(&state)?;
  Ok(StatusCode::NO_CONTENT)
}
