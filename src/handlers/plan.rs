use axum::{
  extract::State,
  http::StatusCode,
  response::Response,
  Form, Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{markdown_download, redirect_or_error, snapshot, ApiError, ApiResult};
use crate::export;
use crate::state::AppState;
use crate::study::actions::{self, TaskProgress};
use crate::study::StudyError;

#[derive(Deserialize)]
pub struct PlanForm {
  pub topic: String,
  pub duration: String,
}

pub async fn create_plan(State(state): State<AppState>, Form(form): Form<PlanForm>) -> Response {
  let result = actions::create_plan(&state, &form.topic, &form.duration).await;
  redirect_or_error(result, "/")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
  pub day: u32,
  pub old_index: usize,
  pub new_index: usize,
}

pub async fn reorder_tasks(
  State(state): State<AppState>,
  Json(req): Json<ReorderRequest>,
) -> ApiResult<StatusCode> {
  actions::reorder_tasks(&state, req.day, req.old_index, req.new_index)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
  pub day: u32,
  pub task_index: usize,
  pub completed: bool,
}

pub async fn set_task(State(state): State<AppState>, Json(req): Json<TaskRequest>) -> ApiResult<Json<TaskProgress>> {
  let today = Utc::now().date_naive();
  let progress = actions::set_task_completion(&state, req.day, req.task_index, req.completed, today)?;
  Ok(Json(progress))
}

pub async fn export_plan(State(state): State<AppState>) -> ApiResult<Response> {
  let study = snapshot(&state)?;
  let (Some(topic), Some(plan)) = (study.topic, study.plan) else {
    return Err(ApiError::from(StudyError::NotFound("Study plan")));
  };
  Ok(markdown_download(export::plan_markdown(&topic, &plan)))
}
