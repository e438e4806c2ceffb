pub mod chat;
pub mod explore;
pub mod flashcards;
pub mod plan;
pub mod progress;
pub mod quiz;
pub mod topic;

use askama::Template;
use axum::{
  extract::State,
  http::{header, StatusCode},
  response::{Html, IntoResponse, Redirect, Response},
  Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::db::{self, try_lock, LogOnError};
use crate::export::MarkdownFile;
use crate::state::AppState;
use crate::study::{StudyError, StudyState};

/// JSON error body with the status matching the failure
#[derive(Debug)]
pub struct ApiError {
  status: StatusCode,
  message: String,
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self {
      status: StatusCode::BAD_REQUEST,
      message: message.into(),
    }
  }
}

impl From<StudyError> for ApiError {
  fn from(e: StudyError) -> Self {
    let status = match &e {
      StudyError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
      StudyError::NoTopic | StudyError::NotStarted(_) | StudyError::Busy | StudyError::Stale => {
        StatusCode::CONFLICT
      }
      StudyError::NotFound(_) => StatusCode::NOT_FOUND,
      StudyError::Service { .. } => StatusCode::BAD_GATEWAY,
      StudyError::Storage(_) | StudyError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Self {
      status,
      message: e.to_string(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status, Json(json!({ "error": self.message }))).into_response()
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Redirect after a page form. Service failures are already recorded in the
/// state store and shown by the page, anything else is answered directly.
pub(crate) fn redirect_or_error<T>(result: Result<T, StudyError>, to: &str) -> Response {
  match result {
    Ok(_) | Err(StudyError::Service { .. }) => Redirect::to(to).into_response(),
    Err(e) => ApiError::from(e).into_response(),
  }
}

/// Filename safe to place inside a quoted `Content-Disposition` parameter
fn quoted_filename(name: &str) -> String {
  name
    .chars()
    .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
    .collect()
}

pub(crate) fn markdown_download(file: MarkdownFile) -> Response {
  (
    [
      (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", quoted_filename(&file.filename)),
      ),
    ],
    file.content,
  )
    .into_response()
}

pub(crate) fn snapshot(state: &AppState) -> ApiResult<StudyState> {
  Ok(state.study.snapshot()?)
}

pub(crate) fn format_relative_time(dt: DateTime<Utc>) -> String {
  let now = Utc::now();
  let duration = dt.signed_duration_since(now);

  let minutes = duration.num_minutes();
  let hours = duration.num_hours();
  let days = duration.num_days();

  if minutes < 1 {
    "now".to_string()
  } else if minutes < 60 {
    format!("in {} minute{}", minutes, if minutes == 1 { "" } else { "s" })
  } else if hours < 24 {
    format!("in {} hour{}", hours, if hours == 1 { "" } else { "s" })
  } else if days == 1 {
    "tomorrow".to_string()
  } else {
    format!("in {} days", days)
  }
}

pub struct TaskView {
  pub index: usize,
  pub content: String,
  pub completed: bool,
}

pub struct DayView {
  pub day: u32,
  pub topic: String,
  pub objective: String,
  pub tasks: Vec<TaskView>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub topic: Option<String>,
  pub duration: String,
  pub days: Vec<DayView>,
  pub percentage: u32,
  pub streak: u32,
  pub error: Option<String>,
  pub busy: bool,
}

pub async fn index(State(state): State<AppState>) -> Response {
  let study = match snapshot(&state) {
    Ok(study) => study,
    Err(e) => return e.into_response(),
  };

  let streak = match try_lock(&state.db) {
    Ok(conn) => db::load_streak(&conn, Utc::now().date_naive()).log_warn_default("Failed to load streak"),
    Err(_) => 0,
  };

  let (days, percentage) = match &study.plan {
    Some(plan) => {
      let days = plan
        .days
        .iter()
        .map(|d| DayView {
          day: d.day,
          topic: d.topic.clone(),
          objective: d.objective.clone(),
          tasks: d
            .tasks
            .iter()
            .enumerate()
            .map(|(index, t)| TaskView {
              index,
              content: t.content.clone(),
              completed: plan.is_completed(d.day, index),
            })
            .collect(),
        })
        .collect();
      (days, plan.summary().percentage)
    }
    None => (vec![], 0),
  };

  let template = IndexTemplate {
    busy: study.is_busy(),
    topic: study.topic,
    duration: study.duration.unwrap_or_default(),
    days,
    percentage,
    streak,
    error: study.error,
  };

  Html(template.render().unwrap_or_default()).into_response()
}

/// Everything the study session currently holds, for client-side views
pub async fn api_state(State(state): State<AppState>) -> ApiResult<Json<StudyState>> {
  Ok(Json(snapshot(&state)?))
}

pub use chat::{
  chat_export, chat_rephrase, chat_send, chat_start, interview_export, interview_send,
  interview_start,
};
pub use explore::{find_resources, mind_map, summarize, summarize_clear};
pub use flashcards::{
  flashcards_page, generate_flashcards, review_end, review_grade, review_start,
};
pub use plan::{create_plan, export_plan, reorder_tasks, set_task};
pub use progress::progress;
pub use quiz::{create_quiz, quiz_clear, quiz_redemption, quiz_review, submit_quiz};
pub use topic::{topic_analogy, topic_clear, topic_content, topic_rephrase};

#[cfg(test)]
mod tests {
  use super::*;
  use axum::body::to_bytes;
  use chrono::Duration;

  #[test]
  fn test_format_relative_time() {
    assert_eq!(format_relative_time(Utc::now() - Duration::hours(1)), "now");
    assert_eq!(format_relative_time(Utc::now() + Duration::minutes(30) + Duration::seconds(5)), "in 30 minutes");
    assert_eq!(format_relative_time(Utc::now() + Duration::hours(3) + Duration::seconds(5)), "in 3 hours");
    assert_eq!(format_relative_time(Utc::now() + Duration::days(3) + Duration::seconds(5)), "in 3 days");
  }

  #[test]
  fn test_error_status_mapping() {
    let cases = [
      (StudyError::Invalid("Topic must not be empty"), StatusCode::UNPROCESSABLE_ENTITY),
      (StudyError::NoTopic, StatusCode::CONFLICT),
      (StudyError::Busy, StatusCode::CONFLICT),
      (StudyError::NotFound("Quiz"), StatusCode::NOT_FOUND),
      (StudyError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).status, status);
    }
  }

  #[tokio::test]
  async fn test_error_body_is_json() {
    let response = ApiError::from(StudyError::NoTopic).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"], "Create a study plan first");
  }

  #[test]
  fn test_download_filename_with_quotes_stays_one_parameter() {
    let response = markdown_download(MarkdownFile {
      filename: "Say_\"hi\"_to\\C_plan.md".to_string(),
      content: "# Plan".to_string(),
    });
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert_eq!(disposition, "attachment; filename=\"Say__hi__to_C_plan.md\"");
  }
}
