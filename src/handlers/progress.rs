use askama::Template;
use axum::{
  extract::State,
  response::{Html, IntoResponse, Response},
};
use chrono::Utc;

use super::snapshot;
use crate::db::{self, try_lock, LogOnError};
use crate::domain::{deck_key, ProgressSummary};
use crate::srs;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "progress.html")]
pub struct ProgressTemplate {
  pub topic: Option<String>,
  pub summary: Option<ProgressSummary>,
  pub streak: u32,
  pub deck_size: usize,
  pub due_count: usize,
  pub total_reviews: i64,
}

pub async fn progress(State(state): State<AppState>) -> Response {
  let study = match snapshot(&state) {
    Ok(study) => study,
    Err(e) => return e.into_response(),
  };
  let now = Utc::now();

  let mut template = ProgressTemplate {
    summary: study.plan.as_ref().map(|p| p.summary()),
    topic: study.topic,
    streak: 0,
    deck_size: 0,
    due_count: 0,
    total_reviews: 0,
  };

  if let Ok(conn) = try_lock(&state.db) {
    template.streak = db::load_streak(&conn, now.date_naive()).log_warn_default("Failed to load streak");
    if let Some(topic) = &template.topic {
      let key = deck_key(topic);
      let deck = db::load_deck(&conn, &key).log_warn_default("Failed to load deck");
      template.deck_size = deck.len();
      template.due_count = srs::due_count(&deck, now);
      template.total_reviews = db::count_reviews(&conn, &key).log_warn_default("Failed to count reviews");
    }
  }

  Html(template.render().unwrap_or_default()).into_response()
}
