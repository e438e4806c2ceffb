use askama::Template;
use axum::{
  extract::{Query, State},
  response::{Html, IntoResponse, Redirect, Response},
  Form,
};
use chrono::Utc;
use serde::Deserialize;

use super::{format_relative_time, redirect_or_error, snapshot, ApiError};
use crate::db::{self, try_lock, LogOnError};
use crate::domain::{deck_key, Flashcard, ReviewGrade};
use crate::srs;
use crate::state::AppState;
use crate::study::{actions, Operation};

pub struct CardRow {
  pub term: String,
  pub definition: String,
  pub interval: u32,
  pub due: bool,
}

pub struct ReviewCard {
  pub term: String,
  pub definition: String,
  pub position: usize,
  pub total: usize,
}

#[derive(Template)]
#[template(path = "flashcards.html")]
pub struct FlashcardsTemplate {
  pub topic: Option<String>,
  pub cards: Vec<CardRow>,
  pub due_count: usize,
  pub next_review: Option<String>,
  pub current: Option<ReviewCard>,
  pub error: Option<String>,
  pub notice: Option<String>,
  pub generating: bool,
}

#[derive(Deserialize)]
pub struct PageQuery {
  pub notice: Option<String>,
}

pub async fn flashcards_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
  let study = match snapshot(&state) {
    Ok(study) => study,
    Err(e) => return e.into_response(),
  };
  let now = Utc::now();

  let deck: Vec<Flashcard> = match (&study.topic, try_lock(&state.db)) {
    (Some(topic), Ok(conn)) => db::load_deck(&conn, &deck_key(topic)).log_warn_default("Failed to load deck"),
    _ => vec![],
  };

  let due_count = srs::due_count(&deck, now);
  let next_review = if due_count == 0 {
    srs::next_review_time(&deck, now).map(format_relative_time)
  } else {
    None
  };

  let current = study
    .review
    .current()
    .zip(study.review.position())
    .map(|(card, (position, total))| ReviewCard {
      term: card.term.clone(),
      definition: card.definition.clone(),
      position,
      total,
    });

  let cards = deck
    .iter()
    .map(|c| CardRow {
      term: c.term.clone(),
      definition: c.definition.clone(),
      interval: c.interval,
      due: c.is_due(now),
    })
    .collect();

  let template = FlashcardsTemplate {
    generating: study.in_flight.contains(&Operation::Flashcards),
    topic: study.topic,
    cards,
    due_count,
    next_review,
    current,
    error: study.error,
    notice: query.notice,
  };

  Html(template.render().unwrap_or_default()).into_response()
}

#[derive(Deserialize)]
pub struct GenerateForm {
  #[serde(default)]
  pub sub_topic: Option<String>,
}

pub async fn generate_flashcards(State(state): State<AppState>, Form(form): Form<GenerateForm>) -> Response {
  let result = actions::generate_flashcards(&state, form.sub_topic.as_deref(), Utc::now()).await;
  redirect_or_error(result, "/flashcards")
}

pub async fn review_start(State(state): State<AppState>) -> Response {
  match actions::start_review(&state, Utc::now()) {
    Ok(true) => Redirect::to("/flashcards").into_response(),
    Ok(false) => {
      let notice = urlencoding::encode("No cards are due for review right now.");
      Redirect::to(&format!("/flashcards?notice={}", notice)).into_response()
    }
    Err(e) => ApiError::from(e).into_response(),
  }
}

#[derive(Deserialize)]
pub struct GradeForm {
  pub grade: String,
}

pub async fn review_grade(State(state): State<AppState>, Form(form): Form<GradeForm>) -> Response {
  let Some(grade) = ReviewGrade::from_str(&form.grade) else {
    return ApiError::bad_request(format!("Unknown grade: {}", form.grade)).into_response();
  };

  match actions::grade_card(&state, grade, Utc::now()) {
    Ok(outcome) if outcome.finished => {
      let notice = urlencoding::encode("Review session complete.");
      Redirect::to(&format!("/flashcards?notice={}", notice)).into_response()
    }
    result => redirect_or_error(result, "/flashcards"),
  }
}

pub async fn review_end(State(state): State<AppState>) -> Response {
  redirect_or_error(actions::end_review(&state), "/flashcards")
}
