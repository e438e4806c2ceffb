//! User-facing study operations.
//!
//! Each operation validates its input, updates the state store, calls the
//! content service without holding any lock, then applies the outcome.
//! Failures leave earlier content in place and record a readable message.

use chrono::{DateTime, NaiveDate, Utc};
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;

use super::{Operation, QuizState, StudyError, StudyState, StudyStore, TopicView};
use crate::ai::{prompts, AiError, ContentService};
use crate::config;
use crate::db::{self, try_lock};
use crate::domain::{
  deck_key, grade_quiz, ChatMessage, Flashcard, MindMapNode, PersonalizedReview, ProgressSummary,
  QuizQuestion, QuizResult, ResourceItem, ReviewGrade, StudyPlan, Transcript,
};
use crate::state::AppState;

const CHAT_EVENT_BUFFER: usize = 32;

fn require_text(value: &str, what: &'static str) -> Result<String, StudyError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    Err(StudyError::Invalid(what))
  } else {
    Ok(trimmed.to_string())
  }
}

// ==================== Plan ====================

/// Start a new topic: every per-topic result is discarded before the plan is requested.
pub async fn create_plan(app: &AppState, topic: &str, duration: &str) -> Result<StudyPlan, StudyError> {
  let topic = require_text(topic, "Topic must not be empty")?;
  let duration = require_text(duration, "Duration must not be empty")?;

  let (op, ()) = app.study.begin(Operation::Plan, |s| {
    s.reset_for_topic(topic.clone());
    Ok(())
  })?;

  match app.ai.study_plan(&topic, &duration).await {
    Ok(days) => op.apply(|s| {
      let plan = StudyPlan::new(days);
      s.plan = Some(plan.clone());
      s.duration = Some(duration);
      plan
    }),
    Err(e) => {
      let _ = op.apply(|s| s.topic = None);
      Err(op.fail(
        "Failed to create study plan. Please check your API key and try again.".to_string(),
        e,
      ))
    }
  }
}

pub fn reorder_tasks(app: &AppState, day: u32, old_index: usize, new_index: usize) -> Result<(), StudyError> {
  app.study.with(|s| {
    let plan = s.plan.as_mut().ok_or(StudyError::NoTopic)?;
    if plan.reorder_tasks(day, old_index, new_index) {
      Ok(())
    } else {
      Err(StudyError::NotFound("Task"))
    }
  })?
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskProgress {
  pub summary: ProgressSummary,
  pub streak: u32,
}

/// Mark a task done or not done. Completing a task counts toward today's streak.
pub fn set_task_completion(
  app: &AppState,
  day: u32,
  index: usize,
  completed: bool,
  today: NaiveDate,
) -> Result<TaskProgress, StudyError> {
  let summary = app.study.with(|s| {
    let plan = s.plan.as_mut().ok_or(StudyError::NoTopic)?;
    if !plan.set_completion(day, index, completed) {
      return Err(StudyError::NotFound("Task"));
    }
    Ok(plan.summary())
  })??;

  let conn = try_lock(&app.db)?;
  let streak = if completed {
    db::record_task_completion(&conn, today)?
  } else {
    db::load_streak(&conn, today)?
  };
  Ok(TaskProgress { summary, streak })
}

pub fn current_streak(app: &AppState, today: NaiveDate) -> Result<u32, StudyError> {
  let conn = try_lock(&app.db)?;
  Ok(db::load_streak(&conn, today)?)
}

// ==================== Topic Explanation ====================

pub async fn load_topic_content(app: &AppState, sub_topic: &str) -> Result<String, StudyError> {
  let sub_topic = require_text(sub_topic, "Topic must not be empty")?;
  let (op, ()) = app.study.begin(Operation::TopicContent, |s| {
    s.topic_view = TopicView {
      selected: Some(sub_topic.clone()),
      ..TopicView::default()
    };
    Ok(())
  })?;

  match app.ai.topic_content(&sub_topic).await {
    Ok(content) => op.apply(|s| {
      if s.topic_view.selected.as_deref() == Some(sub_topic.as_str()) {
        s.topic_view.content = Some(content.clone());
      }
      content
    }),
    Err(e) => Err(op.fail(
      format!("Failed to load content for \"{}\". Please try again.", sub_topic),
      e,
    )),
  }
}

/// Replace the shown explanation with a rephrased one.
pub async fn rephrase_topic_content(app: &AppState) -> Result<String, StudyError> {
  let (op, original) = app.study.begin(Operation::Rephrase, |s| {
    s.topic_view
      .content
      .clone()
      .ok_or(StudyError::NotFound("Topic content"))
  })?;

  match app.ai.rephrase(&original).await {
    Ok(text) => op.apply(|s| {
      if s.topic_view.content.as_deref() == Some(original.as_str()) {
        s.topic_view.content = Some(text.clone());
      }
      text
    }),
    Err(e) => Err(op.fail("Failed to rephrase content. Please try again.".to_string(), e)),
  }
}

pub async fn topic_analogy(app: &AppState, concept: &str) -> Result<String, StudyError> {
  let concept = require_text(concept, "Concept must not be empty")?;
  let (op, ()) = app.study.begin(Operation::Analogy, |s| {
    s.topic_view.analogy = None;
    Ok(())
  })?;

  match app.ai.analogy(&concept).await {
    Ok(text) => op.apply(|s| {
      s.topic_view.analogy = Some(text.clone());
      text
    }),
    Err(e) => Err(op.fail("Failed to generate analogy. Please try again.".to_string(), e)),
  }
}

pub fn clear_topic(app: &AppState) -> Result<(), StudyError> {
  app.study.with(|s| {
    s.topic_view = TopicView::default();
    s.error = None;
  })
}

// ==================== Conversations ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversation {
  Chat,
  Interview,
}

impl Conversation {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Chat => "chat",
      Self::Interview => "interview",
    }
  }

  fn transcript<'a>(&self, state: &'a mut StudyState) -> &'a mut Transcript {
    match self {
      Self::Chat => &mut state.chat,
      Self::Interview => &mut state.interview,
    }
  }

  fn instruction(&self, topic: &str) -> String {
    match self {
      Self::Chat => prompts::tutor_instruction(topic),
      Self::Interview => prompts::interviewer_instruction(topic),
    }
  }

  fn failure_message(&self) -> &'static str {
    match self {
      Self::Chat => "Failed to get response. Please try again.",
      Self::Interview => "Failed to get response from interviewer. Please try again.",
    }
  }
}

/// Start the tutor chat, optionally seeded with a user message.
///
/// Does nothing if the chat is already running.
pub fn start_chat(app: &AppState, initial_message: Option<&str>) -> Result<Transcript, StudyError> {
  app.study.with(|s| {
    s.require_topic()?;
    if !s.chat.started {
      let seed = initial_message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ChatMessage::user)
        .into_iter()
        .collect();
      s.chat = Transcript::start(seed);
    }
    Ok(s.chat.clone())
  })?
}

/// Start the mock interview with the interviewer's greeting.
pub fn start_interview(app: &AppState) -> Result<Transcript, StudyError> {
  app.study.with(|s| {
    let topic = s.require_topic()?.to_string();
    if !s.interview.started {
      s.interview = Transcript::start(vec![ChatMessage::model(prompts::interview_greeting(&topic))]);
    }
    Ok(s.interview.clone())
  })?
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
  Chunk(String),
  Failed(String),
  Done,
}

/// Send a user message and stream the model's reply.
///
/// The reply is produced by a background task that keeps the transcript
/// up to date even if the receiver is dropped.
pub fn send_message(
  app: &AppState,
  conversation: Conversation,
  message: &str,
) -> Result<mpsc::Receiver<ChatEvent>, StudyError> {
  let message = require_text(message, "Message must not be empty")?;

  let (system, history, epoch) = app.study.with(|s| {
    let topic = s.require_topic()?.to_string();
    let epoch = s.epoch;
    let transcript = conversation.transcript(s);
    if !transcript.started {
      return Err(StudyError::NotStarted(conversation.as_str()));
    }
    if !transcript.begin_exchange(message) {
      return Err(StudyError::Busy);
    }
    s.error = None;
    let history = conversation.transcript(s).model_history();
    Ok((conversation.instruction(&topic), history, epoch))
  })??;

  let (tx, rx) = mpsc::channel(CHAT_EVENT_BUFFER);
  let store = app.study.clone();
  let ai = app.ai.clone();

  tokio::spawn(async move {
    match stream_reply(&ai, &store, conversation, epoch, system, history, &tx).await {
      Ok(()) => {
        let _ = store.apply(epoch, |s| conversation.transcript(s).finish_exchange());
        let _ = tx.send(ChatEvent::Done).await;
      }
      Err(e) => {
        let _ = store.apply(epoch, |s| conversation.transcript(s).abort_exchange());
        let err = store.fail(epoch, conversation.failure_message().to_string(), e);
        let _ = tx.send(ChatEvent::Failed(err.to_string())).await;
      }
    }
  });

  Ok(rx)
}

async fn stream_reply(
  ai: &ContentService,
  store: &StudyStore,
  conversation: Conversation,
  epoch: u64,
  system: String,
  history: Vec<ChatMessage>,
  tx: &mpsc::Sender<ChatEvent>,
) -> Result<(), AiError> {
  let mut stream = ai.chat_stream(system, &history).await?;
  while let Some(chunk) = stream.next().await {
    let text = chunk?;
    if store
      .apply(epoch, |s| conversation.transcript(s).append_chunk(&text))
      .is_err()
    {
      // Topic changed; nobody is waiting for this reply any more
      return Ok(());
    }
    let _ = tx.send(ChatEvent::Chunk(text)).await;
  }
  Ok(())
}

/// Rephrase one model message of the tutor chat in place.
pub async fn rephrase_chat_message(app: &AppState, index: usize) -> Result<String, StudyError> {
  let (ticket, epoch) = app.study.with(|s| {
    let busy = s.chat.is_streaming(index) || s.chat.messages.get(index).is_some_and(|m| m.is_rephrasing);
    if busy {
      return Err(StudyError::Busy);
    }
    let ticket = s.chat.begin_rephrase(index).ok_or(StudyError::NotFound("Message"))?;
    Ok((ticket, s.epoch))
  })??;

  match app.ai.rephrase(&ticket.original).await {
    Ok(text) => {
      let replaced = app
        .study
        .apply(epoch, |s| s.chat.finish_rephrase(&ticket, Some(text.clone())))?;
      if !replaced {
        return Err(StudyError::NotFound("Message"));
      }
      Ok(text)
    }
    Err(e) => {
      let _ = app.study.apply(epoch, |s| s.chat.finish_rephrase(&ticket, None));
      Err(app.study.fail(epoch, "Failed to rephrase message. Please try again.".to_string(), e))
    }
  }
}

// ==================== Quiz ====================

/// Generate a fresh quiz; any previous quiz, analysis and review are dropped.
pub async fn create_quiz(app: &AppState) -> Result<Vec<QuizQuestion>, StudyError> {
  let (op, topic) = app.study.begin(Operation::Quiz, |s| {
    let topic = s.require_topic()?.to_string();
    s.quiz = None;
    Ok(topic)
  })?;

  match app.ai.quiz(&topic, config::QUIZ_QUESTION_COUNT).await {
    Ok(questions) => op.apply(|s| {
      s.quiz = Some(QuizState {
        questions: questions.clone(),
        ..QuizState::default()
      });
      questions
    }),
    Err(e) => Err(op.fail("Failed to generate quiz. Please try again.".to_string(), e)),
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizSubmission {
  pub result: QuizResult,
  /// Missing when the analysis request failed
  pub analysis: Option<String>,
}

/// Grade the answers and ask for a written analysis of the attempt.
pub async fn submit_quiz(app: &AppState, answers: Vec<String>) -> Result<QuizSubmission, StudyError> {
  let (op, (topic, questions, result)) = app.study.begin(Operation::QuizAnalysis, |s| {
    let topic = s.require_topic()?.to_string();
    let quiz = s.quiz.as_mut().ok_or(StudyError::NotFound("Quiz"))?;
    if quiz.result.is_some() {
      return Err(StudyError::Invalid("Quiz already submitted"));
    }
    let result = grade_quiz(&quiz.questions, &answers);
    quiz.answers = answers.clone();
    quiz.result = Some(result.clone());
    Ok((topic, quiz.questions.clone(), result))
  })?;

  let analysis = match app.ai.analyze_quiz(&topic, &questions, &answers).await {
    Ok(text) => {
      let _ = op.apply(|s| {
        if let Some(quiz) = s.quiz.as_mut() {
          quiz.analysis = Some(text.clone());
        }
      });
      Some(text)
    }
    Err(e) => {
      op.fail("Failed to analyze quiz results.".to_string(), e);
      None
    }
  };

  Ok(QuizSubmission { result, analysis })
}

pub async fn personalized_review(app: &AppState) -> Result<PersonalizedReview, StudyError> {
  let (op, (topic, questions, answers)) = app.study.begin(Operation::PersonalizedReview, |s| {
    let topic = s.require_topic()?.to_string();
    let quiz = s.quiz.as_mut().ok_or(StudyError::NotFound("Quiz"))?;
    let result = quiz
      .result
      .as_ref()
      .ok_or(StudyError::Invalid("Submit the quiz first"))?;
    if result.is_perfect() {
      return Err(StudyError::Invalid("Every answer was correct, there is nothing to review"));
    }
    quiz.review = None;
    Ok((topic, quiz.questions.clone(), quiz.answers.clone()))
  })?;

  match app.ai.personalized_review(&topic, &questions, &answers).await {
    Ok(review) => op.apply(|s| {
      if let Some(quiz) = s.quiz.as_mut() {
        quiz.review = Some(review.clone());
      }
      review
    }),
    Err(e) => Err(op.fail("Failed to generate personalized review.".to_string(), e)),
  }
}

/// Replace the quiz with the review's redemption questions.
pub fn start_redemption_quiz(app: &AppState) -> Result<Vec<QuizQuestion>, StudyError> {
  app.study.with(|s| {
    let quiz = s.quiz.as_mut().ok_or(StudyError::NotFound("Quiz"))?;
    let review = quiz
      .review
      .take()
      .ok_or(StudyError::NotFound("Personalized review"))?;
    if review.redemption_quiz.is_empty() {
      quiz.review = Some(review);
      return Err(StudyError::Invalid("The review has no redemption questions"));
    }
    *quiz = QuizState {
      questions: review.redemption_quiz,
      ..QuizState::default()
    };
    Ok(quiz.questions.clone())
  })?
}

pub fn clear_quiz(app: &AppState) -> Result<(), StudyError> {
  app.study.with(|s| s.quiz = None)
}

// ==================== Flashcards ====================

fn current_deck_key(app: &AppState) -> Result<String, StudyError> {
  app.study.with(|s| s.require_topic().map(deck_key))?
}

pub fn load_deck(app: &AppState) -> Result<Vec<Flashcard>, StudyError> {
  let key = current_deck_key(app)?;
  let conn = try_lock(&app.db)?;
  Ok(db::load_deck(&conn, &key)?)
}

/// Generate cards for the topic (or one of its sub-topics) and add the new terms to its deck.
pub async fn generate_flashcards(
  app: &AppState,
  sub_topic: Option<&str>,
  now: DateTime<Utc>,
) -> Result<Vec<Flashcard>, StudyError> {
  let sub_topic = sub_topic.map(str::trim).filter(|t| !t.is_empty());
  let (op, (key, target)) = app.study.begin(Operation::Flashcards, |s| {
    let topic = s.require_topic()?;
    let target = sub_topic.unwrap_or(topic).to_string();
    Ok((deck_key(topic), target))
  })?;

  let drafts = match app.ai.flashcards(&target).await {
    Ok(drafts) => drafts,
    Err(e) => {
      return Err(op.fail(
        format!("Failed to generate flashcards for \"{}\". Please try again.", target),
        e,
      ))
    }
  };

  let conn = try_lock(&app.db)?;
  let inserted = db::add_drafts(&conn, &key, drafts, now)?;
  tracing::info!(deck = %key, added = inserted.len(), "Flashcards added");
  Ok(inserted)
}

/// Begin reviewing the cards due now. Returns false when nothing is due.
pub fn start_review(app: &AppState, now: DateTime<Utc>) -> Result<bool, StudyError> {
  let deck = load_deck(app)?;
  app.study.with(|s| s.review.start(&deck, now))
}

#[derive(Debug, Clone, Serialize)]
pub struct GradedCard {
  pub card: Flashcard,
  pub finished: bool,
}

/// Grade the card under review, persist its new schedule and move on.
pub fn grade_card(app: &AppState, grade: ReviewGrade, now: DateTime<Utc>) -> Result<GradedCard, StudyError> {
  app.study.with(|s| {
    let key = deck_key(s.require_topic()?);
    let card_id = s.review.current().ok_or(StudyError::NotStarted("review"))?.id;
    let conn = try_lock(&app.db)?;
    if db::get_flashcard(&conn, &key, card_id)?.is_none() {
      return Err(StudyError::NotFound("Flashcard"));
    }

    let before = s.review.clone();
    let updated = s.review.grade(grade, now).ok_or(StudyError::NotStarted("review"))?;
    if let Err(e) = db::save_review(&conn, &updated, grade, now) {
      s.review = before;
      return Err(e.into());
    }
    Ok(GradedCard {
      card: updated,
      finished: !s.review.is_active(),
    })
  })?
}

/// Stop reviewing without grading the remaining cards.
pub fn end_review(app: &AppState) -> Result<(), StudyError> {
  app.study.with(|s| s.review.end())
}

// ==================== Other Modes ====================

pub async fn generate_mind_map(app: &AppState) -> Result<MindMapNode, StudyError> {
  let (op, topic) = app.study.begin(Operation::MindMap, |s| {
    let topic = s.require_topic()?.to_string();
    s.mind_map = None;
    Ok(topic)
  })?;

  match app.ai.mind_map(&topic).await {
    Ok(map) => op.apply(|s| {
      s.mind_map = Some(map.clone());
      map
    }),
    Err(e) => Err(op.fail("Failed to generate mind map. Please try again.".to_string(), e)),
  }
}

pub async fn find_resources(app: &AppState) -> Result<Vec<ResourceItem>, StudyError> {
  let (op, topic) = app.study.begin(Operation::Resources, |s| {
    Ok(s.require_topic()?.to_string())
  })?;

  match app.ai.resources(&topic).await {
    Ok(resources) => op.apply(|s| {
      s.resources = resources.clone();
      resources
    }),
    Err(e) => Err(op.fail(
      format!("Failed to find resources for \"{}\". Please try again.", topic),
      e,
    )),
  }
}

pub async fn summarize(app: &AppState, text: &str) -> Result<String, StudyError> {
  let text = require_text(text, "Text must not be empty")?;
  let (op, ()) = app.study.begin(Operation::Summary, |s| {
    s.summary = None;
    Ok(())
  })?;

  match app.ai.summarize(&text).await {
    Ok(summary) => op.apply(|s| {
      s.summary = Some(summary.clone());
      summary
    }),
    Err(e) => Err(op.fail("Failed to generate summary. Please try again.".to_string(), e)),
  }
}

pub fn clear_summary(app: &AppState) -> Result<(), StudyError> {
  app.study.with(|s| {
    s.summary = None;
    s.error = None;
  })
}
