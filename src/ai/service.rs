//! Study content generation on top of a [`TextModel`].

use std::sync::Arc;

use super::model::{GenerateRequest, TextModel, TextStream};
use super::{parse, prompts, AiError};
use crate::config;
use crate::domain::{
  dedupe_resources, incorrect_questions, CardDraft, ChatMessage, MindMapNode, PersonalizedReview,
  QuizQuestion, ResourceItem, StudyPlanDay,
};

#[derive(Clone)]
pub struct ContentService {
  model: Arc<dyn TextModel>,
}

impl ContentService {
  pub fn new(model: Arc<dyn TextModel>) -> Self {
    Self { model }
  }

  async fn text(&self, request: GenerateRequest) -> Result<String, AiError> {
    Ok(self.model.generate(request).await?.text)
  }

  pub async fn study_plan(&self, topic: &str, duration: &str) -> Result<Vec<StudyPlanDay>, AiError> {
    tracing::info!(topic, duration, "Generating study plan");
    let request =
      GenerateRequest::prompt(prompts::study_plan(topic, duration)).with_schema(prompts::study_plan_schema());
    parse::parse_study_plan(&self.text(request).await?)
  }

  pub async fn topic_content(&self, topic: &str) -> Result<String, AiError> {
    tracing::info!(topic, "Generating topic explanation");
    self.text(GenerateRequest::prompt(prompts::topic_content(topic))).await
  }

  pub async fn summarize(&self, text: &str) -> Result<String, AiError> {
    tracing::info!(chars = text.len(), "Summarizing text");
    self.text(GenerateRequest::prompt(prompts::summary(text))).await
  }

  pub async fn quiz(&self, topic: &str, questions: usize) -> Result<Vec<QuizQuestion>, AiError> {
    tracing::info!(topic, questions, "Generating quiz");
    let request = GenerateRequest::prompt(prompts::quiz(topic, questions)).with_schema(prompts::quiz_schema());
    parse::parse_quiz(&self.text(request).await?)
  }

  pub async fn flashcards(&self, topic: &str) -> Result<Vec<CardDraft>, AiError> {
    tracing::info!(topic, "Generating flashcards");
    let request =
      GenerateRequest::prompt(prompts::flashcards(topic)).with_schema(prompts::flashcards_schema());
    parse::parse_flashcards(&self.text(request).await?)
  }

  /// Web sources found by a grounded search, deduplicated by uri
  pub async fn resources(&self, topic: &str) -> Result<Vec<ResourceItem>, AiError> {
    tracing::info!(topic, "Searching learning resources");
    let request = GenerateRequest::prompt(prompts::resources(topic)).with_web_search();
    let completion = self.model.generate(request).await?;
    Ok(dedupe_resources(completion.sources))
  }

  pub async fn analyze_quiz(
    &self,
    topic: &str,
    questions: &[QuizQuestion],
    answers: &[String],
  ) -> Result<String, AiError> {
    tracing::info!(topic, "Analyzing quiz results");
    let prompt = prompts::quiz_analysis(topic, questions, answers);
    self.text(GenerateRequest::prompt(prompt)).await
  }

  /// Review plan built from the incorrectly answered questions only
  pub async fn personalized_review(
    &self,
    topic: &str,
    questions: &[QuizQuestion],
    answers: &[String],
  ) -> Result<PersonalizedReview, AiError> {
    let incorrect = incorrect_questions(questions, answers);
    tracing::info!(topic, incorrect = incorrect.len(), "Generating personalized review");
    let request = GenerateRequest::prompt(prompts::personalized_review(topic, &incorrect))
      .with_schema(prompts::personalized_review_schema());
    parse::parse_personalized_review(&self.text(request).await?)
  }

  pub async fn rephrase(&self, text: &str) -> Result<String, AiError> {
    self.text(GenerateRequest::prompt(prompts::rephrase(text))).await
  }

  pub async fn mind_map(&self, topic: &str) -> Result<MindMapNode, AiError> {
    tracing::info!(topic, "Generating mind map");
    let text = self.text(GenerateRequest::prompt(prompts::mind_map(topic))).await?;
    parse::parse_mind_map(&text, config::MIND_MAP_MAX_DEPTH)
  }

  pub async fn analogy(&self, concept: &str) -> Result<String, AiError> {
    self.text(GenerateRequest::prompt(prompts::analogy(concept))).await
  }

  /// Stream the next model turn of a conversation.
  pub async fn chat_stream(&self, system: String, history: &[ChatMessage]) -> Result<TextStream, AiError> {
    tracing::debug!(turns = history.len(), "Streaming chat reply");
    self.model.stream(GenerateRequest::conversation(system, history)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Role;
  use crate::testing::{Scripted, ScriptedModel};
  use futures::StreamExt;

  fn service(replies: Vec<Scripted>) -> (ContentService, Arc<ScriptedModel>) {
    let model = Arc::new(ScriptedModel::new(replies));
    (ContentService::new(model.clone()), model)
  }

  fn question(q: &str, correct: &str) -> QuizQuestion {
    QuizQuestion {
      question: q.into(),
      options: vec!["a".into(), "b".into()],
      correct_answer: correct.into(),
      explanation: String::new(),
    }
  }

  #[tokio::test]
  async fn test_study_plan_requests_schema() {
    let (svc, model) = service(vec![Scripted::Text(
      r#"[{"day": 1, "topic": "Intro", "objective": "Begin", "tasks": ["Read"]}]"#.into(),
    )]);
    let plan = svc.study_plan("Rust", "1 week").await.unwrap();
    assert_eq!(plan[0].tasks[0].id, "task-1-0");

    let requests = model.requests.lock().unwrap();
    assert!(requests[0].response_schema.is_some());
    assert!(requests[0].contents[0].text.contains("\"Rust\""));
  }

  #[tokio::test]
  async fn test_malformed_quiz() {
    let (svc, _) = service(vec![Scripted::Text("no quiz today".into())]);
    let err = svc.quiz("Rust", 5).await.unwrap_err();
    assert!(matches!(err, AiError::Malformed { what: "quiz", .. }));
  }

  #[tokio::test]
  async fn test_personalized_review_sends_only_incorrect() {
    let (svc, model) = service(vec![Scripted::Text(r#"{"redemptionQuiz": []}"#.into())]);
    let questions = vec![question("kept right", "a"), question("got wrong", "b")];
    svc
      .personalized_review("Rust", &questions, &["a".into(), "a".into()])
      .await
      .unwrap();

    let prompt = model.requests.lock().unwrap()[0].contents[0].text.clone();
    assert!(prompt.contains("got wrong"));
    assert!(!prompt.contains("kept right"));
  }

  #[tokio::test]
  async fn test_chat_stream_passes_history_and_system() {
    let (svc, model) = service(vec![Scripted::Chunks(vec!["Hel".into(), "lo".into()])]);
    let history = vec![ChatMessage::user("hi")];
    let stream = svc.chat_stream("tutor".into(), &history).await.unwrap();
    let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
    assert_eq!(chunks.concat(), "Hello");

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests[0].system.as_deref(), Some("tutor"));
    assert_eq!(requests[0].contents[0].role, Role::User);
  }

  #[tokio::test]
  async fn test_failure_propagates() {
    let (svc, _) = service(vec![Scripted::Fail(AiError::MissingCredential)]);
    let err = svc.topic_content("Rust").await.unwrap_err();
    assert_eq!(err.to_string(), "API key not configured");
  }
}
