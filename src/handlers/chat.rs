//! Tutor chat and mock interview, with replies streamed as server-sent events.

use axum::{
  extract::State,
  response::{
    sse::{Event, KeepAlive, Sse},
    Response,
  },
  Json,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::{markdown_download, snapshot, ApiError, ApiResult};
use crate::domain::{ChatMessage, Transcript};
use crate::export;
use crate::state::AppState;
use crate::study::actions::{self, ChatEvent, Conversation};
use crate::study::StudyError;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartChatRequest {
  #[serde(default)]
  pub initial_message: Option<String>,
}

#[derive(Deserialize)]
pub struct SendRequest {
  pub message: String,
}

#[derive(Deserialize)]
pub struct RephraseRequest {
  pub index: usize,
}

#[derive(Serialize)]
pub struct RephraseReply {
  pub index: usize,
  pub content: String,
}

/// Events: `chunk` (JSON string), `error` (JSON string), then `done`.
fn reply_events(rx: mpsc::Receiver<ChatEvent>) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
  let stream = ReceiverStream::new(rx).map(|event| match event {
    ChatEvent::Chunk(text) => Event::default().event("chunk").json_data(text),
    ChatEvent::Failed(message) => Event::default().event("error").json_data(message),
    ChatEvent::Done => Ok(Event::default().event("done").data("[DONE]")),
  });
  Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn chat_start(
  State(state): State<AppState>,
  body: Option<Json<StartChatRequest>>,
) -> ApiResult<Json<Transcript>> {
  let req = body.map(|Json(req)| req).unwrap_or_default();
  let transcript = actions::start_chat(&state, req.initial_message.as_deref())?;
  Ok(Json(transcript))
}

pub async fn chat_send(
  State(state): State<AppState>,
  Json(req): Json<SendRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
  let rx = actions::send_message(&state, Conversation::Chat, &req.message)?;
  Ok(reply_events(rx))
}

pub async fn chat_rephrase(
  State(state): State<AppState>,
  Json(req): Json<RephraseRequest>,
) -> ApiResult<Json<RephraseReply>> {
  let content = actions::rephrase_chat_message(&state, req.index).await?;
  Ok(Json(RephraseReply { index: req.index, content }))
}

pub async fn interview_start(State(state): State<AppState>) -> ApiResult<Json<Transcript>> {
  Ok(Json(actions::start_interview(&state)?))
}

pub async fn interview_send(
  State(state): State<AppState>,
  Json(req): Json<SendRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
  let rx = actions::send_message(&state, Conversation::Interview, &req.message)?;
  Ok(reply_events(rx))
}

fn export_transcript(state: &AppState, conversation: Conversation) -> ApiResult<Response> {
  let study = snapshot(state)?;
  let topic = study.topic.ok_or(ApiError::from(StudyError::NoTopic))?;
  let (transcript, render): (Transcript, fn(&str, &[ChatMessage]) -> export::MarkdownFile) = match conversation {
    Conversation::Chat => (study.chat, export::chat_markdown),
    Conversation::Interview => (study.interview, export::interview_markdown),
  };
  if transcript.messages.is_empty() {
    return Err(ApiError::from(StudyError::NotFound("Conversation")));
  }
  Ok(markdown_download(render(&topic, &transcript.messages)))
}

pub async fn chat_export(State(state): State<AppState>) -> ApiResult<Response> {
  export_transcript(&state, Conversation::Chat)
}

pub async fn interview_export(State(state): State<AppState>) -> ApiResult<Response> {
  export_transcript(&state, Conversation::Interview)
}
