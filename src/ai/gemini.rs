//! Gemini REST backend (Generative Language API).

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::model::{Completion, GenerateRequest, TextModel, TextStream};
use super::AiError;
use crate::config::AiSettings;
use crate::domain::ResourceItem;

const STREAM_BUFFER: usize = 32;

pub struct GeminiClient {
  client: Client,
  base_url: String,
  model: String,
  api_key: Option<String>,
}

impl GeminiClient {
  pub fn new(settings: &AiSettings) -> Self {
    GeminiClient {
      client: Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .unwrap_or_default(),
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      model: settings.model.clone(),
      api_key: settings.api_key.clone(),
    }
  }

  fn api_key(&self) -> Result<&str, AiError> {
    self.api_key.as_deref().ok_or(AiError::MissingCredential)
  }

  async fn post(&self, url: String, request: &GenerateRequest) -> Result<reqwest::Response, AiError> {
    let api_key = self.api_key()?;
    tracing::debug!(model = %self.model, web_search = request.web_search, "Gemini request");

    let response = self
      .client
      .post(&url)
      .header("x-goog-api-key", api_key)
      .json(&request_body(request))
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status().as_u16();
      let body = response.text().await.unwrap_or_default();
      let message = api_error_message(&body);
      tracing::error!("Gemini error {}: {}", status, message);
      return Err(AiError::Api { status, message });
    }
    Ok(response)
  }
}

#[async_trait]
impl TextModel for GeminiClient {
  async fn generate(&self, request: GenerateRequest) -> Result<Completion, AiError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let response = self.post(url, &request).await?;
    let body: Value = response
      .json()
      .await
      .map_err(|e| AiError::malformed("model response", e))?;
    parse_completion(&body)
  }

  async fn stream(&self, request: GenerateRequest) -> Result<TextStream, AiError> {
    let url = format!(
      "{}/models/{}:streamGenerateContent?alt=sse",
      self.base_url, self.model
    );
    let response = self.post(url, &request).await?;
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    tokio::spawn(async move {
      let mut bytes = response.bytes_stream();
      let mut sse = SseBuffer::default();

      while let Some(chunk) = bytes.next().await {
        let events = match chunk {
          Ok(b) => sse.push(&b),
          Err(e) => {
            let _ = tx.send(Err(AiError::Transport(e.to_string()))).await;
            return;
          }
        };
        for data in events {
          if !forward_event(&tx, &data).await {
            return;
          }
        }
      }
      if let Some(data) = sse.finish() {
        forward_event(&tx, &data).await;
      }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
  }
}

/// Send the text of one SSE payload downstream. Returns false once the stream should stop.
async fn forward_event(tx: &mpsc::Sender<Result<String, AiError>>, data: &str) -> bool {
  let event = match serde_json::from_str::<Value>(data) {
    Ok(v) => stream_event_text(&v),
    Err(e) => Err(AiError::malformed("stream event", e)),
  };
  match event {
    Ok(Some(text)) => tx.send(Ok(text)).await.is_ok(),
    Ok(None) => true,
    Err(e) => {
      let _ = tx.send(Err(e)).await;
      false
    }
  }
}

// ── Request ───────────────────────────────────────────────────────────────────

pub(crate) fn request_body(request: &GenerateRequest) -> Value {
  let contents: Vec<Value> = request
    .contents
    .iter()
    .map(|turn| {
      json!({
        "role": turn.role.as_str(),
        "parts": [{ "text": turn.text }],
      })
    })
    .collect();

  let mut body = json!({ "contents": contents });

  if let Some(system) = &request.system {
    body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
  }
  if let Some(schema) = &request.response_schema {
    body["generationConfig"] = json!({
      "responseMimeType": "application/json",
      "responseSchema": schema,
    });
  }
  if request.web_search {
    body["tools"] = json!([{ "googleSearch": {} }]);
  }
  body
}

// ── Response ──────────────────────────────────────────────────────────────────

fn api_error_message(body: &str) -> String {
  serde_json::from_str::<Value>(body)
    .ok()
    .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
    .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Concatenated non-thought text parts of the first candidate
fn candidate_text(body: &Value) -> String {
  body["candidates"][0]["content"]["parts"]
    .as_array()
    .map(|parts| {
      parts
        .iter()
        .filter(|p| !p["thought"].as_bool().unwrap_or(false))
        .filter_map(|p| p["text"].as_str())
        .collect::<String>()
    })
    .unwrap_or_default()
}

fn grounding_sources(body: &Value) -> Vec<ResourceItem> {
  body["candidates"][0]["groundingMetadata"]["groundingChunks"]
    .as_array()
    .map(|chunks| {
      chunks
        .iter()
        .filter_map(|c| {
          let web = &c["web"];
          Some(ResourceItem {
            title: web["title"].as_str()?.to_string(),
            uri: web["uri"].as_str()?.to_string(),
          })
        })
        .collect()
    })
    .unwrap_or_default()
}

/// Reason the response was withheld, if any
fn block_reason(body: &Value) -> Option<String> {
  if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
    return Some(reason.to_string());
  }
  match body["candidates"][0]["finishReason"].as_str() {
    Some("STOP") | Some("MAX_TOKENS") | None => None,
    Some(other) => Some(other.to_string()),
  }
}

pub(crate) fn parse_completion(body: &Value) -> Result<Completion, AiError> {
  let text = candidate_text(body);
  let sources = grounding_sources(body);

  if text.trim().is_empty() && sources.is_empty() {
    return Err(match block_reason(body) {
      Some(reason) => AiError::Blocked(reason),
      None => AiError::Empty,
    });
  }
  Ok(Completion { text, sources })
}

/// Text carried by one streamed event. Events without text are skipped
/// unless the model stopped for a reason other than finishing.
pub(crate) fn stream_event_text(event: &Value) -> Result<Option<String>, AiError> {
  let text = candidate_text(event);
  if !text.is_empty() {
    return Ok(Some(text));
  }
  match block_reason(event) {
    Some(reason) => Err(AiError::Blocked(reason)),
    None => Ok(None),
  }
}

// ── SSE framing ───────────────────────────────────────────────────────────────

/// Splits a byte stream into SSE `data:` payloads.
///
/// Bytes are buffered until a full line arrives so multi-byte characters
/// split across network chunks are decoded intact.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
  pending: Vec<u8>,
}

impl SseBuffer {
  pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
    self.pending.extend_from_slice(bytes);
    let mut events = Vec::new();
    while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
      let line: Vec<u8> = self.pending.drain(..=pos).collect();
      if let Some(data) = data_payload(&line) {
        events.push(data);
      }
    }
    events
  }

  /// Payload of a final line that arrived without a trailing newline
  pub fn finish(&mut self) -> Option<String> {
    let line = std::mem::take(&mut self.pending);
    data_payload(&line)
  }
}

fn data_payload(line: &[u8]) -> Option<String> {
  let line = String::from_utf8_lossy(line);
  let data = line.trim_end_matches(['\r', '\n']).strip_prefix("data:")?.trim_start();
  if data.is_empty() {
    None
  } else {
    Some(data.to_string())
  }
}
