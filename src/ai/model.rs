//! Seam between the content service and a concrete text-generation backend.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

use super::AiError;
use crate::domain::{ChatMessage, ResourceItem, Role};

/// One turn of conversation sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
  pub role: Role,
  pub text: String,
}

impl From<&ChatMessage> for Turn {
  fn from(message: &ChatMessage) -> Self {
    Self {
      role: message.role,
      text: message.content.clone(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
  pub system: Option<String>,
  pub contents: Vec<Turn>,
  /// When set, the model is asked for JSON matching this schema
  pub response_schema: Option<Value>,
  /// Ground the answer with web search and report the sources
  pub web_search: bool,
}

impl GenerateRequest {
  /// Single user prompt
  pub fn prompt(text: impl Into<String>) -> Self {
    Self {
      contents: vec![Turn {
        role: Role::User,
        text: text.into(),
      }],
      ..Self::default()
    }
  }

  pub fn conversation(system: impl Into<String>, history: &[ChatMessage]) -> Self {
    Self {
      system: Some(system.into()),
      contents: history.iter().map(Turn::from).collect(),
      ..Self::default()
    }
  }

  pub fn with_schema(mut self, schema: Value) -> Self {
    self.response_schema = Some(schema);
    self
  }

  pub fn with_web_search(mut self) -> Self {
    self.web_search = true;
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
  pub text: String,
  pub sources: Vec<ResourceItem>,
}

impl Completion {
  pub fn text(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      sources: Vec::new(),
    }
  }
}

pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, AiError>> + Send>>;

#[async_trait]
pub trait TextModel: Send + Sync {
  async fn generate(&self, request: GenerateRequest) -> Result<Completion, AiError>;

  /// Stream the reply as text chunks in arrival order.
  async fn stream(&self, request: GenerateRequest) -> Result<TextStream, AiError>;
}
