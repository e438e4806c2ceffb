//! Multi-turn conversation transcripts with streamed assistant turns.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Model,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Model => "model",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
  #[serde(default)]
  pub is_rephrasing: bool,
}

impl ChatMessage {
  pub fn user(content: impl Into<String>) -> Self {
    Self {
      role: Role::User,
      content: content.into(),
      is_rephrasing: false,
    }
  }

  pub fn model(content: impl Into<String>) -> Self {
    Self {
      role: Role::Model,
      content: content.into(),
      is_rephrasing: false,
    }
  }
}

/// One conversation: the visible messages plus the bookkeeping for the
/// single exchange that may be in flight.
///
/// Messages before `seeded` were placed locally when the conversation started
/// (an opening question or greeting) and are not sent to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
  pub messages: Vec<ChatMessage>,
  pub started: bool,
  #[serde(skip)]
  seeded: usize,
  #[serde(skip)]
  exchange_start: Option<usize>,
}

impl Transcript {
  pub fn start(seed: Vec<ChatMessage>) -> Self {
    Self {
      seeded: seed.len(),
      messages: seed,
      started: true,
      exchange_start: None,
    }
  }

  pub fn is_pending(&self) -> bool {
    self.exchange_start.is_some()
  }

  /// Append the user turn and an empty model turn to be filled by streaming.
  ///
  /// Returns false while another exchange is still in flight.
  pub fn begin_exchange(&mut self, message: String) -> bool {
    if self.is_pending() {
      return false;
    }
    self.exchange_start = Some(self.messages.len());
    self.messages.push(ChatMessage::user(message));
    self.messages.push(ChatMessage::model(String::new()));
    true
  }

  /// Messages the model should see for the in-flight exchange:
  /// everything after the local seed, up to and including the new user turn.
  pub fn model_history(&self) -> Vec<ChatMessage> {
    let end = match self.exchange_start {
      Some(start) => start + 1,
      None => self.messages.len(),
    };
    self.messages[self.seeded.min(end)..end].to_vec()
  }

  pub fn append_chunk(&mut self, chunk: &str) {
    if !self.is_pending() {
      return;
    }
    if let Some(last) = self.messages.last_mut() {
      if last.role == Role::Model {
        last.content.push_str(chunk);
      }
    }
  }

  pub fn finish_exchange(&mut self) {
    self.exchange_start = None;
  }

  /// Drop both turns of the in-flight exchange, including any partial reply.
  pub fn abort_exchange(&mut self) {
    if let Some(start) = self.exchange_start.take() {
      self.messages.truncate(start);
    }
  }

  /// True when `index` belongs to the exchange that is still streaming.
  pub fn is_streaming(&self, index: usize) -> bool {
    self.exchange_start.is_some_and(|start| index >= start)
  }

  /// Flag a settled model message as being rephrased.
  ///
  /// Turns of the in-flight exchange and messages already being rephrased
  /// are refused.
  pub fn begin_rephrase(&mut self, index: usize) -> Option<RephraseTicket> {
    if self.is_streaming(index) {
      return None;
    }
    let message = self.messages.get_mut(index)?;
    if message.role != Role::Model || message.content.is_empty() || message.is_rephrasing {
      return None;
    }
    message.is_rephrasing = true;
    Some(RephraseTicket {
      index,
      original: message.content.clone(),
    })
  }

  /// Clear the rephrasing flag, replacing the content when a new text is given.
  ///
  /// Does nothing unless the message at the ticket's index is still the one
  /// that was flagged. Returns whether it was.
  pub fn finish_rephrase(&mut self, ticket: &RephraseTicket, replacement: Option<String>) -> bool {
    let Some(message) = self.messages.get_mut(ticket.index) else {
      return false;
    };
    if message.role != Role::Model || !message.is_rephrasing || message.content != ticket.original {
      return false;
    }
    message.is_rephrasing = false;
    if let Some(text) = replacement {
      message.content = text;
    }
    true
  }
}

/// A model message handed out for rephrasing: its position and the text it had.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RephraseTicket {
  pub index: usize,
  pub original: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exchange_streams_into_model_turn() {
    let mut t = Transcript::start(vec![]);
    assert!(t.begin_exchange("What is a monad?".into()));
    t.append_chunk("A monad ");
    t.append_chunk("is a pattern.");
    t.finish_exchange();

    assert_eq!(t.messages.len(), 2);
    assert_eq!(t.messages[1].content, "A monad is a pattern.");
    assert!(!t.is_pending());
  }

  #[test]
  fn test_second_exchange_rejected_while_pending() {
    let mut t = Transcript::start(vec![]);
    assert!(t.begin_exchange("first".into()));
    assert!(!t.begin_exchange("second".into()));
    assert_eq!(t.messages.len(), 2);
  }

  #[test]
  fn test_abort_discards_partial_turns() {
    let mut t = Transcript::start(vec![]);
    t.begin_exchange("one".into());
    t.append_chunk("reply");
    t.finish_exchange();

    t.begin_exchange("two".into());
    t.append_chunk("half a rep");
    t.abort_exchange();

    assert_eq!(t.messages.len(), 2);
    assert_eq!(t.messages[1].content, "reply");
    assert!(!t.is_pending());
  }

  #[test]
  fn test_model_history_skips_seed_and_empty_reply() {
    let mut t = Transcript::start(vec![ChatMessage::model("Hello! Let's begin.")]);
    t.begin_exchange("Ready".into());

    let history = t.model_history();
    assert_eq!(history, vec![ChatMessage::user("Ready")]);
  }

  #[test]
  fn test_chunks_ignored_when_idle() {
    let mut t = Transcript::start(vec![ChatMessage::model("greeting")]);
    t.append_chunk("stray");
    assert_eq!(t.messages[0].content, "greeting");
  }

  #[test]
  fn test_rephrase_only_model_messages() {
    let mut t = Transcript::start(vec![ChatMessage::user("hi")]);
    t.begin_exchange("explain".into());
    t.append_chunk("original");
    t.finish_exchange();

    assert_eq!(t.begin_rephrase(0), None);
    let ticket = t.begin_rephrase(2).unwrap();
    assert_eq!(ticket.original, "original");
    assert!(t.messages[2].is_rephrasing);
    assert_eq!(t.begin_rephrase(2), None);

    assert!(t.finish_rephrase(&ticket, Some("simpler".into())));
    assert_eq!(t.messages[2].content, "simpler");
    assert!(!t.messages[2].is_rephrasing);
  }

  #[test]
  fn test_failed_rephrase_keeps_content() {
    let mut t = Transcript::start(vec![ChatMessage::model("keep me")]);
    let ticket = t.begin_rephrase(0).unwrap();
    assert!(t.finish_rephrase(&ticket, None));
    assert_eq!(t.messages[0].content, "keep me");
    assert!(!t.messages[0].is_rephrasing);
  }

  #[test]
  fn test_streaming_reply_cannot_be_rephrased() {
    let mut t = Transcript::start(vec![]);
    t.begin_exchange("q".into());
    t.append_chunk("partial ");

    assert!(t.is_streaming(1));
    assert_eq!(t.begin_rephrase(1), None);
    assert!(!t.messages[1].is_rephrasing);

    t.append_chunk("rest");
    t.finish_exchange();
    assert_eq!(t.messages[1].content, "partial rest");
    assert!(t.begin_rephrase(1).is_some());
  }

  #[test]
  fn test_rephrase_of_settled_reply_survives_later_abort() {
    let mut t = Transcript::start(vec![]);
    t.begin_exchange("one".into());
    t.append_chunk("first answer");
    t.finish_exchange();

    let ticket = t.begin_rephrase(1).unwrap();
    t.begin_exchange("two".into());
    t.append_chunk("half");
    t.abort_exchange();

    assert!(t.finish_rephrase(&ticket, Some("plainer answer".into())));
    assert_eq!(t.messages.len(), 2);
    assert_eq!(t.messages[1].content, "plainer answer");
  }

  #[test]
  fn test_stale_ticket_leaves_replacement_message_alone() {
    let mut t = Transcript::start(vec![]);
    t.begin_exchange("one".into());
    t.append_chunk("old answer");
    t.finish_exchange();
    let ticket = t.begin_rephrase(1).unwrap();

    // Conversation restarted while the rephrase was running
    t = Transcript::start(vec![]);
    t.begin_exchange("new".into());
    t.append_chunk("new answer");
    t.finish_exchange();

    assert!(!t.finish_rephrase(&ticket, Some("REPHRASED".into())));
    assert_eq!(t.messages[1].content, "new answer");
  }

  #[test]
  fn test_role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
  }
}
