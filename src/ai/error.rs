use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
  #[error("API key not configured")]
  MissingCredential,

  #[error("request failed: {0}")]
  Transport(String),

  #[error("API error {status}: {message}")]
  Api { status: u16, message: String },

  #[error("received an invalid format for the {what}: {detail}")]
  Malformed { what: &'static str, detail: String },

  #[error("response blocked: {0}")]
  Blocked(String),

  #[error("the model returned an empty response")]
  Empty,
}

impl AiError {
  pub fn malformed(what: &'static str, detail: impl ToString) -> Self {
    Self::Malformed {
      what,
      detail: detail.to_string(),
    }
  }
}

impl From<reqwest::Error> for AiError {
  fn from(e: reqwest::Error) -> Self {
    Self::Transport(e.to_string())
  }
}
