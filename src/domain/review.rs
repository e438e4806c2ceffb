use serde::{Deserialize, Serialize};

/// Self-reported recall performance for a flashcard review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewGrade {
  Hard,
  Good,
  Easy,
}

impl ReviewGrade {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "Hard" | "hard" => Some(Self::Hard),
      "Good" | "good" => Some(Self::Good),
      "Easy" | "easy" => Some(Self::Easy),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Hard => "Hard",
      Self::Good => "Good",
      Self::Easy => "Easy",
    }
  }
}
