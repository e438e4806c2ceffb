use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: String,
  pub explanation: String,
}

/// How a single answer compared to the expected one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
  pub question: String,
  pub user_answer: Option<String>,
  pub correct_answer: String,
  pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
  pub score: usize,
  pub total: usize,
  pub percentage: u32,
  pub feedback: &'static str,
  pub answers: Vec<AnswerOutcome>,
}

impl QuizResult {
  pub fn is_perfect(&self) -> bool {
    self.total > 0 && self.score == self.total
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedTopic {
  pub topic: String,
  #[serde(default)]
  pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedReview {
  #[serde(default)]
  pub strengths: Vec<String>,
  #[serde(default)]
  pub areas_for_improvement: Vec<String>,
  #[serde(default)]
  pub recommended_topics: Vec<RecommendedTopic>,
  /// Follow-up quiz made of the missed questions only
  pub redemption_quiz: Vec<QuizQuestion>,
}

fn feedback_for(percentage: u32) -> &'static str {
  if percentage >= 80 {
    "Excellent work!"
  } else if percentage >= 60 {
    "Good job, keep reviewing!"
  } else {
    "You can do better. Time to hit the books!"
  }
}

/// Compare each answer against the expected one. A missing answer counts as wrong.
pub fn answer_outcomes(questions: &[QuizQuestion], answers: &[String]) -> Vec<AnswerOutcome> {
  questions
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let user_answer = answers.get(i).cloned();
      AnswerOutcome {
        question: q.question.clone(),
        is_correct: user_answer.as_deref() == Some(q.correct_answer.as_str()),
        user_answer,
        correct_answer: q.correct_answer.clone(),
      }
    })
    .collect()
}

pub fn grade_quiz(questions: &[QuizQuestion], answers: &[String]) -> QuizResult {
  let outcomes = answer_outcomes(questions, answers);
  let total = outcomes.len();
  let score = outcomes.iter().filter(|o| o.is_correct).count();
  let percentage = if total > 0 {
    ((score as f64 / total as f64) * 100.0).round() as u32
  } else {
    0
  };

  QuizResult {
    score,
    total,
    percentage,
    feedback: feedback_for(percentage),
    answers: outcomes,
  }
}

/// Questions the user got wrong, in quiz order
pub fn incorrect_questions(questions: &[QuizQuestion], answers: &[String]) -> Vec<QuizQuestion> {
  questions
    .iter()
    .enumerate()
    .filter(|(i, q)| answers.get(*i).map(String::as_str) != Some(q.correct_answer.as_str()))
    .map(|(_, q)| q.clone())
    .collect()
}
