//! Parsing of structured model output.
//!
//! Model text is untrusted: it may be wrapped in markdown fences or carry
//! stray prose around the JSON payload.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::AiError;
use crate::domain::{CardDraft, MindMapNode, PersonalizedReview, QuizQuestion, StudyPlanDay};

/// Remove a surrounding ```/```json fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
  let trimmed = text.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  // Drop the info string (e.g. "json") on the opening line
  let body = match rest.find('\n') {
    Some(pos) => &rest[pos + 1..],
    None => rest,
  };
  body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Outermost JSON object or array embedded in surrounding text
fn extract_json(text: &str) -> Option<&str> {
  let start = text.find(['{', '['])?;
  let close = if text[start..].starts_with('{') { '}' } else { ']' };
  let end = text.rfind(close)?;
  (end > start).then(|| &text[start..=end])
}

pub fn parse_json<T: DeserializeOwned>(text: &str, what: &'static str) -> Result<T, AiError> {
  let cleaned = strip_code_fences(text);
  match serde_json::from_str(cleaned) {
    Ok(value) => Ok(value),
    Err(first) => {
      let Some(inner) = extract_json(cleaned) else {
        return Err(AiError::malformed(what, first));
      };
      serde_json::from_str(inner).map_err(|e| {
        tracing::warn!("Failed to parse {} JSON: {}", what, e);
        AiError::malformed(what, e)
      })
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTask {
  Text(String),
  Object { content: String },
}

impl RawTask {
  fn into_content(self) -> String {
    match self {
      RawTask::Text(s) | RawTask::Object { content: s } => s,
    }
  }
}

#[derive(Deserialize)]
struct RawPlanDay {
  day: u32,
  topic: String,
  #[serde(default)]
  objective: String,
  #[serde(default)]
  tasks: Vec<RawTask>,
}

pub fn parse_study_plan(text: &str) -> Result<Vec<StudyPlanDay>, AiError> {
  let raw: Vec<RawPlanDay> = parse_json(text, "study plan")?;
  if raw.is_empty() {
    return Err(AiError::malformed("study plan", "no days"));
  }
  Ok(
    raw
      .into_iter()
      .map(|d| {
        let tasks = d.tasks.into_iter().map(RawTask::into_content).collect();
        StudyPlanDay::new(d.day, d.topic, d.objective, tasks)
      })
      .collect(),
  )
}

pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, AiError> {
  let questions: Vec<QuizQuestion> = parse_json(text, "quiz")?;
  if questions.is_empty() {
    return Err(AiError::malformed("quiz", "no questions"));
  }
  Ok(questions)
}

/// Term/definition pairs; entries with a blank term are dropped.
pub fn parse_flashcards(text: &str) -> Result<Vec<CardDraft>, AiError> {
  let drafts: Vec<CardDraft> = parse_json(text, "flashcards")?;
  Ok(
    drafts
      .into_iter()
      .filter(|d| !d.term.trim().is_empty())
      .collect(),
  )
}

pub fn parse_personalized_review(text: &str) -> Result<PersonalizedReview, AiError> {
  parse_json(text, "personalized review")
}

pub fn parse_mind_map(text: &str, max_depth: usize) -> Result<MindMapNode, AiError> {
  let mut root: MindMapNode = parse_json(text, "mind map")?;
  root.prune(max_depth);
  Ok(root)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_strip_code_fences() {
    assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
    assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
  }

  #[test]
  fn test_parse_json_with_surrounding_prose() {
    let text = "Sure! Here is the map:\n{\"topic\": \"Rust\", \"children\": []}\nEnjoy.";
    let node: MindMapNode = parse_json(text, "mind map").unwrap();
    assert_eq!(node.topic, "Rust");
  }

  #[test]
  fn test_parse_json_failure_names_payload() {
    let err = parse_json::<Vec<QuizQuestion>>("not json at all", "quiz").unwrap_err();
    match err {
      AiError::Malformed { what, .. } => assert_eq!(what, "quiz"),
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn test_plan_tasks_as_strings_or_objects() {
    let text = r#"[
      {"day": 1, "topic": "Intro", "objective": "Start", "tasks": ["Read", {"content": "Practice"}]},
      {"day": 2, "topic": "Next", "tasks": []}
    ]"#;
    let plan = parse_study_plan(text).unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].tasks[1].content, "Practice");
    assert_eq!(plan[0].tasks[1].id, "task-1-1");
    assert_eq!(plan[1].objective, "");
  }

  #[test]
  fn test_empty_plan_rejected() {
    assert!(matches!(parse_study_plan("[]"), Err(AiError::Malformed { .. })));
  }

  #[test]
  fn test_quiz_fenced() {
    let text = "```json\n[{\"question\": \"2+2?\", \"options\": [\"3\", \"4\"], \"correctAnswer\": \"4\", \"explanation\": \"math\"}]\n```";
    let quiz = parse_quiz(text).unwrap();
    assert_eq!(quiz[0].correct_answer, "4");
  }

  #[test]
  fn test_flashcards_drop_blank_terms() {
    let text = r#"[{"term": "Ownership", "definition": "One owner"}, {"term": " ", "definition": "nothing"}]"#;
    let cards = parse_flashcards(text).unwrap();
    assert_eq!(cards, vec![CardDraft::new("Ownership", "One owner")]);
  }

  #[test]
  fn test_mind_map_is_pruned() {
    let text = r#"{"topic": "1", "children": [{"topic": "2", "children": [{"topic": "3", "children": [{"topic": "4", "children": [{"topic": "5"}]}]}]}]}"#;
    let map = parse_mind_map(text, 4).unwrap();
    assert_eq!(map.depth(), 4);
  }

  #[test]
  fn test_personalized_review() {
    let text = r#"{
      "strengths": ["Syntax"],
      "areasForImprovement": ["Lifetimes"],
      "recommendedTopics": [{"topic": "Borrowing", "reason": "Missed question 2"}],
      "redemptionQuiz": []
    }"#;
    let review = parse_personalized_review(text).unwrap();
    assert_eq!(review.areas_for_improvement, vec!["Lifetimes".to_string()]);
    assert_eq!(review.recommended_topics[0].topic, "Borrowing");
  }
}
