//! Prompt text and response schemas.
//!
//! Schemas use the Gemini OpenAPI subset (upper-case type names).

use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::QuizQuestion;

pub fn tutor_instruction(topic: &str) -> String {
  format!(
    "You are a friendly and knowledgeable study coach. The user is currently studying \"{topic}\". \
     Your role is to help them understand concepts, answer their questions, and provide encouragement. \
     Keep your answers concise, clear, and tailored to a learner. You can and should use Markdown for \
     formatting (headings, lists, bold, code blocks, etc.) to improve readability."
  )
}

pub fn interviewer_instruction(topic: &str) -> String {
  format!(
    "You are a professional, friendly technical interviewer. The user wants to practice for an interview \
     about \"{topic}\". Your role is to ask them common but insightful interview questions about this topic, \
     one at a time. Start with a broad opening question. Then, based on their answers, either dig deeper \
     into that specific area or move to a new related concept. Do not provide the answers unless the user \
     explicitly asks for a hint or the solution. Keep your questions clear and professional. You can use \
     Markdown for formatting."
  )
}

/// Opening line shown when a mock interview starts
pub fn interview_greeting(topic: &str) -> String {
  format!(
    "Hello! I'll be your interviewer today. Let's discuss {topic}. To start, tell me a bit about your \
     understanding of the core concepts."
  )
}

pub fn study_plan(topic: &str, duration: &str) -> String {
  format!(
    "Create a detailed, day-by-day study plan for the topic \"{topic}\" to be completed in {duration}. \
     The plan should be structured for a beginner and cover the fundamental concepts progressively. \
     For each day, provide a main objective, a specific sub-topic, and a list of actionable tasks."
  )
}

pub fn topic_content(topic: &str) -> String {
  format!(
    "Provide a detailed explanation of the topic: \"{topic}\". The explanation should be clear, \
     comprehensive, and suitable for a beginner. Structure the content with clear headings, subheadings, \
     and use bullet points for lists. Explain the core concepts and provide simple examples if possible. \
     Format the entire output as Markdown."
  )
}

pub fn summary(text: &str) -> String {
  format!(
    "Please summarize the following text. The summary should be concise and capture the main ideas of \
     the text provided. Format the output as Markdown, using headings and bullet points for clarity.\n\n\
     Text to summarize:\n\"\"\"\n{text}\n\"\"\""
  )
}

pub fn quiz(topic: &str, questions: usize) -> String {
  format!(
    "Generate a multiple-choice quiz on the topic \"{topic}\". The quiz should have {questions} questions. \
     For each question, provide 4 options and identify the correct answer. Also include a brief \
     explanation for the correct answer."
  )
}

pub fn flashcards(topic: &str) -> String {
  format!(
    "Generate a set of 10-15 flashcards for the topic \"{topic}\". Each flashcard should have a key term \
     and a concise definition suitable for a beginner."
  )
}

pub fn resources(topic: &str) -> String {
  format!(
    "Find some helpful online learning resources (articles, tutorials, documentation) for the topic \"{topic}\"."
  )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRecord<'a> {
  question: &'a str,
  user_answer: Option<&'a str>,
  correct_answer: &'a str,
  is_correct: bool,
}

fn pretty(value: &impl Serialize) -> String {
  serde_json::to_string_pretty(value).unwrap_or_default()
}

pub fn quiz_analysis(topic: &str, questions: &[QuizQuestion], answers: &[String]) -> String {
  let results: Vec<AnswerRecord> = questions
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let user_answer = answers.get(i).map(String::as_str);
      AnswerRecord {
        question: &q.question,
        user_answer,
        correct_answer: &q.correct_answer,
        is_correct: user_answer == Some(q.correct_answer.as_str()),
      }
    })
    .collect();

  format!(
    "You are a helpful study coach. A user has just completed a quiz on the topic \"{topic}\".\n\
     Here are their results:\n{}\n\n\
     Please provide a brief, encouraging analysis of their performance.\n\
     1. Start with an overall positive comment.\n\
     2. Identify their areas of strength (topics they seem to understand based on correct answers).\n\
     3. Identify the specific topics or concepts they should review based on their incorrect answers. Be specific.\n\
     4. Conclude with an encouraging sentence to motivate them to continue studying.\n\n\
     Format the output as Markdown with clear headings (e.g., \"### Strengths\") for each section.",
    pretty(&results)
  )
}

pub fn personalized_review(topic: &str, incorrect: &[QuizQuestion]) -> String {
  format!(
    "You are an expert study coach. A user just took a quiz on \"{topic}\". Their incorrect answers are for \
     these questions:\n{}\n\n\
     Please generate a personalized review plan.\n\
     1. Identify strengths based on the fact they got other questions right (you don't see the right ones, just infer).\n\
     2. List the specific areas for improvement based on the provided incorrect questions.\n\
     3. Recommend specific topics to review.\n\
     4. Create a \"Redemption Quiz\" containing only the questions they got wrong.\n",
    pretty(&incorrect)
  )
}

pub fn rephrase(text: &str) -> String {
  format!(
    "Please rephrase the following text. The goal is to explain the same concept but from a different \
     perspective, using a different analogy, or with a simpler structure. Make the new explanation clear \
     and easy for a beginner to understand. Format the entire output as Markdown.\n\n\
     Original text:\n\"\"\"\n{text}\n\"\"\"\n\nNew, rephrased explanation:"
  )
}

pub fn mind_map(topic: &str) -> String {
  format!(
    "Create a hierarchical mind map for the topic \"{topic}\". The mind map should start with the main topic \
     and branch out into key sub-topics and concepts. The structure should be nested. Keep the hierarchy to \
     a maximum of 3-4 levels deep.\n\n\
     You must respond with only a valid JSON object that follows this structure, with no other text or \
     markdown formatting.\n\n\
     Example structure:\n\
     {{\"topic\": \"Main Topic\", \"children\": [\
     {{\"topic\": \"Sub-Topic 1\", \"children\": [{{\"topic\": \"Detail 1.1\", \"children\": []}}]}}, \
     {{\"topic\": \"Sub-Topic 2\", \"children\": []}}]}}"
  )
}

pub fn analogy(concept: &str) -> String {
  format!(
    "Please provide a simple, relatable analogy to explain the concept of \"{concept}\". The analogy should \
     be easy for a complete beginner to understand. Keep it concise. Format the output as Markdown."
  )
}

// ── Schemas ───────────────────────────────────────────────────────────────────

pub fn study_plan_schema() -> Value {
  json!({
    "type": "ARRAY",
    "items": {
      "type": "OBJECT",
      "properties": {
        "day": { "type": "INTEGER", "description": "The day number in the study plan (e.g., 1, 2, 3)." },
        "topic": { "type": "STRING", "description": "The specific sub-topic to be studied on this day." },
        "tasks": {
          "type": "ARRAY",
          "items": { "type": "STRING" },
          "description": "A list of concrete tasks or activities for the day."
        },
        "objective": { "type": "STRING", "description": "The main learning objective for the day." }
      },
      "required": ["day", "topic", "tasks", "objective"]
    }
  })
}

fn question_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "question": { "type": "STRING" },
      "options": { "type": "ARRAY", "items": { "type": "STRING" } },
      "correctAnswer": { "type": "STRING" },
      "explanation": { "type": "STRING", "description": "A brief explanation for why the correct answer is right." }
    },
    "required": ["question", "options", "correctAnswer", "explanation"]
  })
}

pub fn quiz_schema() -> Value {
  json!({ "type": "ARRAY", "items": question_schema() })
}

pub fn flashcards_schema() -> Value {
  json!({
    "type": "ARRAY",
    "items": {
      "type": "OBJECT",
      "properties": {
        "term": { "type": "STRING", "description": "The key term or concept." },
        "definition": { "type": "STRING", "description": "A clear and concise definition of the term." }
      },
      "required": ["term", "definition"]
    }
  })
}

pub fn personalized_review_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "strengths": {
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": "List of topics the user seems to understand well based on the questions they got right."
      },
      "areasForImprovement": {
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": "List of concepts the user struggled with, based on their incorrect answers."
      },
      "recommendedTopics": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "topic": { "type": "STRING", "description": "Specific topic to review." },
            "reason": { "type": "STRING", "description": "Why this topic should be reviewed, related to the incorrect question." }
          }
        },
        "description": "A list of specific topics to review based on incorrect answers, with a brief reason for each."
      },
      "redemptionQuiz": {
        "type": "ARRAY",
        "items": question_schema(),
        "description": "A new, short quiz composed only of the questions the user got wrong."
      }
    },
    "required": ["strengths", "areasForImprovement", "recommendedTopics", "redemptionQuiz"]
  })
}
