pub mod chat;
pub mod deck;
pub mod flashcard;
pub mod mindmap;
pub mod plan;
pub mod quiz;
pub mod resource;
pub mod review;
pub mod streak;

pub use chat::{ChatMessage, RephraseTicket, Role, Transcript};
pub use deck::{deck_key, new_drafts, underscore_whitespace};
pub use flashcard::{CardDraft, Flashcard};
pub use mindmap::MindMapNode;
pub use plan::{CompletedTask, PlanTask, ProgressSummary, StudyPlan, StudyPlanDay};
pub use quiz::{
  grade_quiz, incorrect_questions, AnswerOutcome, PersonalizedReview, QuizQuestion, QuizResult,
  RecommendedTopic,
};
pub use resource::{dedupe_resources, ResourceItem};
pub use review::ReviewGrade;
pub use streak::StreakRecord;
