use axum::{
  routing::{get, post},
  Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handlers;
use crate::paths;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
  Router::new()
    .route("/", get(handlers::index))
    .route("/plan", post(handlers::create_plan))
    .route("/plan/reorder", post(handlers::reorder_tasks))
    .route("/plan/task", post(handlers::set_task))
    .route("/plan/export", get(handlers::export_plan))
    .route("/progress", get(handlers::progress))
    // Topic explanation
    .route("/topic", post(handlers::topic_content))
    .route("/topic/rephrase", post(handlers::topic_rephrase))
    .route("/topic/analogy", post(handlers::topic_analogy))
    .route("/topic/clear", post(handlers::topic_clear))
    // Conversations
    .route("/chat/start", post(handlers::chat_start))
    .route("/chat/send", post(handlers::chat_send))
    .route("/chat/rephrase", post(handlers::chat_rephrase))
    .route("/chat/export", get(handlers::chat_export))
    .route("/interview/start", post(handlers::interview_start))
    .route("/interview/send", post(handlers::interview_send))
    .route("/interview/export", get(handlers::interview_export))
    // Quiz
    .route("/quiz", post(handlers::create_quiz))
    .route("/quiz/submit", post(handlers::submit_quiz))
    .route("/quiz/review", post(handlers::quiz_review))
    .route("/quiz/redemption", post(handlers::quiz_redemption))
    .route("/quiz/clear", post(handlers::quiz_clear))
    // Flashcards
    .route("/flashcards", get(handlers::flashcards_page))
    .route("/flashcards/generate", post(handlers::generate_flashcards))
    .route("/flashcards/review/start", post(handlers::review_start))
    .route("/flashcards/review/grade", post(handlers::review_grade))
    .route("/flashcards/review/end", post(handlers::review_end))
    // Mind map, resources, summarizer
    .route("/mindmap", post(handlers::mind_map))
    .route("/resources", post(handlers::find_resources))
    .route("/summarize", post(handlers::summarize))
    .route("/summarize/clear", post(handlers::summarize_clear))
    .route("/api/state", get(handlers::api_state))
    .nest_service("/static", ServeDir::new(paths::STATIC_DIR))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
