pub mod error;
pub mod gemini;
pub mod model;
pub mod parse;
pub mod prompts;
pub mod service;

pub use error::AiError;
pub use gemini::GeminiClient;
pub use model::{Completion, GenerateRequest, TextModel, TextStream, Turn};
pub use service::ContentService;
