//! Markdown downloads of the plan and the conversations.

use crate::domain::{underscore_whitespace, ChatMessage, Role, StudyPlan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
  pub filename: String,
  pub content: String,
}

pub fn plan_markdown(topic: &str, plan: &StudyPlan) -> MarkdownFile {
  let mut content = format!("# Study Plan: {}\n\n", topic);
  for day in &plan.days {
    content.push_str(&format!("## Day {}: {}\n\n", day.day, day.topic));
    content.push_str(&format!("**Objective:** {}\n\n", day.objective));
    content.push_str("### Tasks\n\n");
    for task in &day.tasks {
      content.push_str(&format!("- [ ] {}\n", task.content));
    }
    content.push('\n');
  }

  MarkdownFile {
    filename: format!("{}_study_plan.md", underscore_whitespace(topic)),
    content,
  }
}

fn transcript_markdown(title: &str, model_label: &str, messages: &[ChatMessage]) -> String {
  let mut content = format!("# {}\n\n", title);
  for message in messages {
    let prefix = match message.role {
      Role::User => "**You:**",
      Role::Model => model_label,
    };
    content.push_str(&format!("{}\n\n{}\n\n---\n\n", prefix, message.content));
  }
  content
}

pub fn chat_markdown(topic: &str, messages: &[ChatMessage]) -> MarkdownFile {
  MarkdownFile {
    filename: format!("{}_chat.md", underscore_whitespace(topic)),
    content: transcript_markdown(&format!("Chat History: {}", topic), "**AI Coach:**", messages),
  }
}

pub fn interview_markdown(topic: &str, messages: &[ChatMessage]) -> MarkdownFile {
  MarkdownFile {
    filename: format!("{}_interview.md", underscore_whitespace(topic)),
    content: transcript_markdown(
      &format!("Interview Practice: {}", topic),
      "**Interviewer:**",
      messages,
    ),
  }
}
