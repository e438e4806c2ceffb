//! Day-by-day study plan with per-task completion tracking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
  pub id: String,
  pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlanDay {
  pub day: u32,
  pub topic: String,
  pub objective: String,
  pub tasks: Vec<PlanTask>,
}

impl StudyPlanDay {
  /// Build a day from generated task text. Task ids follow the original
  /// position (`task-{day}-{index}`) and stay with the task when reordered.
  pub fn new(day: u32, topic: String, objective: String, tasks: Vec<String>) -> Self {
    let tasks = tasks
      .into_iter()
      .enumerate()
      .map(|(index, content)| PlanTask {
        id: format!("task-{}-{}", day, index),
        content,
      })
      .collect();
    Self {
      day,
      topic,
      objective,
      tasks,
    }
  }
}

/// A completed task as shown in the progress overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedTask {
  pub day: u32,
  pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
  pub total_tasks: usize,
  pub completed_tasks: usize,
  pub percentage: u32,
  pub recently_completed: Vec<CompletedTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyPlan {
  pub days: Vec<StudyPlanDay>,
  /// Completion flags per day, aligned with that day's tasks
  pub progress: BTreeMap<u32, Vec<bool>>,
}

impl StudyPlan {
  pub fn new(days: Vec<StudyPlanDay>) -> Self {
    let progress = days
      .iter()
      .map(|d| (d.day, vec![false; d.tasks.len()]))
      .collect();
    Self { days, progress }
  }

  pub fn day(&self, day: u32) -> Option<&StudyPlanDay> {
    self.days.iter().find(|d| d.day == day)
  }

  pub fn is_completed(&self, day: u32, index: usize) -> bool {
    self
      .progress
      .get(&day)
      .and_then(|flags| flags.get(index))
      .copied()
      .unwrap_or(false)
  }

  /// Move a task within its day. The completion flag moves with it.
  ///
  /// Returns false (and changes nothing) for an unknown day or an index out of range.
  pub fn reorder_tasks(&mut self, day: u32, old_index: usize, new_index: usize) -> bool {
    let Some(plan_day) = self.days.iter_mut().find(|d| d.day == day) else {
      return false;
    };
    let Some(flags) = self.progress.get_mut(&day) else {
      return false;
    };
    let len = plan_day.tasks.len();
    if old_index >= len || new_index >= len || flags.len() != len {
      return false;
    }

    let task = plan_day.tasks.remove(old_index);
    plan_day.tasks.insert(new_index, task);
    let flag = flags.remove(old_index);
    flags.insert(new_index, flag);
    true
  }

  /// Returns false for an unknown day or task index.
  pub fn set_completion(&mut self, day: u32, index: usize, completed: bool) -> bool {
    match self.progress.get_mut(&day).and_then(|flags| flags.get_mut(index)) {
      Some(flag) => {
        *flag = completed;
        true
      }
      None => false,
    }
  }

  pub fn summary(&self) -> ProgressSummary {
    let total_tasks: usize = self.days.iter().map(|d| d.tasks.len()).sum();

    let completed: Vec<CompletedTask> = self
      .days
      .iter()
      .flat_map(|d| {
        d.tasks
          .iter()
          .enumerate()
          .filter(|(i, _)| self.is_completed(d.day, *i))
          .map(|(_, t)| CompletedTask {
            day: d.day,
            content: t.content.clone(),
          })
      })
      .collect();

    let percentage = if total_tasks > 0 {
      ((completed.len() as f64 / total_tasks as f64) * 100.0).round() as u32
    } else {
      0
    };

    let completed_tasks = completed.len();
    let skip = completed_tasks.saturating_sub(config::RECENT_TASKS_LIMIT);
    let recently_completed = completed.into_iter().skip(skip).rev().collect();

    ProgressSummary {
      total_tasks,
      completed_tasks,
      percentage,
      recently_completed,
    }
  }
}
