use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A web page cited by a grounded search answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceItem {
  pub title: String,
  pub uri: String,
}

/// Drop entries without a title or uri and keep the first of each uri.
pub fn dedupe_resources(items: Vec<ResourceItem>) -> Vec<ResourceItem> {
  let mut seen = HashSet::new();
  items
    .into_iter()
    .filter(|r| !r.title.trim().is_empty() && !r.uri.trim().is_empty())
    .filter(|r| seen.insert(r.uri.clone()))
    .collect()
}
