//! Per-topic flashcard decks.

use std::collections::HashSet;

use super::flashcard::{CardDraft, Flashcard};

/// Replace every run of whitespace with a single underscore.
///
/// Used for deck storage keys and download filenames.
pub fn underscore_whitespace(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut in_space = false;
  for c in s.chars() {
    if c.is_whitespace() {
      if !in_space {
        out.push('_');
      }
      in_space = true;
    } else {
      out.push(c);
      in_space = false;
    }
  }
  out
}

/// Storage key of the deck belonging to a topic
pub fn deck_key(topic: &str) -> String {
  format!("flashcardDeck_{}", underscore_whitespace(topic))
}

/// Drafts that may join the deck, in order.
///
/// A draft is dropped when its term is already in the deck or appeared
/// earlier in the same batch.
pub fn new_drafts(deck: &[Flashcard], drafts: Vec<CardDraft>) -> Vec<CardDraft> {
  let mut seen: HashSet<String> = deck.iter().map(|c| c.term.clone()).collect();
  drafts
    .into_iter()
    .filter(|d| seen.insert(d.term.clone()))
    .collect()
}
