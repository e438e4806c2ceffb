use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::Flashcard;

/// Cards due at `as_of`, in a fresh random order.
pub fn select_due(deck: &[Flashcard], as_of: DateTime<Utc>) -> Vec<Flashcard> {
  select_due_with(deck, as_of, &mut rand::rng())
}

pub fn select_due_with<R: Rng + ?Sized>(
  deck: &[Flashcard],
  as_of: DateTime<Utc>,
  rng: &mut R,
) -> Vec<Flashcard> {
  let mut due: Vec<Flashcard> = deck.iter().filter(|c| c.is_due(as_of)).cloned().collect();
  due.shuffle(rng);
  due
}

pub fn due_count(deck: &[Flashcard], as_of: DateTime<Utc>) -> usize {
  deck.iter().filter(|c| c.is_due(as_of)).count()
}

/// Earliest upcoming review among cards that are not yet due
pub fn next_review_time(deck: &[Flashcard], as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
  deck
    .iter()
    .filter(|c| !c.is_due(as_of))
    .map(|c| c.next_review)
    .min()
}
