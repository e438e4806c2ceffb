//! Per-topic flashcard decks

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{new_drafts, CardDraft, Flashcard, ReviewGrade};

/// `next_review` is stored as Unix microseconds, which covers every
/// `DateTime<Utc>` the scheduler can produce.
const CARD_COLUMNS: &str = "id, term, definition, next_review, interval_days, ease_factor";

/// All cards of a deck in insertion order
pub fn load_deck(conn: &Connection, deck_key: &str) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM flashcards WHERE deck_key = ?1 ORDER BY id",
        CARD_COLUMNS
    ))?;
    let cards = stmt
        .query_map(params![deck_key], row_to_flashcard)?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

pub fn get_flashcard(conn: &Connection, deck_key: &str, id: i64) -> Result<Option<Flashcard>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM flashcards WHERE deck_key = ?1 AND id = ?2",
            CARD_COLUMNS
        ),
        params![deck_key, id],
        row_to_flashcard,
    )
    .optional()
}

/// Add generated cards to a deck, skipping terms it already holds.
///
/// Returns the cards that were actually inserted, due immediately.
pub fn add_drafts(
    conn: &Connection,
    deck_key: &str,
    drafts: Vec<CardDraft>,
    now: DateTime<Utc>,
) -> Result<Vec<Flashcard>> {
    let existing = load_deck(conn, deck_key)?;
    let fresh = new_drafts(&existing, drafts);
    if fresh.is_empty() {
        return Ok(vec![]);
    }

    let tx = conn.unchecked_transaction()?;
    let mut inserted = Vec::with_capacity(fresh.len());
    {
        let mut stmt = tx.prepare(
            r#"
    INSERT OR IGNORE INTO flashcards (deck_key, term, definition, next_review, interval_days, ease_factor, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        )?;
        for draft in fresh {
            let card = Flashcard::new(0, draft.term, draft.definition, now);
            let changed = stmt.execute(params![
                deck_key,
                card.term,
                card.definition,
                card.next_review.timestamp_micros(),
                card.interval,
                card.ease_factor,
                now.to_rfc3339(),
            ])?;
            if changed > 0 {
                inserted.push(Flashcard {
                    id: tx.last_insert_rowid(),
                    ..card
                });
            }
        }
    }
    tx.commit()?;
    Ok(inserted)
}

/// Persist the scheduling state of a reviewed card and log the review.
pub fn save_review(conn: &Connection, card: &Flashcard, grade: ReviewGrade, now: DateTime<Utc>) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE flashcards SET next_review = ?1, interval_days = ?2, ease_factor = ?3 WHERE id = ?4",
        params![
            card.next_review.timestamp_micros(),
            card.interval,
            card.ease_factor,
            card.id
        ],
    )?;
    tx.execute(
        "INSERT INTO review_logs (card_id, grade, interval_days, reviewed_at) VALUES (?1, ?2, ?3, ?4)",
        params![card.id, grade.as_str(), card.interval, now.to_rfc3339()],
    )?;
    tx.commit()
}

/// Reviews recorded for a deck
pub fn count_reviews(conn: &Connection, deck_key: &str) -> Result<i64> {
    conn.query_row(
        r#"
    SELECT COUNT(*) FROM review_logs r
    JOIN flashcards f ON f.id = r.card_id
    WHERE f.deck_key = ?1
    "#,
        params![deck_key],
        |row| row.get(0),
    )
}

pub(crate) fn row_to_flashcard(row: &rusqlite::Row) -> Result<Flashcard> {
    let micros: i64 = row.get(3)?;
    let next_review = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            format!("next_review out of range: {}", micros).into(),
        )
    })?;

    Ok(Flashcard {
        id: row.get(0)?,
        term: row.get(1)?,
        definition: row.get(2)?,
        next_review,
        interval: row.get(4)?,
        ease_factor: row.get(5)?,
    })
}
