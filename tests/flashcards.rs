mod common;

use axum::http::StatusCode;

use common::{create_plan, server, Reply, PLAN_JSON};

const CARDS: &str = r#"[
  {"term": "Vector", "definition": "Magnitude and direction"},
  {"term": "Matrix", "definition": "Rectangular grid of numbers"}
]"#;

#[tokio::test]
async fn test_flashcards_page_without_topic() {
  let (server, _) = server(vec![]);
  server
    .get("/flashcards")
    .await
    .assert_text_contains("Create a study plan first");
}

#[tokio::test]
async fn test_generate_and_review_deck() {
  let (server, _) = server(vec![Reply::Text(PLAN_JSON), Reply::Text(CARDS)]);
  create_plan(&server, "Linear Algebra").await;

  server
    .post("/flashcards/generate")
    .form(&[("sub_topic", "")])
    .await
    .assert_status(StatusCode::SEE_OTHER);

  let page = server.get("/flashcards").await;
  page.assert_text_contains("Deck (2)");
  page.assert_text_contains("2 cards due for review.");

  server
    .post("/flashcards/review/start")
    .await
    .assert_status(StatusCode::SEE_OTHER);
  server.get("/flashcards").await.assert_text_contains("Card 1 of 2");

  for _ in 0..2 {
    server
      .post("/flashcards/review/grade")
      .form(&[("grade", "Easy")])
      .await
      .assert_status(StatusCode::SEE_OTHER);
  }

  let page = server.get("/flashcards").await;
  page.assert_text_contains("No cards due.");
  page.assert_text_contains("3d");

  server.get("/progress").await.assert_text_contains("reviews");
}

#[tokio::test]
async fn test_unknown_grade_is_bad_request() {
  let (server, _) = server(vec![Reply::Text(PLAN_JSON), Reply::Text(CARDS)]);
  create_plan(&server, "Linear Algebra").await;
  server.post("/flashcards/generate").form(&[("sub_topic", "")]).await;
  server.post("/flashcards/review/start").await;

  server
    .post("/flashcards/review/grade")
    .form(&[("grade", "Again")])
    .await
    .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grade_without_session_conflicts() {
  let (server, _) = server(vec![Reply::Text(PLAN_JSON)]);
  create_plan(&server, "Linear Algebra").await;

  server
    .post("/flashcards/review/grade")
    .form(&[("grade", "Good")])
    .await
    .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_start_with_nothing_due_redirects_with_notice() {
  let (server, _) = server(vec![Reply::Text(PLAN_JSON)]);
  create_plan(&server, "Linear Algebra").await;

  let response = server.post("/flashcards/review/start").await;
  response.assert_status(StatusCode::SEE_OTHER);
  assert_eq!(
    response.header("location"),
    "/flashcards?notice=No%20cards%20are%20due%20for%20review%20right%20now."
  );
}
