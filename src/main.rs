use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_coach::ai::GeminiClient;
use study_coach::state::AppState;
use study_coach::{config, db, routes};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "study_coach=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = config::load();
  tracing::debug!(?config, "Configuration loaded");

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  let model = Arc::new(GeminiClient::new(&config.ai));
  let app = routes::app(AppState::new(pool, model));

  let bind_addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config.server_port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
