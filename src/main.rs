use std::sync::Arc;

use mortgage_application_service::application_service::MortgageApplicationService;
use mortgage_application_service::calculator_client::CalculatorClient;
use mortgage_application_service::config::Config;
use mortgage_application_service::db::Database;
use mortgage_application_service::db_storage::PgClientStore;
use mortgage_application_service::handlers::{self, AppState};
use mortgage_application_service::obs;

/// Main entry point for the application.
///
/// Initializes logging, configuration, the database pool and schema, and the
/// calculator client, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");
    db.ensure_schema().await?;

    let calculator = CalculatorClient::new(config.calculator_base_url.clone())?;
    tracing::info!("✓ Calculator client initialized: {}", calculator.endpoint());

    let store = Arc::new(PgClientStore::new(db.pool.clone()));
    let app_state = Arc::new(AppState {
        service: MortgageApplicationService::new(store, calculator),
    });

    let app = handlers::app(app_state, config.max_body_bytes);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
