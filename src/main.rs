use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loan_risk_api::app::build_router;
use loan_risk_api::config::Config;
use loan_risk_api::db::PgWarehouse;
use loan_risk_api::handlers::AppState;
use loan_risk_api::loan_storage::LoanWriter;
use loan_risk_api::schema;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Column catalog verification.
/// - Warehouse connection parameters (connections are opened per request).
/// - HTTP routes and middleware (CORS, body limit).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loan_risk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Column names are interpolated into SQL, refuse to start on a bad catalog
    schema::verify_catalog()?;

    let warehouse = PgWarehouse::from_config(&config)?;
    let writer = LoanWriter::new(Arc::new(warehouse), config.loan_table());
    tracing::info!("Loan writer targeting {}", config.qualified_loan_table());

    let app_state = Arc::new(AppState { writer });
    let app = build_router(app_state, &config.cors_allowed_origin)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
