// src/main.rs

use std::net::SocketAddr;

use dotenvy::dotenv;
use quiz_backend::config::Config;
use quiz_backend::routes;
use quiz_backend::state::AppState;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Two independent stores: durable identity, local ledger.
    let identity_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.identity_database_url)
        .await
        .expect("Failed to connect to identity store");

    let ledger_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.ledger_database_url)
        .await
        .expect("Failed to connect to ledger store");

    tracing::info!("Stores connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations/identity")
        .run(&identity_pool)
        .await
        .expect("Failed to run identity migrations");
    sqlx::migrate!("./migrations/ledger")
        .run(&ledger_pool)
        .await
        .expect("Failed to run ledger migrations");
    tracing::info!("Migrations applied successfully.");

    // Create AppState
    let state = AppState::new(identity_pool, ledger_pool, config);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
