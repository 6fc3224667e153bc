// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use quizgate::bank;
use quizgate::config::Config;
use quizgate::mailer::{NullMailer, RelayMailer, VerificationMailer};
use quizgate::routes;
use quizgate::state::AppState;
use quizgate::store::{FileStore, KeyValueStore, MemoryStore};
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

    // Durable scope on disk, ephemeral scope in process memory
    let durable: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&config.data_dir).expect("Failed to open the data directory"),
    );
    let ephemeral: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    tracing::info!("Durable store opened at {}", config.data_dir);

    // Email relay client; without one, codes are shown on screen
    let mailer: Arc<dyn VerificationMailer> = match &config.relay_url {
        Some(url) => {
            let timeout = Duration::from_secs(config.relay_timeout_secs);
            match RelayMailer::new(url.clone(), timeout) {
                Ok(relay) => {
                    tracing::info!("Email relay configured: {}", url);
                    Arc::new(relay)
                }
                Err(e) => {
                    tracing::warn!(
                        "Email relay client unavailable ({}); codes will be shown on screen",
                        e
                    );
                    Arc::new(NullMailer)
                }
            }
        }
        None => {
            tracing::info!("EMAIL_RELAY_URL not set; codes will be shown on screen");
            Arc::new(NullMailer)
        }
    };

    // Materialize the default quiz configuration on first boot
    let quiz_config = bank::get_config(durable.as_ref());
    tracing::info!(
        "Quiz configuration loaded: '{}' ({} questions, active: {})",
        quiz_config.title,
        quiz_config.questions.len(),
        quiz_config.is_active
    );

    // Create AppState
    let state = AppState {
        durable,
        ephemeral,
        mailer,
        config,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("quizgate listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
