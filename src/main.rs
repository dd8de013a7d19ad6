use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use medbook::config::AppConfig;
use medbook::db::{self, SqliteAppointmentStore};
use medbook::handlers;
use medbook::services::ai::groq::GroqProvider;
use medbook::services::ai::ollama::OllamaProvider;
use medbook::services::ai::LlmProvider;
use medbook::services::session::InMemorySessionStore;
use medbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    if config.seed_sample_data {
        let seeded = db::queries::seed_sample_data(&conn)?;
        tracing::info!(seeded, "sample appointments checked");
    }

    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!(
                "using Ollama LLM provider (url: {}, model: {})",
                config.ollama_url,
                config.ollama_model
            );
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            ))
        }
        _ => {
            if config.groq_api_key.is_empty() {
                tracing::warn!("GROQ_API_KEY is not set; chat will rely on local parsing only");
            }
            tracing::info!("using Groq LLM provider (model: {})", config.groq_model);
            Box::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
            ))
        }
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        llm,
        sessions: Box::new(InMemorySessionStore::new()),
        appointments: Box::new(SqliteAppointmentStore::new(conn)),
    });

    let mut origins = vec![HeaderValue::from_static("http://localhost:3000")];
    if let Some(url) = &config.frontend_url {
        match HeaderValue::from_str(url) {
            Ok(origin) => origins.push(origin),
            Err(e) => tracing::warn!(error = %e, "ignoring invalid FRONTEND_URL"),
        }
    }
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/chat", post(handlers::chat::chat))
        .route(
            "/admin/appointments",
            get(handlers::admin::list_appointments).post(handlers::admin::create_appointment),
        )
        .route(
            "/admin/appointments/:id",
            put(handlers::admin::update_appointment).delete(handlers::admin::delete_appointment),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
