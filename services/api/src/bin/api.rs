//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{build_provider_client, OpenAiCompletionAdapter, PgChatLogAdapter},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::Router;
use std::sync::Arc;
use sungura_core::ports::ChatLogService;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Sungura API initializing...");

    // --- 2. Completion Provider ---
    match &config.provider_api_key {
        Some(key) => info!(
            "Provider API key detected ({} chars), base URL {}",
            key.len(),
            config.provider_base_url
        ),
        None => warn!("OPENROUTER_API_KEY is missing! Chat requests will fail until it is set."),
    }
    let provider_client = build_provider_client(&config)?;
    let completion = Arc::new(OpenAiCompletionAdapter::new(
        provider_client,
        config.provider_max_retries,
    ));

    // --- 3. Optional Chat Log ---
    let chat_log: Option<Arc<dyn ChatLogService>> = match &config.persistence {
        Some(persistence) => {
            let adapter = PgChatLogAdapter::connect_lazy(persistence)?;
            info!("Running chat log migrations...");
            if let Err(e) = adapter.run_migrations().await {
                error!("Chat log migrations failed, writes may fail: {}", e);
            }
            let adapter: Arc<dyn ChatLogService> = Arc::new(adapter);
            Some(adapter)
        }
        None => {
            warn!("DATABASE_URL or DATABASE_SERVICE_KEY is missing. Chat persistence is disabled.");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        completion,
        chat_log,
    });

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!("Mounted at / and {:?}", config.route_prefixes);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
