use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_ats::analysis::store::PgAnalysisStore;
use resume_ats::config::Config;
use resume_ats::db::create_pool;
use resume_ats::llm_client::{self, LlmClient};
use resume_ats::routes::build_router;
use resume_ats::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "resume_ats={0},resume_ats_api={0},tower_http={0}",
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume ATS API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    let llm = LlmClient::new(
        config.generation_api_url.clone(),
        config.generation_api_key.clone(),
    )?;
    info!(
        "Generation backend initialized (model: {}, endpoint: {}, server key: {})",
        llm_client::MODEL,
        llm.endpoint(),
        if config.generation_api_key.is_some() { "set" } else { "none" }
    );

    let state = AppState {
        db: db.clone(),
        llm: Arc::new(llm),
        analyses: Arc::new(PgAnalysisStore::new(db)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the editor host once it has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
