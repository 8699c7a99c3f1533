use finance_query_engine::{
    api::start_server, assistant::FinanceAssistant, config::AssistantConfig,
    state::InMemoryProfileStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AssistantConfig::from_env();
    if config.gemini_api_key.is_none() {
        info!("GEMINI_API_KEY not set, all answers come from the deterministic engine");
    }

    info!("🚀 Finance Query Engine - API Server");
    info!("📍 Port: {}", config.port);

    let assistant = Arc::new(FinanceAssistant::from_config(&config)?);
    let store = Arc::new(InMemoryProfileStore::new(config.load_profile()?));

    info!("✅ Assistant initialized");
    info!("📡 Starting API server...");

    start_server(assistant, store, config.port).await?;

    Ok(())
}
