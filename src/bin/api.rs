use omni_nexus_backend::{api::start_server, api::ApiState, config::Config, init_tracing};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing();

    let config = Config::from_env()?;

    if config.openai.api_key.is_none() {
        warn!("⚠️  OPENAI_API_KEY not set in .env, LLM calls will fail");
    }
    if config.sienge.user.is_none() || config.sienge.pass.is_none() {
        warn!("⚠️  SIENGE_USER / SIENGE_PASS not set, /consulta cannot reach Sienge");
    }

    info!("🚀 Omni Nexus backend - API Server");
    info!("📍 Port: {}", config.port);
    info!("🤖 Chat model: {}", config.openai.chat_model);
    info!("🏷️  Classifier model: {}", config.openai.classifier_model);
    info!("🏗️  Sienge: {}", config.sienge.base_url);

    let state = ApiState::from_config(&config)?;

    info!("📡 Starting API server...");

    start_server(state, config.port).await?;

    Ok(())
}
