use artha_advisor::{advisor::AdvisoryClient, api::start_server, chat::ChatClient};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("⚠️  GEMINI_API_KEY not set in .env");
        eprintln!("📌 See .env.example for setup instructions");
        String::new()
    });

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("🚀 ArthaAI Advisor - API Server");
    info!("📍 Port: {}", api_port);

    let advisor = Arc::new(AdvisoryClient::gemini(gemini_api_key.clone()));
    let chat = Arc::new(ChatClient::gemini(gemini_api_key));

    info!("✅ Advisory clients initialized");
    info!("📡 Starting API server...");

    start_server(advisor, chat, api_port).await?;

    Ok(())
}
