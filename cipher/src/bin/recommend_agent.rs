//! Agent recommendation - Entry Point
//!
//! Recommends one of the built-in specialist agents for the prompt given on
//! the command line, using the configured Ollama server.
//!
//! ```text
//! recommend_agent "I want to bake bread and relax"
//! ```

use cipher::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if dotenvy::from_path("../.env").is_err() {
        let _ = dotenvy::dotenv();
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: recommend_agent <prompt>");
        std::process::exit(2);
    }

    let config = match CipherConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let generator = OllamaGenerator::from_config(&config).with_json_output();
    let recommender = AgentRecommender::new(generator);

    match recommender.recommend(&prompt).await {
        Ok(recommendation) => match serde_json::to_string_pretty(&recommendation) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {e}"),
        },
        Err(Error::Recommend(RecommendError::InvalidJson(_))) => {
            println!("Error: Response is not valid JSON.");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
