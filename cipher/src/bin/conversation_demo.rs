//! Conversation demo - Entry Point
//!
//! Alice and Bob talk about artificial consciousness, then Alice's memories
//! of the conversation are printed. Pass `--llm` to let Bob's thinking go
//! through the configured Ollama server instead of the placeholder.

use cipher::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    if dotenvy::from_path("../.env").is_err() {
        let _ = dotenvy::dotenv();
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let use_llm = std::env::args().any(|arg| arg == "--llm");

    if let Err(e) = run(use_llm).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(use_llm: bool) -> cipher::Result<()> {
    let config = CipherConfig::from_env()?;
    let mut world = World::new();

    let alice = world.create_person("Alice", 25);
    let bob = world.create_person("Bob", 30);
    let chat = world.create_conversation("AI and consciousness");

    world.join_conversation(alice, chat)?;
    world.join_conversation(bob, chat)?;

    world.speak(alice, "What do you think about artificial consciousness?")?;

    let bob_thought = if use_llm {
        let generator = OllamaGenerator::from_config(&config).with_streaming();
        world
            .person_mut(bob)?
            .think_with("Considering artificial consciousness...", &generator)
            .await?
    } else {
        world.think(bob, "Considering artificial consciousness...")?
    };
    println!("Bob thinks: {bob_thought}");

    world.speak(bob, "I think it's a complex topic that requires careful consideration.")?;
    world.speak(alice, "Interesting perspective! Can you elaborate?")?;

    let conversation = world.conversation(chat)?;
    println!("\nConversation history:");
    for message in conversation.message_history() {
        println!("{message}");
    }

    println!("\n{}", conversation.get_context_with(config.recent_messages));

    println!("\nAlice's memories about this conversation:");
    for memory in world
        .person(alice)?
        .memory()
        .retrieve_relevant_memories("consciousness", Some(chat))
    {
        println!("{memory}");
    }

    Ok(())
}
