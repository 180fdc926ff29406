//! Omni Nexus backend
//!
//! A thin HTTP backend that:
//! - Relays user messages to an OpenAI chat model
//! - Accepts chat transcripts with file attachments
//! - Answers financial questions from the Sienge ERP, using the model only
//!   to classify the question into a fixed set of intents
//!
//! QUERY FLOW:
//! QUESTION → CLASSIFY → DISPATCH → RESPOND

pub mod api;
pub mod attachments;
pub mod classifier;
pub mod config;
pub mod error;
pub mod intent;
pub mod models;
pub mod openai;
pub mod relay;
pub mod sienge;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::Intent;
pub use error::NexusError;

/// Install the fmt subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
