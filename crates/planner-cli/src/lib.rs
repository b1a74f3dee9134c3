//! Shared startup for the `planner` and `react` binaries.

pub mod console;

use std::sync::Arc;

use planner_core::{GenerationOptions, LlmProvider};
use planner_runtime::OpenAiProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing from `RUST_LOG` (default `info`) and load `.env`
pub fn init() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the provider from the environment; a missing credential is fatal
pub fn provider() -> anyhow::Result<Arc<dyn LlmProvider>> {
    let provider = OpenAiProvider::from_env()?;
    tracing::info!("✓ {} provider configured", provider.name());
    Ok(Arc::new(provider))
}

/// Generation options, honouring `OPENAI_MODEL`
pub fn generation_options() -> GenerationOptions {
    std::env::var("OPENAI_MODEL")
        .ok()
        .filter(|m| !m.trim().is_empty())
        .map_or_else(GenerationOptions::default, |model| GenerationOptions::with_model(model))
}
