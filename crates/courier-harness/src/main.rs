//! Interactive harness entry point.
//!
//! Opens and seeds the fixture store, builds the model client from
//! environment configuration, and runs a line-oriented REPL over stdin.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use courier_core::SessionContext;
use courier_dialog::{DialogRouter, Session};
use courier_llm::{ChatModel, Retrying, RetryPolicy, UnifiedClient};
use courier_store::{CheckpointStore, FixtureStore, DEFAULT_USER};
use courier_tools::Toolbox;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let db_path = std::env::var("COURIER_DB").unwrap_or_else(|_| "data/fixtures.db".into());
    let sessions_path =
        std::env::var("COURIER_SESSIONS_DB").unwrap_or_else(|_| "data/sessions.db".into());
    let model_name = std::env::var("COURIER_MODEL").unwrap_or_else(|_| "gpt-4-turbo".into());
    let api_base = std::env::var("OPENAI_API_BASE").ok();
    let user_id = std::env::var("COURIER_USER").unwrap_or_else(|_| DEFAULT_USER.into());
    let session_id =
        std::env::var("COURIER_SESSION").unwrap_or_else(|_| Uuid::new_v4().to_string());

    let store = Arc::new(FixtureStore::open(&db_path)?);
    let seeded = store.seed_sample_data(Local::now().naive_local())?;
    if seeded > 0 {
        info!("Seeded {} fixture rows", seeded);
    }

    let model: Arc<dyn ChatModel> = Arc::new(Retrying::new(
        UnifiedClient::for_model(&model_name, api_base.as_deref()),
        RetryPolicy::default(),
    ));
    info!("Using model {}", model_name);

    let router = DialogRouter::new(model, Toolbox::new(store));
    let checkpoints = CheckpointStore::open(&sessions_path)?;
    let ctx = SessionContext::new(user_id.clone(), session_id.clone());
    let mut session = Session::resume(ctx, router, checkpoints)?;

    info!("Session {} as {}", session_id, user_id);
    println!("Courier assistant ready. Empty line or Ctrl-D exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt_marker()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        match session.send(line).await {
            Ok(reply) => println!("{reply}\n"),
            // Keep the loop alive; retries are already exhausted by now.
            Err(e) => error!("Turn failed: {}", e),
        }
        prompt_marker()?;
    }

    println!("Bye.");
    Ok(())
}

fn prompt_marker() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}
