//! `triagent ask` — One-shot triage of a single message.

use super::TriageRuntime;
use triagent_agent::trim_to_first_step;
use triagent_config::TriageConfig;
use triagent_core::message::Conversation;

pub async fn run(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = TriageConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let runtime = TriageRuntime::build(&config).await?;

    let session_id = runtime.allocator.next_id()?;
    let mut conversation = Conversation::new(session_id.clone());

    eprint!("  Assessing...");
    let outcome = runtime.orchestrator.run(&mut conversation, message).await;
    eprint!("\r              \r");

    for turn in &conversation.turns {
        if let Err(e) = runtime.store.append_turn(&session_id, turn).await {
            tracing::warn!(error = %e, "Could not persist turn");
        }
    }

    println!("[{}] {}", outcome.severity, session_id);
    println!();
    println!("{}", trim_to_first_step(&outcome.reply));

    Ok(())
}
