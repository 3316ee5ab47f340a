//! `triagent sessions` — Inspect stored conversation histories.

use triagent_config::TriageConfig;
use triagent_core::SessionStore;
use triagent_core::message::{Role, SessionId};
use triagent_session::SqliteSessionStore;

async fn open_store() -> Result<SqliteSessionStore, Box<dyn std::error::Error>> {
    let config = TriageConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(SqliteSessionStore::new(&config.session.database_url).await?)
}

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    let sessions = store.list_sessions().await?;

    if sessions.is_empty() {
        println!("No stored sessions yet. Run `triagent chat` to start one.");
        return Ok(());
    }

    println!("{:<24} {:>6}  {}", "SESSION", "TURNS", "LAST ACTIVITY");
    for summary in sessions {
        println!(
            "{:<24} {:>6}  {}",
            summary.id,
            summary.turns,
            summary
                .updated_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}

pub async fn show(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    let session_id = SessionId::from(id);
    let turns = store.history(&session_id).await?;

    if turns.is_empty() {
        return Err(format!("No session named {id}").into());
    }

    println!("Session {session_id} — {} turns", turns.len());
    println!();
    for turn in turns {
        let who = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
        };
        println!(
            "[{}] {who}:",
            turn.timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
        for line in turn.content.lines() {
            println!("  {line}");
        }
        println!();
    }

    Ok(())
}
