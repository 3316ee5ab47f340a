//! `triagent chat` — Interactive triage conversation.
//!
//! Streams the reply token-by-token and tags each turn with its severity.
//! `--session` resumes a stored conversation; its history is replayed into
//! the prompt context but not re-printed.

use super::TriageRuntime;
use std::io::Write;
use triagent_agent::TriageStreamEvent;
use triagent_config::TriageConfig;
use triagent_core::Severity;
use triagent_core::message::{Conversation, SessionId};

pub async fn run(session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = TriageConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let runtime = TriageRuntime::build(&config).await?;

    let (session_id, history) = match session {
        Some(id) => {
            let sid = SessionId::from(&id);
            let history = runtime.store.history(&sid).await?;
            (sid, history)
        }
        None => (runtime.allocator.next_id()?, Vec::new()),
    };

    let mut conversation = Conversation::from_turns(session_id.clone(), history);

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Triagent — Interactive Triage         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Session:   {session_id}");
    println!("  Model:     {}", config.model);
    println!("  Backend:   {}", config.base_url);
    if !conversation.turns.is_empty() {
        println!("  Resumed:   {} stored turns", conversation.turns.len());
    }
    println!();
    println!("  This assistant does not replace professional medical care.");
    println!("  In an emergency, call your local emergency number first.");
    println!();
    println!("  Describe your symptoms and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let before = conversation.turns.len();
        let (tx, mut rx) = tokio::sync::mpsc::channel::<TriageStreamEvent>(64);

        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    TriageStreamEvent::Severity { severity } => {
                        println!();
                        match severity {
                            Severity::Critical => println!("  🚨 [CRITICAL]"),
                            Severity::Normal => println!("  [NORMAL]"),
                        }
                        print!("  Assistant > ");
                        let _ = std::io::stdout().flush();
                    }
                    TriageStreamEvent::Chunk { content } => {
                        print!("{content}");
                        let _ = std::io::stdout().flush();
                    }
                    TriageStreamEvent::Error { message } => {
                        eprintln!();
                        eprintln!("  [stream error: {message}]");
                    }
                    TriageStreamEvent::Done { .. } => {}
                }
            }
        });

        runtime
            .orchestrator
            .run_streaming(&mut conversation, &line, tx)
            .await;
        printer.await?;
        println!();
        println!();

        for turn in &conversation.turns[before..] {
            if let Err(e) = runtime.store.append_turn(&conversation.id, turn).await {
                tracing::warn!(error = %e, "Could not persist turn");
            }
        }
    }

    println!();
    println!("  Take care! 👋");
    println!();

    Ok(())
}
