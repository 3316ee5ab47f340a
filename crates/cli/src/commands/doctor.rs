//! `triagent doctor` — Diagnose backend connectivity.

use triagent_config::TriageConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Triagent Doctor — Connectivity Checks");
    println!("========================================\n");

    let mut issues = 0;

    // Config
    let config_path = TriageConfig::config_dir().join("config.toml");
    let config = match TriageConfig::load() {
        Ok(config) => {
            if config_path.exists() {
                println!("  ✅ Config file valid");
            } else {
                println!("  ℹ️  No config file, using defaults (run `triagent init`)");
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            return Err(e.into());
        }
    };

    let key_display = if config.api_key.is_some() {
        "set (redacted)"
    } else {
        "none (local placeholder)"
    };
    println!("     Model:     {}", config.model);
    println!("     Backend:   {}", config.base_url);
    println!("     Knowledge: {}", config.retrieval.knowledge_url);
    println!("     API key:   {key_display}");
    println!();

    // Completion backend
    let provider = triagent_providers::build_from_config(&config);
    match provider.health_check().await {
        Ok(true) => println!("  ✅ Completion backend reachable"),
        Ok(false) => {
            println!("  ❌ Completion backend unhealthy");
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Completion backend unreachable: {e}");
            issues += 1;
        }
    }

    // Knowledge index
    let knowledge = triagent_knowledge::build_from_config(&config);
    match knowledge.health_check().await {
        Ok(true) => println!("  ✅ Knowledge index reachable"),
        Ok(false) => {
            println!("  ❌ Knowledge index unhealthy");
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Knowledge index unreachable: {e}");
            issues += 1;
        }
    }

    // Session database (the sqlite store creates its file on first open)
    match triagent_session::SqliteSessionStore::new(&config.session.database_url).await {
        Ok(_) => println!("  ✅ Session database opens"),
        Err(e) => {
            println!("  ❌ Session database failed: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
