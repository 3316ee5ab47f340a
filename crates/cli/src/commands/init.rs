//! `triagent init` — Write a starter configuration file.

use triagent_config::TriageConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = TriageConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🩺 Triagent — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("  Config file exists, leaving it untouched.");
    } else {
        std::fs::write(&config_path, TriageConfig::default_toml())?;
        println!("✅ Wrote starter config: {}", config_path.display());
    }

    let defaults = TriageConfig::default();
    println!();
    println!("Next steps:");
    println!(
        "  1. Start your local completion server (default {})",
        defaults.base_url
    );
    println!(
        "  2. Start the knowledge index (default {})",
        defaults.retrieval.knowledge_url
    );
    println!("  3. Run `triagent doctor` to verify connectivity");
    println!("  4. Run `triagent chat` to start a conversation");

    Ok(())
}
