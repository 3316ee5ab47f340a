//! `triagent serve` — Start the HTTP gateway server.

use triagent_config::TriageConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TriageConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🩺 Triagent Gateway");
    println!(
        "   Listening: {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("   Model:     {} via {}", config.model, config.base_url);
    println!("   Knowledge: {}", config.retrieval.knowledge_url);

    triagent_gateway::serve(config).await?;

    Ok(())
}
