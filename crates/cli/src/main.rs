//! Triagent CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write a starter config file
//! - `chat`     — Interactive triage conversation
//! - `ask`      — One-shot triage of a single message
//! - `serve`    — Start the HTTP gateway
//! - `sessions` — Inspect stored conversation histories
//! - `doctor`   — Diagnose backend connectivity

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "triagent",
    about = "Triagent — local medical triage assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Init,

    /// Start an interactive triage conversation
    Chat {
        /// Resume an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Triage a single message and print the reply
    Ask {
        /// The patient message
        message: String,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect stored sessions
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },

    /// Diagnose backend connectivity
    Doctor,
}

#[derive(Subcommand)]
enum SessionsCommand {
    /// List stored sessions, most recent first
    List,

    /// Print the full history of one session
    Show {
        /// The session id (e.g. patient_session_003)
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Chat { session } => commands::chat::run(session).await?,
        Commands::Ask { message } => commands::ask::run(&message).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Sessions { command } => match command {
            SessionsCommand::List => commands::sessions::list().await?,
            SessionsCommand::Show { id } => commands::sessions::show(&id).await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
