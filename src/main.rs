//! # doc-chat CLI (`docchat`)
//!
//! The `docchat` binary runs the HTTP server and provides local commands
//! for the same document Q&A flow.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./config/docchat.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat serve` | Start the HTTP API server |
//! | `docchat ask "<question>"` | Answer a question from the stored documents |
//! | `docchat documents` | List stored documents |
//! | `docchat show <name>` | Print a document's full content |

mod answer;
mod ask;
mod completion;
mod config;
mod documents;
mod matcher;
mod models;
mod server;
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// doc-chat — a chat service with document-grounded question answering.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docchat.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "doc-chat — chat and document-grounded Q&A over plain-text files",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// upload, chat, Q&A, and document listing endpoints.
    Serve,

    /// Answer a question from the stored documents.
    ///
    /// Matches documents with the same policy as `POST /docs-qa` and prints
    /// the answer with its sources. Requires `OPENAI_API_KEY` unless no
    /// documents match.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// List stored documents with size, date, and a short preview.
    Documents,

    /// Print a single document's full content.
    Show {
        /// Document filename (e.g. `animals.txt`).
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ask { question } => {
            ask::run_ask(&cfg, &question).await?;
        }
        Commands::Documents => {
            documents::run_documents(&cfg)?;
        }
        Commands::Show { name } => {
            documents::run_show(&cfg, &name)?;
        }
    }

    Ok(())
}
