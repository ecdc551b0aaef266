use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use banter::config::Config;
use banter::embedding::onnx::OnnxEmbedder;
use banter::topics::pipeline::TopicPipeline;

/// Banter: topic extraction for chat logs.
///
/// Reads a batch of chat messages and prints a ranked list of short
/// topic labels — a compact "what are people talking about" summary.
#[derive(Parser)]
#[command(name = "banter", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract ranked topics from chat messages (one message per line)
    Topics {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,

        /// Extra word to exclude from labels (repeatable)
        #[arg(long = "stopword")]
        stopwords: Vec<String>,

        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Download the ONNX sentence embedding model (~90 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("banter=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Topics {
            file,
            stopwords,
            json,
        } => {
            let config = Config::load()?;
            config.require_model()?;

            let messages = read_messages(file.as_deref())?;
            if !json {
                println!("Analyzing {} messages...", messages.len());
            }

            let embedder = OnnxEmbedder::load(&config.model_dir)?;
            let pipeline = TopicPipeline::new(Arc::new(embedder));
            let topics = pipeline.extract_topics(&messages, &stopwords).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&topics)?);
            } else if topics.is_empty() {
                println!(
                    "{}",
                    "No topics found — too few messages, or nothing distinctive enough."
                        .dimmed()
                );
            } else {
                banter::output::terminal::display_topics(&topics);
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;

            println!("Downloading embedding model (all-MiniLM-L6-v2)...");
            println!("  Destination: {}", config.model_dir.display());

            banter::embedding::download::download_model(&config.model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `banter topics <file>`.");
        }
    }

    Ok(())
}

/// Read one message per line from a file, or stdin when no path is given.
/// Blank lines are skipped.
fn read_messages(path: Option<&Path>) -> Result<Vec<String>> {
    let lines: Vec<String> = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            BufReader::new(file)
                .lines()
                .collect::<io::Result<_>>()
                .context("Failed to read input file")?
        }
        None => io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<_>>()
            .context("Failed to read stdin")?,
    };

    Ok(lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}
