// Copyright 2025 Ragscope (https://github.com/ragscope)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Ragscope CLI
//!
//! Loads a conversation document and a context-vector document, evaluates
//! the most recent user/AI turn pair, prints the report and persists it.
//! A structural pipeline error yields the `{"error": "..."}` document
//! instead of a report; that is an evaluation outcome, not a process
//! failure, so the exit code stays 0.

use anyhow::{Context, Result};
use clap::Parser;
use ragscope_core::{
    report::to_pretty_json, ContextDocument, ConversationDocument, EvaluationReport,
};
use ragscope_evals::llm_client::{EmbeddingClient, LocalEmbeddingClient, OpenAiClient};
use ragscope_evals::{EvalConfig, EvaluationPipeline, PipelineError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "ragscope")]
#[command(about = "Ragscope - RAG chat response evaluation", long_about = None)]
struct Cli {
    /// Conversation JSON file (`conversation_turns` array)
    #[arg(long)]
    chat: PathBuf,

    /// Context vector JSON file (`data.vector_data` array)
    #[arg(long)]
    vectors: PathBuf,

    /// Where to write the report
    #[arg(long, default_value = "evaluation_report.json")]
    output: PathBuf,

    /// Judge model
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Use the deterministic local embedder instead of the embeddings API
    #[arg(long)]
    offline: bool,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
}

fn load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Render the run outcome as the output document: the report itself, or
/// the `{"error": "..."}` object for a structural failure.
fn render_outcome(outcome: Result<EvaluationReport, PipelineError>) -> Result<String> {
    let document = match outcome {
        Ok(report) => to_pretty_json(&report)?,
        Err(err) => to_pretty_json(&serde_json::json!({ "error": err.to_string() }))?,
    };
    Ok(document)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let chat: ConversationDocument = load(&cli.chat)?;
    let vectors: ContextDocument = load(&cli.vectors)?;

    let config = EvalConfig::default().with_judge_model(cli.model.clone());
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    let client = Arc::new(
        OpenAiClient::new(api_key, config.judge_model.clone())
            .with_embedding_model(config.embedding_model.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs)),
    );

    let embedder: Arc<dyn EmbeddingClient> = if cli.offline {
        Arc::new(LocalEmbeddingClient::new())
    } else {
        client.clone()
    };

    let pipeline = EvaluationPipeline::with_config(embedder, client, config);
    let document = render_outcome(pipeline.run(&chat, &vectors).await)?;

    println!("\n===== FINAL REPORT =====");
    println!("{document}");

    std::fs::write(&cli.output, &document)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    info!(path = %cli.output.display(), "report written");

    Ok(())
}
