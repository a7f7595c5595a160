//! Ask command handler.
//!
//! Sends one question to the knowledge base and prints the shaped answer.

use clap::Args;
use kbquery_core::{config::AppConfig, AppResult};
use kbquery_query::{QueryInput, QueryService};
use kbquery_render::Renderer;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Retrieval reasoning effort (minimal, low, medium)
    #[arg(short, long)]
    pub effort: Option<String>,

    /// Output mode (extractiveData, answerSynthesis)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Output the interaction as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let service = QueryService::from_config(config)?;
        let renderer = Renderer::with_workspace(&config.workspace)?;

        let mut input = QueryInput::new(self.question.clone());
        input.retrieval_reasoning_effort = self.effort.clone();
        input.knowledge_retrieval_output_mode = self.mode.clone();

        let interaction = match service.submit(&input).await {
            Ok(interaction) => interaction,
            Err(failure) => {
                tracing::info!("Query failed after {:.2}s", failure.timing.total);
                return Err(failure.error);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&interaction)?);
        } else {
            print!("{}", renderer.render_interaction_text(&interaction)?);
        }

        Ok(())
    }
}
