pub mod llm;
pub mod prompt;
pub mod schema;

pub use llm::{CompletionClient, LlmConfig, OpenAiClient};
pub use prompt::{
    ANALYSIS_PROMPT, PromptTemplate, PromptValues, QUOTE_PROMPT, RELATIONSHIP_PROMPT,
    SYSTEM_PROMPT, TemplateError, build_analysis_prompt,
};
pub use schema::{ChatMessage, Role};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// How much of the book text goes into the analysis prompt
pub const EXCERPT_CHARS: usize = 1000;
pub const MAX_CHARACTERS: usize = 15;

/// Sends the analysis conversation for a book.
///
/// The reply is not used for anything yet; the call exists so a real analysis
/// backend can be slotted in later.
#[derive(Clone)]
pub struct Analyzer {
    client: Arc<dyn CompletionClient>,
}

impl Analyzer {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn conversation(title: &str, author: &str, text: &str) -> Result<Vec<ChatMessage>> {
        let excerpt = excerpt(text, EXCERPT_CHARS);
        let system = SYSTEM_PROMPT
            .render(&PromptValues::new())
            .context("Failed to render system prompt")?;
        let user = build_analysis_prompt(title, author, excerpt, MAX_CHARACTERS)
            .context("Failed to render analysis prompt")?;

        Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    pub async fn start(&self, title: &str, author: &str, text: &str) -> Result<()> {
        let conversation = Self::conversation(title, author, text)?;
        let reply = self.client.complete(&conversation).await?;
        info!(title, reply_chars = reply.content.len(), "Analysis request accepted");
        Ok(())
    }
}

/// First `max_chars` characters of `text`
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
