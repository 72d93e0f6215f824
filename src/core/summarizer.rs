use std::sync::Arc;

use crate::core::error::ScribeError;
use crate::core::model::{report_token_count, GenerateRequest, GenerationConfig, ModelClient, Part};

pub const SUMMARY_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.3,
    max_output_tokens: 2048,
};

pub fn summary_prompt(text: &str) -> String {
    format!(
        "Please provide a concise summary of the following text.\n\
         Include the main points and key information.\n\
         \n\
         Text to summarize:\n\
         {text}\n"
    )
}

pub struct Summarizer {
    client: Arc<dyn ModelClient>,
}

impl Summarizer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub async fn summarize(&self, text: &str) -> Result<String, ScribeError> {
        let request = GenerateRequest {
            system_instruction: None,
            parts: vec![Part::Text(summary_prompt(text))],
            config: SUMMARY_CONFIG,
        };

        report_token_count(self.client.as_ref(), &request, "Summary input tokens").await;

        tracing::info!("Generating summary using {}...", self.client.model_name());
        let summary = self
            .client
            .generate(&request)
            .await
            .map_err(|err| ScribeError::Summarization(err.to_string()))?;

        if summary.trim().is_empty() {
            return Err(ScribeError::Summarization(
                "model returned no summary text".to_string(),
            ));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_transcript_after_instruction() {
        let prompt = summary_prompt("the quarterly numbers are up");
        assert!(prompt.starts_with("Please provide a concise summary"));
        assert!(prompt.ends_with("Text to summarize:\nthe quarterly numbers are up\n"));
    }
}
