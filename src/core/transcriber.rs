use std::sync::Arc;

use crate::audio::time_range::TimeRange;
use crate::core::error::ScribeError;
use crate::core::model::{
    report_token_count, GenerateRequest, GenerationConfig, ModelClient, Part, PreparedContent,
};

const GENERIC_PROMPT: &str =
    "Generate a transcript of the speech. Include all spoken content accurately.";

pub const TRANSCRIPTION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.1,
    max_output_tokens: 8192,
};

/// Picks the transcription instruction. The range is only referenced when
/// timestamp mode is on and both bounds are present.
pub fn transcription_prompt(use_timestamps: bool, range: &TimeRange) -> String {
    match (use_timestamps, range.start.as_deref(), range.end.as_deref()) {
        (true, Some(start), Some(end)) => {
            format!("Provide a transcript of the speech from {start} to {end}.")
        }
        _ => GENERIC_PROMPT.to_string(),
    }
}

pub struct Transcriber {
    client: Arc<dyn ModelClient>,
}

impl Transcriber {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub async fn transcribe(
        &self,
        content: &PreparedContent,
        system_instruction: Option<&str>,
        use_timestamps: bool,
        range: &TimeRange,
    ) -> Result<String, ScribeError> {
        let request = GenerateRequest {
            system_instruction: system_instruction.filter(|text| !text.trim().is_empty()),
            parts: vec![
                Part::Text(transcription_prompt(use_timestamps, range)),
                Part::Audio(content),
            ],
            config: TRANSCRIPTION_CONFIG,
        };

        report_token_count(self.client.as_ref(), &request, "Input tokens").await;

        tracing::info!("Transcribing audio using {}...", self.client.model_name());
        let text = self
            .client
            .generate(&request)
            .await
            .map_err(|err| match err {
                ScribeError::TranscriptionError(_) => err,
                other => ScribeError::TranscriptionError(other.to_string()),
            })?;

        if text.trim().is_empty() {
            return Err(ScribeError::TranscriptionError(
                "model returned no transcript text".to_string(),
            ));
        }
        Ok(text)
    }
}
