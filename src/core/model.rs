use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::error::ScribeError;

/// Processing state of a file held by the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StateUnspecified => "STATE_UNSPECIFIED",
            Self::Processing => "PROCESSING",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Handle to audio uploaded to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub state: FileState,
}

/// Audio ready to be attached to a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedContent {
    Inline { data: Vec<u8>, mime_type: String },
    Remote(RemoteFile),
}

impl PreparedContent {
    pub fn remote_file(&self) -> Option<&RemoteFile> {
        match self {
            Self::Remote(file) => Some(file),
            Self::Inline { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part<'a> {
    Text(String),
    Audio(&'a PreparedContent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest<'a> {
    pub system_instruction: Option<&'a str>,
    pub parts: Vec<Part<'a>>,
    pub config: GenerationConfig,
}

impl GenerateRequest<'_> {
    /// First text part, which carries the prompt.
    pub fn prompt(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            Part::Text(text) => Some(text.as_str()),
            Part::Audio(_) => None,
        })
    }

    pub fn audio(&self) -> Option<&PreparedContent> {
        self.parts.iter().find_map(|part| match part {
            Part::Audio(content) => Some(*content),
            Part::Text(_) => None,
        })
    }
}

/// Narrow view of the remote generative model used by the pipeline.
#[async_trait]
pub trait ModelClient: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, ScribeError>;

    async fn count_tokens(&self, request: &GenerateRequest<'_>) -> Result<u64, ScribeError>;

    async fn upload(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, ScribeError>;

    async fn file_status(&self, name: &str) -> Result<RemoteFile, ScribeError>;

    async fn delete(&self, file: &RemoteFile) -> Result<(), ScribeError>;
}

/// Logs the input token count for a request. Failures never abort the caller.
pub async fn report_token_count(
    client: &dyn ModelClient,
    request: &GenerateRequest<'_>,
    label: &str,
) {
    match client.count_tokens(request).await {
        Ok(0) => {}
        Ok(count) => tracing::info!("{label}: {count}"),
        Err(err) => tracing::warn!("Could not count tokens: {err}"),
    }
}
