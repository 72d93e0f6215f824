use std::path::Path;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::error::ScribeError;
use crate::core::model::{GenerateRequest, ModelClient, Part, PreparedContent, RemoteFile};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL)
    }

    pub fn with_base_url(api_key: String, model: Option<String>, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn model_url(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{method}", self.base_url, self.model)
    }

    fn file_url(&self, name: &str) -> String {
        format!("{}/v1beta/{name}", self.base_url)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response, ScribeError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| ScribeError::Request(err.to_string()))?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ScribeError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ScribeError::Request(format!(
        "gemini returned status {status}: {body}"
    )))
}

fn contents_json(request: &GenerateRequest<'_>) -> Value {
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::Audio(PreparedContent::Inline { data, mime_type }) => json!({
                "inlineData": {
                    "mimeType": mime_type,
                    "data": base64::engine::general_purpose::STANDARD.encode(data)
                }
            }),
            Part::Audio(PreparedContent::Remote(file)) => json!({
                "fileData": {
                    "mimeType": file.mime_type,
                    "fileUri": file.uri
                }
            }),
        })
        .collect();

    json!([{ "role": "user", "parts": parts }])
}

pub fn generate_body(request: &GenerateRequest<'_>) -> Value {
    let mut body = json!({
        "contents": contents_json(request),
        "generationConfig": {
            "temperature": request.config.temperature,
            "maxOutputTokens": request.config.max_output_tokens
        }
    });
    if let Some(instruction) = request.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }
    body
}

pub fn count_tokens_body(request: &GenerateRequest<'_>) -> Value {
    json!({ "contents": contents_json(request) })
}

/// Joins the text parts of the first candidate.
pub fn extract_text(payload: GenerateResponse) -> Result<String, ScribeError> {
    let Some(candidate) = payload.candidates.into_iter().next() else {
        let reason = payload
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map(|reason| format!(" (blocked: {reason})"))
            .unwrap_or_default();
        return Err(ScribeError::EmptyResponse(format!(
            "gemini returned no candidates{reason}"
        )));
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        let reason = candidate
            .finish_reason
            .map(|reason| format!(" (finish reason: {reason})"))
            .unwrap_or_default();
        return Err(ScribeError::EmptyResponse(format!(
            "gemini returned no text{reason}"
        )));
    }
    Ok(text)
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, ScribeError> {
        let response = self
            .post_json(&self.model_url("generateContent"), &generate_body(request))
            .await?;

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| ScribeError::Request(format!("invalid gemini payload: {err}")))?;

        extract_text(payload)
    }

    async fn count_tokens(&self, request: &GenerateRequest<'_>) -> Result<u64, ScribeError> {
        let response = self
            .post_json(&self.model_url("countTokens"), &count_tokens_body(request))
            .await?;

        let payload: CountTokensResponse = response
            .json()
            .await
            .map_err(|err| ScribeError::Request(format!("invalid token count payload: {err}")))?;

        Ok(payload.total_tokens)
    }

    async fn upload(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, ScribeError> {
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|err| ScribeError::Request(err.to_string()))?;
        let start = ensure_success(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ScribeError::Request("gemini did not return an upload url".to_string())
            })?;

        let finished = self
            .client
            .post(upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|err| ScribeError::Request(err.to_string()))?;
        let finished = ensure_success(finished).await?;

        let payload: FileEnvelope = finished
            .json()
            .await
            .map_err(|err| ScribeError::Request(format!("invalid upload payload: {err}")))?;

        tracing::debug!(name = %payload.file.name, state = %payload.file.state, "upload finalized");
        Ok(payload.file)
    }

    async fn file_status(&self, name: &str) -> Result<RemoteFile, ScribeError> {
        let response = self
            .client
            .get(self.file_url(name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|err| ScribeError::Request(err.to_string()))?;
        let response = ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|err| ScribeError::Request(format!("invalid file payload: {err}")))
    }

    async fn delete(&self, file: &RemoteFile) -> Result<(), ScribeError> {
        let response = self
            .client
            .delete(self.file_url(&file.name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|err| ScribeError::Request(err.to_string()))?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountTokensResponse {
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct FileEnvelope {
    file: RemoteFile,
}
