use reqwest::header::HeaderValue;

use crate::core::error::ScribeError;

/// Normalizes the api key taken from `--api-key` or `GEMINI_API_KEY`.
pub fn resolve_api_key(api_key: Option<&str>) -> Result<String, ScribeError> {
    let trimmed_key = api_key.map(str::trim).unwrap_or_default();
    if trimmed_key.is_empty() {
        return Err(ScribeError::MissingCredential);
    }

    HeaderValue::from_str(trimmed_key).map_err(|_| ScribeError::InvalidCredential)?;

    Ok(trimmed_key.to_string())
}
