use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::audio::source::mime_type_for;
use crate::core::error::ScribeError;
use crate::core::model::{FileState, ModelClient, PreparedContent, RemoteFile};

pub const INLINE_LIMIT_MB: f64 = 20.0;
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStrategy {
    Inline,
    Upload,
    /// Inline was requested but the file is too large to embed.
    UploadOversizedInline,
}

pub fn choose_strategy(size_mb: f64, prefer_inline: bool, threshold_mb: f64) -> ContentStrategy {
    if size_mb < threshold_mb {
        ContentStrategy::Inline
    } else if prefer_inline {
        ContentStrategy::UploadOversizedInline
    } else {
        ContentStrategy::Upload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Wait,
    Ready,
    Failed(FileState),
}

pub fn poll_step(state: FileState) -> PollStep {
    match state {
        FileState::Processing => PollStep::Wait,
        FileState::Active => PollStep::Ready,
        other => PollStep::Failed(other),
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polls the remote file until it leaves the processing state.
pub async fn wait_until_active(
    client: &dyn ModelClient,
    sleeper: &dyn Sleeper,
    interval: Duration,
    mut file: RemoteFile,
) -> Result<RemoteFile, ScribeError> {
    loop {
        match poll_step(file.state) {
            PollStep::Ready => return Ok(file),
            PollStep::Failed(state) => return Err(ScribeError::UploadFailed(state)),
            PollStep::Wait => {
                sleeper.sleep(interval).await;
                file = client.file_status(&file.name).await?;
            }
        }
    }
}

pub struct ContentPreparer {
    client: Arc<dyn ModelClient>,
    sleeper: Arc<dyn Sleeper>,
    poll_interval: Duration,
    inline_limit_mb: f64,
}

impl ContentPreparer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            poll_interval: POLL_INTERVAL,
            inline_limit_mb: INLINE_LIMIT_MB,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn prepare(
        &self,
        path: &Path,
        size_mb: f64,
        prefer_inline: bool,
    ) -> Result<PreparedContent, ScribeError> {
        match choose_strategy(size_mb, prefer_inline, self.inline_limit_mb) {
            ContentStrategy::Inline => self.read_inline(path).await,
            ContentStrategy::UploadOversizedInline => {
                tracing::warn!(
                    "File size ({size_mb:.2} MB) exceeds limit for inline processing."
                );
                tracing::warn!("Switching to file upload method...");
                self.upload(path, size_mb).await
            }
            ContentStrategy::Upload => self.upload(path, size_mb).await,
        }
    }

    async fn read_inline(&self, path: &Path) -> Result<PreparedContent, ScribeError> {
        tracing::info!("Processing audio inline...");
        let data = tokio::fs::read(path).await?;
        Ok(PreparedContent::Inline {
            data,
            mime_type: mime_type_for(path).to_string(),
        })
    }

    async fn upload(&self, path: &Path, size_mb: f64) -> Result<PreparedContent, ScribeError> {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!("Uploading file: {display_name} ({size_mb:.2} MB)");

        let uploaded = self.client.upload(path, mime_type_for(path)).await?;

        tracing::info!("Waiting for file processing...");
        let file = match wait_until_active(
            self.client.as_ref(),
            self.sleeper.as_ref(),
            self.poll_interval,
            uploaded.clone(),
        )
        .await
        {
            Ok(file) => file,
            Err(err) => {
                if let Err(cleanup) = self.client.delete(&uploaded).await {
                    tracing::warn!("Could not delete uploaded file: {cleanup}");
                }
                return Err(err);
            }
        };

        tracing::info!("File uploaded successfully: {}", file.uri);
        Ok(PreparedContent::Remote(file))
    }
}
