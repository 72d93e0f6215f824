use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::source::{bytes_to_mb, validate_file};
use crate::audio::time_range::TimeRange;
use crate::audio::trimmer::{trim_audio, TempArtifact, TrimOutcome, TrimReport};
use crate::core::content::{ContentPreparer, Sleeper};
use crate::core::error::ScribeError;
use crate::core::model::{ModelClient, RemoteFile};
use crate::core::summarizer::Summarizer;
use crate::core::transcriber::Transcriber;
use crate::output::text_writer::write_text;

/// One invocation of the tool: input audio, destinations and options.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: Option<PathBuf>,
    pub range: TimeRange,
    pub system_instruction: Option<String>,
    pub prefer_inline: bool,
    pub keep_uploaded: bool,
    pub use_timestamps: bool,
}

impl TranscriptionJob {
    /// Audio is sliced locally only when a bound is set outside timestamp mode.
    pub fn needs_physical_trim(&self) -> bool {
        !self.range.is_empty() && !self.use_timestamps
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobReport {
    pub transcript_chars: usize,
    pub summary_chars: Option<usize>,
    pub trimmed: Option<TrimReport>,
    pub uploaded: Option<String>,
}

/// Resources created during a run that must be released on every exit path.
#[derive(Default)]
struct StagedResources {
    artifact: Option<TempArtifact>,
    uploaded: Option<RemoteFile>,
}

pub struct TranscriptionOrchestrator {
    client: Arc<dyn ModelClient>,
    preparer: ContentPreparer,
    transcriber: Transcriber,
    summarizer: Summarizer,
}

impl TranscriptionOrchestrator {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            preparer: ContentPreparer::new(client.clone()),
            transcriber: Transcriber::new(client.clone()),
            summarizer: Summarizer::new(client.clone()),
            client,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.preparer = self.preparer.with_sleeper(sleeper);
        self
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub async fn run(&self, job: &TranscriptionJob) -> Result<JobReport, ScribeError> {
        let mut staged = StagedResources::default();
        let result = self.execute(job, &mut staged).await;
        self.cleanup(staged, job.keep_uploaded).await;
        result
    }

    /// Runs the job until it finishes or `interrupt` resolves. On interruption the
    /// pipeline is dropped, which removes any temporary trimmed file; remote
    /// cleanup is skipped.
    pub async fn run_until_interrupted<F>(
        &self,
        job: &TranscriptionJob,
        interrupt: F,
    ) -> Result<JobReport, ScribeError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        tokio::select! {
            biased;
            _ = &mut interrupt => {
                tracing::warn!("Process interrupted by user");
                Err(ScribeError::UserInterrupted)
            }
            result = self.run(job) => result,
        }
    }

    async fn execute(
        &self,
        job: &TranscriptionJob,
        staged: &mut StagedResources,
    ) -> Result<JobReport, ScribeError> {
        let source = validate_file(&job.input)?;
        tracing::info!(
            "Processing: {} ({:.2} MB)",
            source.path.display(),
            source.size_mb()
        );
        job.range.validate()?;
        tracing::info!("Initialized with model: {}", self.client.model_name());

        let mut report = JobReport::default();
        let mut audio_path = source.path.clone();
        let mut size_mb = source.size_mb();

        if job.needs_physical_trim() {
            if let TrimOutcome::Trimmed(trimmed) = trim_audio(&source.path, &job.range).await? {
                audio_path = trimmed.artifact.path().to_path_buf();
                size_mb = bytes_to_mb(std::fs::metadata(&audio_path)?.len());
                report.trimmed = Some(trimmed.report);
                staged.artifact = Some(trimmed.artifact);
            }
        }

        let content = self
            .preparer
            .prepare(&audio_path, size_mb, job.prefer_inline)
            .await?;
        if let Some(file) = content.remote_file() {
            report.uploaded = Some(file.name.clone());
            staged.uploaded = Some(file.clone());
        }

        let transcript = self
            .transcriber
            .transcribe(
                &content,
                job.system_instruction.as_deref(),
                job.use_timestamps,
                &job.range,
            )
            .await?;

        tracing::info!("Saving transcription to: {}", job.output.display());
        write_text(&job.output, &transcript).await?;
        report.transcript_chars = transcript.chars().count();
        tracing::info!("Transcription saved successfully!");
        tracing::info!("Output length: {} characters", report.transcript_chars);

        if let Some(summary_path) = &job.summary {
            let summary = self.summarizer.summarize(&transcript).await?;

            tracing::info!("Saving summary to: {}", summary_path.display());
            write_text(summary_path, &summary).await?;
            let summary_chars = summary.chars().count();
            tracing::info!("Summary saved successfully!");
            tracing::info!("Summary length: {summary_chars} characters");
            report.summary_chars = Some(summary_chars);
        }

        Ok(report)
    }

    async fn cleanup(&self, staged: StagedResources, keep_uploaded: bool) {
        if let Some(file) = staged.uploaded {
            if keep_uploaded {
                tracing::info!("Keeping uploaded file: {}", file.name);
            } else {
                match self.client.delete(&file).await {
                    Ok(()) => tracing::info!("Cleaned up uploaded file: {}", file.name),
                    Err(err) => {
                        let warning = ScribeError::CleanupWarning(format!(
                            "could not delete uploaded file {}: {err}",
                            file.name
                        ));
                        tracing::warn!("{warning}");
                    }
                }
            }
        }

        if let Some(artifact) = staged.artifact {
            match artifact.remove() {
                Ok(()) => tracing::info!("Cleaned up temporary trimmed file"),
                Err(err) => tracing::warn!("{err}"),
            }
        }
    }
}
