#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hound::{WavSpec, WavWriter};

use audio_scribe_lib::core::content::Sleeper;
use audio_scribe_lib::core::error::ScribeError;
use audio_scribe_lib::core::model::{
    FileState, GenerateRequest, ModelClient, PreparedContent, RemoteFile,
};

pub const TEST_SAMPLE_RATE: u32 = 8_000;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioSeen {
    Inline { mime_type: String, len: usize },
    Remote { name: String, uri: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CountTokens,
    Generate {
        prompt: String,
        system_instruction: Option<String>,
        audio: Option<AudioSeen>,
        temperature: f32,
        max_output_tokens: u32,
    },
    Upload {
        path: PathBuf,
        mime_type: String,
        existed: bool,
    },
    FileStatus(String),
    Delete(String),
}

/// Recording stand-in for the remote model.
pub struct MockModelClient {
    calls: Mutex<Vec<Call>>,
    generate_responses: Mutex<VecDeque<Result<String, String>>>,
    upload_state: FileState,
    status_sequence: Mutex<VecDeque<FileState>>,
    fail_count_tokens: bool,
    fail_delete: bool,
    hang_generate: bool,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            generate_responses: Mutex::new(VecDeque::new()),
            upload_state: FileState::Active,
            status_sequence: Mutex::new(VecDeque::new()),
            fail_count_tokens: false,
            fail_delete: false,
            hang_generate: false,
        }
    }

    pub fn with_responses(self, responses: &[&str]) -> Self {
        *self.generate_responses.lock().unwrap() =
            responses.iter().map(|text| Ok(text.to_string())).collect();
        self
    }

    pub fn with_generate_error(self, message: &str) -> Self {
        self.generate_responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// State returned by `upload`, then the states returned by successive polls.
    pub fn with_upload_states(mut self, initial: FileState, polls: &[FileState]) -> Self {
        self.upload_state = initial;
        *self.status_sequence.lock().unwrap() = polls.iter().copied().collect();
        self
    }

    pub fn failing_count_tokens(mut self) -> Self {
        self.fail_count_tokens = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn hanging_generate(mut self) -> Self {
        self.hang_generate = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Generate { .. }))
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Upload { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn remote_file(&self, state: FileState) -> RemoteFile {
        RemoteFile {
            name: "files/mock-upload".to_string(),
            uri: "https://mock.test/v1beta/files/mock-upload".to_string(),
            mime_type: "audio/wav".to_string(),
            state,
        }
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, ScribeError> {
        let audio = request.audio().map(|content| match content {
            PreparedContent::Inline { data, mime_type } => AudioSeen::Inline {
                mime_type: mime_type.clone(),
                len: data.len(),
            },
            PreparedContent::Remote(file) => AudioSeen::Remote {
                name: file.name.clone(),
                uri: file.uri.clone(),
            },
        });
        self.record(Call::Generate {
            prompt: request.prompt().unwrap_or_default().to_string(),
            system_instruction: request.system_instruction.map(str::to_string),
            audio,
            temperature: request.config.temperature,
            max_output_tokens: request.config.max_output_tokens,
        });

        if self.hang_generate {
            std::future::pending::<()>().await;
        }

        match self.generate_responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ScribeError::Request(message)),
            None => Ok("mock transcript".to_string()),
        }
    }

    async fn count_tokens(&self, _request: &GenerateRequest<'_>) -> Result<u64, ScribeError> {
        self.record(Call::CountTokens);
        if self.fail_count_tokens {
            return Err(ScribeError::Request("count tokens unavailable".to_string()));
        }
        Ok(1234)
    }

    async fn upload(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, ScribeError> {
        self.record(Call::Upload {
            path: path.to_path_buf(),
            mime_type: mime_type.to_string(),
            existed: path.exists(),
        });
        Ok(self.remote_file(self.upload_state))
    }

    async fn file_status(&self, name: &str) -> Result<RemoteFile, ScribeError> {
        self.record(Call::FileStatus(name.to_string()));
        let state = self
            .status_sequence
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FileState::Active);
        Ok(self.remote_file(state))
    }

    async fn delete(&self, file: &RemoteFile) -> Result<(), ScribeError> {
        self.record(Call::Delete(file.name.clone()));
        if self.fail_delete {
            return Err(ScribeError::Request("permission denied".to_string()));
        }
        Ok(())
    }
}

/// Sleeper that returns immediately and counts how often it was asked to wait.
#[derive(Default)]
pub struct CountingSleeper {
    pub sleeps: AtomicUsize,
}

impl CountingSleeper {
    pub fn count(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sleeper for CountingSleeper {
    async fn sleep(&self, duration: Duration) {
        assert_eq!(duration, Duration::from_secs(2));
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mono 16-bit WAV whose sample at frame `i` is `i % 32_000`.
pub fn write_ramp_wav(path: &Path, seconds: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for frame in 0..(TEST_SAMPLE_RATE * seconds) {
        writer.write_sample((frame % 32_000) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// File of the given size filled with zeros; contents are never decoded.
pub fn write_sized_file(path: &Path, bytes: usize) {
    std::fs::write(path, vec![0u8; bytes]).unwrap();
}

pub fn trim_artifacts_for_this_process() -> Vec<PathBuf> {
    let marker = format!("-{}-", std::process::id());
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| {
                            name.starts_with("audio-scribe-trim-") && name.contains(&marker)
                        })
                })
                .collect()
        })
        .unwrap_or_default()
}
