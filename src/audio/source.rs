use std::path::{Path, PathBuf};

use crate::core::error::ScribeError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const FALLBACK_MIME_TYPE: &str = "audio/mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Aac,
    Flac,
    M4a,
    Ogg,
    Aiff,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 7] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Aac,
        AudioFormat::Flac,
        AudioFormat::M4a,
        AudioFormat::Ogg,
        AudioFormat::Aiff,
    ];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            "aac" => Some(Self::Aac),
            "flac" => Some(Self::Flac),
            "m4a" => Some(Self::M4a),
            "ogg" => Some(Self::Ogg),
            "aiff" => Some(Self::Aiff),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
            Self::Aiff => "aiff",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mp3",
            Self::Wav => "audio/wav",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::M4a => "audio/mp4",
            Self::Ogg => "audio/ogg",
            Self::Aiff => "audio/aiff",
        }
    }

    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|format| format!(".{}", format.extension()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// MIME type for a path. Unknown extensions fall back to a generic audio type;
/// callers are expected to have validated the extension already.
pub fn mime_type_for(path: &Path) -> &'static str {
    AudioFormat::from_path(path)
        .map(AudioFormat::mime_type)
        .unwrap_or(FALLBACK_MIME_TYPE)
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// A validated input audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSource {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub format: AudioFormat,
}

impl AudioSource {
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }
}

pub fn validate_file(path: &Path) -> Result<AudioSource, ScribeError> {
    if !path.exists() {
        return Err(ScribeError::NotFound(path.to_path_buf()));
    }

    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(ScribeError::NotAFile(path.to_path_buf()));
    }

    let format = AudioFormat::from_path(path).ok_or_else(|| ScribeError::UnsupportedFormat {
        extension: path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default(),
        supported: AudioFormat::supported_list(),
    })?;

    Ok(AudioSource {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        format,
    })
}
