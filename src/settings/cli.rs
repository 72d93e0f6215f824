use std::path::PathBuf;

use clap::Parser;

use crate::audio::time_range::TimeRange;
use crate::core::orchestrator::TranscriptionJob;
use crate::processors::gemini::DEFAULT_MODEL;

const EXAMPLES: &str = "\
Examples:
  audio-scribe input.mp3 output.txt
  audio-scribe input.mp3 output.txt --summary summary.txt
  audio-scribe input.mp3 output.txt --start 01:30 --end 05:45
  audio-scribe input.mp3 output.txt --start 01:30 --end 05:45 --use-timestamps
  audio-scribe input.mp3 output.txt --inline  # For small files (<20MB)

Supported formats: MP3, WAV, AAC, FLAC, M4A, OGG, AIFF
Max audio length: 9.5 hours";

/// Convert audio files to text using the Google Gemini API
#[derive(Parser, Debug)]
#[command(name = "audio-scribe")]
#[command(version, after_help = EXAMPLES)]
pub struct Cli {
    /// Input audio file path
    pub input: PathBuf,

    /// Output text file path
    pub output: PathBuf,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model used for transcription and summaries
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Generate summary and save to specified file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Start time for audio trimming
    #[arg(long, value_name = "MM:SS")]
    pub start: Option<String>,

    /// End time for audio trimming
    #[arg(long, value_name = "MM:SS")]
    pub end: Option<String>,

    /// System instruction for the model
    #[arg(long)]
    pub system_instruction: Option<String>,

    /// Process audio inline (for files <20MB)
    #[arg(long)]
    pub inline: bool,

    /// Keep uploaded file in Gemini (don't delete after processing)
    #[arg(long)]
    pub keep_uploaded: bool,

    /// Use timestamp-based transcription (requires --start and --end)
    #[arg(long)]
    pub use_timestamps: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn job(&self) -> TranscriptionJob {
        TranscriptionJob {
            input: self.input.clone(),
            output: self.output.clone(),
            summary: self.summary.clone(),
            range: TimeRange::new(self.start.clone(), self.end.clone()),
            system_instruction: self.system_instruction.clone(),
            prefer_inline: self.inline,
            keep_uploaded: self.keep_uploaded,
            use_timestamps: self.use_timestamps,
        }
    }
}
