use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use hound::{SampleFormat as WavSampleFormat, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::time_range::{ensure_ordered, format_time, TimeRange};
use crate::core::error::ScribeError;

static ARTIFACT_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A file in the temp directory owned by the current run. The file is removed
/// when the guard is dropped unless [`TempArtifact::remove`] already did so.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    removed: bool,
}

impl TempArtifact {
    pub fn reserve(extension: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "audio-scribe-trim-{}-{}-{}.{extension}",
            Utc::now().format("%Y%m%d-%H%M%S%.9f"),
            std::process::id(),
            ARTIFACT_COUNTER.fetch_add(1, Ordering::Relaxed),
        ));
        Self {
            path,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(mut self) -> Result<(), ScribeError> {
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ScribeError::CleanupWarning(format!(
                "could not delete temporary file {}: {err}",
                self.path.display()
            ))),
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if self.removed || !self.path.exists() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::info!("Cleaned up temporary trimmed file"),
            Err(err) => log::warn!("Could not delete temporary file: {err}"),
        }
    }
}

/// `source_ms` is the full length of the source, not just the decoded prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimReport {
    pub clip_ms: u64,
    pub source_ms: u64,
}

#[derive(Debug)]
pub struct TrimmedAudio {
    pub artifact: TempArtifact,
    pub report: TrimReport,
}

#[derive(Debug)]
pub enum TrimOutcome {
    Untouched(PathBuf),
    Trimmed(TrimmedAudio),
}

/// Sets the flag when dropped so a blocking trim stops once its caller is gone.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Slices `source` to `range` into a new temporary WAV file. An empty range
/// leaves the source untouched and creates nothing.
pub async fn trim_audio(source: &Path, range: &TimeRange) -> Result<TrimOutcome, ScribeError> {
    if range.is_empty() {
        return Ok(TrimOutcome::Untouched(source.to_path_buf()));
    }

    tracing::info!("Trimming audio file...");
    let cancelled = Arc::new(AtomicBool::new(false));
    let _cancel_on_drop = CancelOnDrop(cancelled.clone());
    let source = source.to_path_buf();
    let range = range.clone();

    // The guard travels with the blocking task so the file is removed even if
    // this future is dropped before decoding finishes.
    let (artifact, report) = tokio::task::spawn_blocking(move || {
        let artifact = TempArtifact::reserve("wav");
        let report = trim_until_cancelled(&source, &range, artifact.path(), &cancelled)?;
        Ok::<_, ScribeError>((artifact, report))
    })
    .await
    .map_err(|err| ScribeError::AudioDecode(format!("trim task failed: {err}")))??;

    tracing::info!("Audio trimmed: {:.1} seconds", report.clip_ms as f64 / 1000.0);
    Ok(TrimOutcome::Trimmed(TrimmedAudio { artifact, report }))
}

/// Decodes `source` and writes the frames inside `range` as 16-bit PCM WAV,
/// keeping the source sample rate and channel layout.
pub fn trim_to(
    source: &Path,
    range: &TimeRange,
    destination: &Path,
) -> Result<TrimReport, ScribeError> {
    trim_until_cancelled(source, range, destination, &AtomicBool::new(false))
}

fn trim_until_cancelled(
    source: &Path,
    range: &TimeRange,
    destination: &Path,
    cancelled: &AtomicBool,
) -> Result<TrimReport, ScribeError> {
    let start_ms = range.start_ms()?;
    let requested_end_ms = range.end_ms()?;
    if let Some(end_ms) = requested_end_ms {
        ensure_ordered(start_ms, end_ms)?;
    }

    let file = File::open(source)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = source.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| ScribeError::AudioDecode(format!("probe: {err}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ScribeError::AudioDecode("no audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| ScribeError::AudioDecode("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|err| ScribeError::AudioDecode(format!("codec: {err}")))?;

    let start_frame = ms_to_frames(start_ms, sample_rate);
    let end_frame = requested_end_ms.map(|ms| ms_to_frames(ms, sample_rate));
    // Without a header frame count the source has to be decoded to the end to
    // learn its duration.
    let total_frames = codec_params.n_frames;
    let stop_frame = end_frame.filter(|_| total_frames.is_some());

    let mut writer: Option<WavWriter<BufWriter<File>>> = None;
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);
    let mut position = 0u64;
    let mut written = 0u64;

    loop {
        if cancelled.load(Ordering::Relaxed) {
            return Err(ScribeError::UserInterrupted);
        }
        if stop_frame.is_some_and(|end| position >= end) {
            break;
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(ScribeError::AudioDecode(format!("packet: {err}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(err)) => {
                log::warn!("skipping corrupt audio frame: {err}");
                continue;
            }
            Err(err) => return Err(ScribeError::AudioDecode(format!("decode: {err}"))),
        };

        let spec = *decoded.spec();
        let frames = decoded.frames() as u64;
        if frames == 0 {
            continue;
        }
        channels = spec.channels.count();

        let chunk_start = position;
        position += frames;

        let from = start_frame.max(chunk_start);
        let to = end_frame.map_or(position, |end| end.min(position));
        if from >= to {
            continue;
        }

        let mut buffer = SampleBuffer::<i16>::new(frames, spec);
        buffer.copy_interleaved_ref(decoded);

        let active = match &mut writer {
            Some(active) => active,
            None => writer.insert(create_writer(destination, channels, sample_rate)?),
        };

        let lo = ((from - chunk_start) as usize) * channels;
        let hi = ((to - chunk_start) as usize) * channels;
        for sample in &buffer.samples()[lo..hi] {
            active.write_sample(*sample).map_err(encode_error)?;
        }
        written += to - from;
    }

    let decoded_ms = frames_to_ms(position, sample_rate);
    let end_ms = requested_end_ms.unwrap_or(decoded_ms);
    ensure_ordered(start_ms, end_ms)?;
    if start_ms > decoded_ms {
        return Err(ScribeError::StartExceedsDuration {
            start: format_time(start_ms),
            duration: format_time(decoded_ms),
        });
    }
    let source_ms = total_frames.map_or(decoded_ms, |frames| frames_to_ms(frames, sample_rate));

    let writer = match writer {
        Some(writer) => writer,
        None => create_writer(destination, channels, sample_rate)?,
    };
    writer.finalize().map_err(encode_error)?;

    Ok(TrimReport {
        clip_ms: frames_to_ms(written, sample_rate),
        source_ms,
    })
}

fn create_writer(
    destination: &Path,
    channels: usize,
    sample_rate: u32,
) -> Result<WavWriter<BufWriter<File>>, ScribeError> {
    let spec = WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: WavSampleFormat::Int,
    };
    WavWriter::create(destination, spec).map_err(encode_error)
}

fn encode_error(err: hound::Error) -> ScribeError {
    ScribeError::AudioEncode(err.to_string())
}

/// Saturates at `u64::MAX`, which lands past any real stream and is then
/// reported as a start beyond the audio duration.
fn ms_to_frames(ms: u64, sample_rate: u32) -> u64 {
    let frames = ms as u128 * sample_rate as u128 / 1000;
    u64::try_from(frames).unwrap_or(u64::MAX)
}

fn frames_to_ms(frames: u64, sample_rate: u32) -> u64 {
    let millis = frames as u128 * 1000 / sample_rate.max(1) as u128;
    u64::try_from(millis).unwrap_or(u64::MAX)
}
