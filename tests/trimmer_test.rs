mod helpers;

use audio_scribe_lib::audio::time_range::TimeRange;
use audio_scribe_lib::audio::trimmer::{trim_audio, trim_to, TrimOutcome};
use audio_scribe_lib::core::error::ScribeError;

use helpers::{write_ramp_wav, TEST_SAMPLE_RATE};

fn range(start: Option<&str>, end: Option<&str>) -> TimeRange {
    TimeRange::new(start.map(str::to_string), end.map(str::to_string))
}

#[test]
fn given_start_and_end_when_trimming_then_only_that_window_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    let destination = dir.path().join("clip.wav");
    write_ramp_wav(&source, 10);

    let report = trim_to(&source, &range(Some("00:02"), Some("00:05")), &destination).unwrap();

    assert_eq!(report.clip_ms, 3_000);
    assert_eq!(report.source_ms, 10_000);

    let mut reader = hound::WavReader::open(&destination).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, TEST_SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), 24_000);

    let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples[0], 16_000);
    assert_eq!(samples[1], 16_001);
}

#[test]
fn given_start_only_when_trimming_then_clip_runs_to_end_of_audio() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    let destination = dir.path().join("clip.wav");
    write_ramp_wav(&source, 10);

    let report = trim_to(&source, &range(Some("00:04"), None), &destination).unwrap();

    assert_eq!(report.clip_ms, 6_000);
    let reader = hound::WavReader::open(&destination).unwrap();
    assert_eq!(reader.duration(), 6 * TEST_SAMPLE_RATE);
}

#[test]
fn given_end_only_when_trimming_then_clip_starts_at_zero() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    let destination = dir.path().join("clip.wav");
    write_ramp_wav(&source, 10);

    let report = trim_to(&source, &range(None, Some("00:01")), &destination).unwrap();

    assert_eq!(report.clip_ms, 1_000);
    assert_eq!(report.source_ms, 10_000);
    let mut reader = hound::WavReader::open(&destination).unwrap();
    let first = reader.samples::<i16>().next().unwrap().unwrap();
    assert_eq!(first, 0);
}

#[test]
fn given_start_past_duration_when_trimming_then_start_exceeds_duration() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    write_ramp_wav(&source, 10);

    let result = trim_to(
        &source,
        &range(Some("00:20"), Some("00:30")),
        &dir.path().join("clip.wav"),
    );

    match result {
        Err(ScribeError::StartExceedsDuration { start, duration }) => {
            assert_eq!(start, "00:20");
            assert_eq!(duration, "00:10");
        }
        other => panic!("expected StartExceedsDuration, got {other:?}"),
    }
}

#[test]
fn given_start_beyond_any_frame_count_when_trimming_then_start_exceeds_duration() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    write_ramp_wav(&source, 2);

    let result = trim_to(
        &source,
        &range(Some("99999999999998:00"), Some("99999999999999:00")),
        &dir.path().join("clip.wav"),
    );

    assert!(matches!(
        result,
        Err(ScribeError::StartExceedsDuration { .. })
    ));
}

#[test]
fn given_open_ended_start_past_duration_when_trimming_then_range_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    write_ramp_wav(&source, 10);

    let result = trim_to(&source, &range(Some("00:20"), None), &dir.path().join("clip.wav"));

    assert!(matches!(result, Err(ScribeError::InvalidRange { .. })));
}

#[test]
fn given_undecodable_file_when_trimming_then_audio_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("noise.mp3");
    std::fs::write(&source, b"definitely not audio").unwrap();

    let result = trim_to(&source, &range(Some("00:01"), None), &dir.path().join("clip.wav"));

    assert!(matches!(result, Err(ScribeError::AudioDecode(_))));
}

#[tokio::test]
async fn given_empty_range_when_trimming_then_source_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    write_ramp_wav(&source, 1);

    let outcome = trim_audio(&source, &TimeRange::default()).await.unwrap();

    match outcome {
        TrimOutcome::Untouched(path) => assert_eq!(path, source),
        other => panic!("expected untouched source, got {other:?}"),
    }
}

#[tokio::test]
async fn given_range_when_trimming_asynchronously_then_artifact_lives_until_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("ramp.wav");
    write_ramp_wav(&source, 4);

    let outcome = trim_audio(&source, &range(Some("00:01"), Some("00:03")))
        .await
        .unwrap();

    let TrimOutcome::Trimmed(trimmed) = outcome else {
        panic!("expected trimmed audio");
    };
    let path = trimmed.artifact.path().to_path_buf();
    assert!(path.exists());
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("wav"));
    assert_eq!(trimmed.report.clip_ms, 2_000);

    drop(trimmed);
    assert!(!path.exists());
}
