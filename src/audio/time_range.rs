use crate::core::error::ScribeError;

/// Parses an `MM:SS` string into milliseconds. Seconds above 59 are accepted
/// and carried into minutes.
pub fn parse_time(value: &str) -> Result<u64, ScribeError> {
    let invalid = || ScribeError::InvalidTimeFormat(value.to_string());

    let (minutes, seconds) = value.split_once(':').ok_or_else(invalid)?;
    if seconds.contains(':') {
        return Err(invalid());
    }

    let minutes = parse_component(minutes).ok_or_else(invalid)?;
    let seconds = parse_component(seconds).ok_or_else(invalid)?;

    minutes
        .checked_mul(60)
        .and_then(|total| total.checked_add(seconds))
        .and_then(|total| total.checked_mul(1000))
        .ok_or_else(invalid)
}

fn parse_component(part: &str) -> Option<u64> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Formats milliseconds as zero-padded `MM:SS`, dropping sub-second precision.
pub fn format_time(millis: u64) -> String {
    let total_seconds = millis / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Optional start and end bounds as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeRange {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn start_ms(&self) -> Result<u64, ScribeError> {
        self.start.as_deref().map(parse_time).unwrap_or(Ok(0))
    }

    pub fn end_ms(&self) -> Result<Option<u64>, ScribeError> {
        self.end.as_deref().map(parse_time).transpose()
    }

    /// Checks both bounds parse and, when both are present, that start < end.
    pub fn validate(&self) -> Result<(), ScribeError> {
        let start = self.start_ms()?;
        if let Some(end) = self.end_ms()? {
            ensure_ordered(start, end)?;
        }
        Ok(())
    }
}

pub(crate) fn ensure_ordered(start_ms: u64, end_ms: u64) -> Result<(), ScribeError> {
    if start_ms >= end_ms {
        return Err(ScribeError::InvalidRange {
            start: format_time(start_ms),
            end: format_time(end_ms),
        });
    }
    Ok(())
}
