use thiserror::Error;

/// Errors produced when parsing textual timestamps
#[derive(Debug, Error)]
pub enum TimecodeError {
    #[error("invalid timestamp format: '{0}'")]
    InvalidFormat(String),
}

/// Format milliseconds as an SRT timecode (HH:MM:SS,mmm)
pub fn millis_to_timecode(ms: u64) -> String {
    let (seconds, milliseconds) = (ms / 1000, ms % 1000);
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, milliseconds)
}

/// Parse a flexible timestamp into seconds.
///
/// Accepts `H:M:S`, `M:S`, or a bare seconds value; the colon count selects
/// the form. The seconds component may carry a fractional part, written with
/// either a dot or the SRT comma (`SS,mmm`).
pub fn timecode_to_seconds(timestamp: &str) -> Result<f64, TimecodeError> {
    let invalid = || TimecodeError::InvalidFormat(timestamp.to_string());
    let parse_seconds = |s: &str| s.replace(',', ".").parse::<f64>();
    let parts: Vec<&str> = timestamp.trim().split(':').collect();

    match parts.as_slice() {
        [hours, minutes, seconds] => {
            let h: u64 = hours.parse().map_err(|_| invalid())?;
            let m: u64 = minutes.parse().map_err(|_| invalid())?;
            let s = parse_seconds(seconds).map_err(|_| invalid())?;
            Ok((h * 3600 + m * 60) as f64 + s)
        }
        [minutes, seconds] => {
            let m: u64 = minutes.parse().map_err(|_| invalid())?;
            let s = parse_seconds(seconds).map_err(|_| invalid())?;
            Ok((m * 60) as f64 + s)
        }
        [seconds] => parse_seconds(seconds).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Pad a `MM:SS` marker to the canonical `HH:MM:SS` form.
///
/// Markers that already carry an hour component pass through unchanged.
pub fn normalize_timestamp(timestamp: &str) -> String {
    if timestamp.matches(':').count() == 1 {
        format!("00:{}", timestamp)
    } else {
        timestamp.to_string()
    }
}
