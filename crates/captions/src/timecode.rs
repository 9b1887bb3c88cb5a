//! ASS timecodes: `H:MM:SS.cc`.

use crate::error::CaptionError;

/// Tolerance absorbing binary float error before truncation
/// (e.g. `4.35 * 100.0 == 434.99999999999994`).
const CS_EPSILON: f64 = 1e-6;

/// Whole centiseconds in `secs`, truncated. Negative and non-finite
/// inputs clamp to zero.
pub fn to_centiseconds(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 100.0 + CS_EPSILON).floor() as u64
}

/// Format seconds as an ASS timestamp, truncating sub-centisecond remainders.
pub fn format_timecode(secs: f64) -> String {
    let total_cs = to_centiseconds(secs);
    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let seconds = (total_cs % 6_000) / 100;
    let centis = total_cs % 100;
    format!("{hours}:{minutes:02}:{seconds:02}.{centis:02}")
}

/// Parse an ASS timestamp back into seconds.
pub fn parse_timecode(value: &str) -> Result<f64, CaptionError> {
    let invalid = || CaptionError::InvalidTimecode(value.to_string());

    let mut parts = value.trim().split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let (s, cs) = s.split_once('.').ok_or_else(invalid)?;
    if m.len() != 2 || s.len() != 2 || cs.len() != 2 {
        return Err(invalid());
    }

    let hours: u64 = h.parse().map_err(|_| invalid())?;
    let minutes: u64 = m.parse().map_err(|_| invalid())?;
    let seconds: u64 = s.parse().map_err(|_| invalid())?;
    let centis: u64 = cs.parse().map_err(|_| invalid())?;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    let total_cs = ((hours * 60 + minutes) * 60 + seconds) * 100 + centis;
    Ok(total_cs as f64 / 100.0)
}
