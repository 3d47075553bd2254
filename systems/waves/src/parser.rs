//! Text format for wave definitions.
//!
//! ```text
//! // comment
//! 0.0 3e
//! 2.5 1e 2e
//! -
//! 0.0 5e
//! ```
//!
//! Every spawn line is a release time in seconds followed by groups of a
//! single digit count and a unit code. A line with at most one character
//! closes the current wave.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use rand::Rng;
use thiserror::Error;

use crate::{UnitCode, WaveBook, WaveInfo};

/// Errors raised while loading a wave definition file.
#[derive(Debug, Error)]
pub enum WaveFileError {
    /// The file could not be read.
    #[error("failed to read wave file {path}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The release time is not a finite, non-negative number of seconds.
    #[error("line {line}: invalid spawn time `{token}`")]
    InvalidTime {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A unit group is not a digit from 1 to 9 followed by a unit code.
    #[error("line {line}: invalid unit group `{token}`")]
    InvalidGroup {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
}

/// Parses wave definitions from `source`.
///
/// `lanes_for_wave` receives the 1-based wave number and returns the lane
/// count its spawns span. Any malformed line rejects the whole file.
pub fn parse_waves<F, R>(
    source: &str,
    lanes_for_wave: F,
    rng: &mut R,
) -> Result<WaveBook, WaveFileError>
where
    F: Fn(u32) -> usize,
    R: Rng + ?Sized,
{
    let mut waves = Vec::new();
    let mut current = WaveInfo::new(lanes_for_wave(1));

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();

        if trimmed.chars().count() <= 1 {
            waves.push(current);
            let next_wave = u32::try_from(waves.len() + 1).unwrap_or(u32::MAX);
            current = WaveInfo::new(lanes_for_wave(next_wave));
            continue;
        }
        if trimmed.starts_with("//") {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let time = tokens
            .next()
            .map(|token| parse_time(line, token))
            .transpose()?
            .unwrap_or_default();
        let mut codes = Vec::new();
        for token in tokens {
            let (count, code) = parse_group(line, token)?;
            codes.extend(std::iter::repeat(code).take(count));
        }
        current.add_spawn(time, codes, rng);
    }

    if !current.is_done() {
        waves.push(current);
    }

    Ok(WaveBook::new(waves))
}

/// Reads and parses the wave file at `path`.
pub fn load_waves<F, R>(
    path: &Path,
    lanes_for_wave: F,
    rng: &mut R,
) -> Result<WaveBook, WaveFileError>
where
    F: Fn(u32) -> usize,
    R: Rng + ?Sized,
{
    let source = fs::read_to_string(path).map_err(|source| WaveFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let book = parse_waves(&source, lanes_for_wave, rng)?;
    tracing::info!(path = %path.display(), waves = book.len(), "loaded wave file");
    Ok(book)
}

fn parse_time(line: usize, token: &str) -> Result<Duration, WaveFileError> {
    let invalid = || WaveFileError::InvalidTime {
        line,
        token: token.to_owned(),
    };
    let seconds: f64 = token.parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}

fn parse_group(line: usize, token: &str) -> Result<(usize, UnitCode), WaveFileError> {
    let invalid = || WaveFileError::InvalidGroup {
        line,
        token: token.to_owned(),
    };
    let mut chars = token.chars();
    let count = chars
        .next()
        .and_then(|digit| digit.to_digit(10))
        .filter(|count| *count >= 1)
        .ok_or_else(invalid)?;
    let code = chars.as_str();
    if code.is_empty() {
        return Err(invalid());
    }
    let count = usize::try_from(count).map_err(|_| invalid())?;
    Ok((count, UnitCode::new(code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_require_leading_digit_and_code() {
        assert_eq!(
            parse_group(1, "3e").map(|(count, code)| (count, code.to_string())).ok(),
            Some((3, "e".to_owned()))
        );
        assert!(parse_group(1, "0e").is_err());
        assert!(parse_group(1, "e3").is_err());
        assert!(parse_group(1, "4").is_err());
    }

    #[test]
    fn times_must_be_finite_and_non_negative() {
        assert_eq!(parse_time(1, "2.5").ok(), Some(Duration::from_millis(2_500)));
        assert!(parse_time(1, "-1").is_err());
        assert!(parse_time(1, "inf").is_err());
        assert!(parse_time(1, "NaN").is_err());
        assert!(parse_time(1, "soon").is_err());
    }
}
