use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 10000 years, the range a wire duration may cover
const MAX_SECONDS: i64 = 315_576_000_000;
const NANOS_PER_SECOND: i32 = 1_000_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration seconds {0} out of range")]
    SecondsOutOfRange(i64),
    #[error("duration nanos {0} out of range")]
    NanosOutOfRange(i32),
    #[error("duration has seconds {seconds} and nanos {nanos} with different signs")]
    SignMismatch { seconds: i64, nanos: i32 },
    #[error("duration of {seconds}s {nanos}ns overflows 64 bit nanoseconds")]
    Overflow { seconds: i64, nanos: i32 },
}

/// Signed duration as carried on the wire.
/// Not every value is a valid duration, see `as_nanos`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtoDuration {
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

impl ProtoDuration {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// total signed nanoseconds, if this is a valid duration
    pub fn as_nanos(&self) -> Result<i128, DurationError> {
        if !(-MAX_SECONDS..=MAX_SECONDS).contains(&self.seconds) {
            return Err(DurationError::SecondsOutOfRange(self.seconds));
        }
        if self.nanos <= -NANOS_PER_SECOND || self.nanos >= NANOS_PER_SECOND {
            return Err(DurationError::NanosOutOfRange(self.nanos));
        }
        if (self.seconds < 0 && self.nanos > 0) || (self.seconds > 0 && self.nanos < 0) {
            return Err(DurationError::SignMismatch {
                seconds: self.seconds,
                nanos: self.nanos,
            });
        }
        let total = self.seconds as i128 * NANOS_PER_SECOND as i128 + self.nanos as i128;
        if total < i64::MIN as i128 || total > i64::MAX as i128 {
            return Err(DurationError::Overflow {
                seconds: self.seconds,
                nanos: self.nanos,
            });
        }
        Ok(total)
    }
}

impl From<Duration> for ProtoDuration {
    fn from(duration: Duration) -> Self {
        Self {
            seconds: duration.as_secs().min(MAX_SECONDS as u64) as i64,
            nanos: duration.subsec_nanos() as i32,
        }
    }
}

impl fmt::Display for ProtoDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_nanos() {
            Ok(nanos) if nanos >= 0 => {
                let duration = Duration::new(self.seconds as u64, self.nanos as u32);
                write!(f, "{}", humantime::format_duration(duration))
            }
            Ok(_) => {
                let duration = Duration::new(self.seconds.unsigned_abs(), self.nanos.unsigned_abs());
                write!(f, "-{}", humantime::format_duration(duration))
            }
            Err(_) => write!(f, "{}s {}ns", self.seconds, self.nanos),
        }
    }
}
