//! Device-reported relative times ("3d04h", "00:01:12", "1y13w", "never").
//!
//! Four shapes are recognized, tried in this order:
//!
//! | Shape      | Example    |
//! |------------|------------|
//! | `HH:MM:SS` | `00:01:12` |
//! | `Dd` `Hh`  | `3d04h`    |
//! | `Ww` `Dd`  | `7w1d`     |
//! | `Yy` `Ww`  | `1y13w`    |
//!
//! A year is 365 days and a week is 7 days. The literal `never` is a value
//! of its own, not an error.

use crate::error::{FleetError, Result};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Marker rendered in place of a time string that matched no shape
pub const UNRECOGNIZED_TIME: &str = "Unrecognized time format";

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const YEAR: u64 = 365 * DAY;

/// Display units, largest first
const UNITS: [(u64, char); 6] = [
    (YEAR, 'y'),
    (WEEK, 'w'),
    (DAY, 'd'),
    (HOUR, 'h'),
    (MINUTE, 'm'),
    (1, 's'),
];

/// A parsed relative time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElapsedTime {
    /// The device reported `never`
    Never,
    Elapsed(Duration),
}

impl ElapsedTime {
    /// The duration, if there is one
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::Elapsed(duration) => Some(duration),
        }
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("never"),
            Self::Elapsed(duration) => {
                let mut remaining = duration.as_secs();
                if remaining == 0 {
                    return f.write_str("0s");
                }
                for (size, suffix) in UNITS {
                    let count = remaining / size;
                    if count > 0 {
                        write!(f, "{}{}", count, suffix)?;
                        remaining %= size;
                    }
                }
                Ok(())
            }
        }
    }
}

impl Serialize for ElapsedTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TimePatterns {
    clock: Regex,
    days_hours: Regex,
    weeks_days: Regex,
    years_weeks: Regex,
}

impl TimePatterns {
    fn instance() -> &'static Self {
        static PATTERNS: OnceLock<TimePatterns> = OnceLock::new();
        PATTERNS.get_or_init(Self::compile)
    }

    #[allow(clippy::expect_used)]
    fn compile() -> Self {
        Self {
            clock: Regex::new(r"^(\d+):(\d{2}):(\d{2})$").expect("Invalid clock pattern"),
            days_hours: Regex::new(r"^(\d+)d(\d+)h$").expect("Invalid day/hour pattern"),
            weeks_days: Regex::new(r"^(\d+)w(\d+)d$").expect("Invalid week/day pattern"),
            years_weeks: Regex::new(r"^(\d+)y(\d+)w$").expect("Invalid year/week pattern"),
        }
    }
}

/// Converts between device time strings and [`ElapsedTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeNormalizer;

impl TimeNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parses a device time string.
    ///
    /// Surrounding whitespace and letter case are ignored.
    ///
    /// # Errors
    /// Returns `FleetError::TimeFormat` if no shape matches, if minutes or
    /// seconds in the clock shape exceed 59, or if the value overflows.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fleetscope_core::timefmt::{ElapsedTime, TimeNormalizer};
    /// use std::time::Duration;
    ///
    /// let normalizer = TimeNormalizer::new();
    /// assert_eq!(
    ///     normalizer.parse("00:01:12").unwrap(),
    ///     ElapsedTime::Elapsed(Duration::from_secs(72))
    /// );
    /// assert_eq!(normalizer.parse("never").unwrap(), ElapsedTime::Never);
    /// ```
    pub fn parse(&self, input: &str) -> Result<ElapsedTime> {
        let text = input.trim().to_ascii_lowercase();
        if text == "never" {
            return Ok(ElapsedTime::Never);
        }

        let patterns = TimePatterns::instance();
        let shapes: [(&Regex, [u64; 3]); 4] = [
            (&patterns.clock, [HOUR, MINUTE, 1]),
            (&patterns.days_hours, [DAY, HOUR, 0]),
            (&patterns.weeks_days, [WEEK, DAY, 0]),
            (&patterns.years_weeks, [YEAR, WEEK, 0]),
        ];

        for (index, (pattern, units)) in shapes.iter().enumerate() {
            let Some(captures) = pattern.captures(&text) else {
                continue;
            };
            let values = captures
                .iter()
                .skip(1)
                .flatten()
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .map_err(|_| time_format_error(input))
                })
                .collect::<Result<Vec<u64>>>()?;

            if index == 0 && values.iter().skip(1).any(|v| *v >= 60) {
                return Err(time_format_error(input));
            }
            let seconds = total_seconds(&values, units).ok_or_else(|| time_format_error(input))?;
            return Ok(ElapsedTime::Elapsed(Duration::from_secs(seconds)));
        }

        Err(time_format_error(input))
    }

    /// Renders a parsed time with every non-zero unit, largest first
    pub fn to_display_string(&self, time: ElapsedTime) -> String {
        time.to_string()
    }

    /// Parses and re-renders `input`, or returns [`UNRECOGNIZED_TIME`]
    pub fn normalize(&self, input: &str) -> String {
        match self.parse(input) {
            Ok(time) => time.to_string(),
            Err(_) => UNRECOGNIZED_TIME.to_string(),
        }
    }
}

fn total_seconds(values: &[u64], units: &[u64; 3]) -> Option<u64> {
    values
        .iter()
        .zip(units.iter())
        .try_fold(0_u64, |acc, (value, unit)| {
            value.checked_mul(*unit).and_then(|v| acc.checked_add(v))
        })
}

fn time_format_error(input: &str) -> FleetError {
    FleetError::TimeFormat {
        input: input.to_string(),
    }
}
