use std::fmt;
use std::sync::OnceLock;

use crate::error::{Result, TransitError};

const NANOS_PER_MILLI: u32 = 1_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// A UTC point in time with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instant {
    seconds: i64,
    nanos: u32,
}

impl Instant {
    /// `nanos` above one second carry into `seconds`.
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Instant {
            seconds: seconds + i64::from(nanos / 1_000_000_000),
            nanos: nanos % 1_000_000_000,
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Instant {
            seconds: millis.div_euclid(1000),
            nanos: millis.rem_euclid(1000) as u32 * NANOS_PER_MILLI,
        }
    }

    /// Milliseconds since the epoch, sub-millisecond part truncated.
    pub fn as_millis(&self) -> i64 {
        self.seconds * 1000 + i64::from(self.nanos / NANOS_PER_MILLI)
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Parses an ISO-8601 timestamp and normalizes it to UTC.
    ///
    /// Accepts a bare date, a `T`, `t` or space separator, optional seconds
    /// and fraction, and a `Z` or `±HH[:MM]` offset. No offset means UTC.
    pub fn parse_iso8601(s: &str) -> Result<Self> {
        let err = || TransitError::format("instant", s);
        let caps = iso_regex().captures(s.trim()).ok_or_else(err)?;
        // Absent optional components are zero.
        let num = |i: usize| -> Result<i64> {
            caps.get(i)
                .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| err()))
        };

        let (year, month, day) = (num(1)?, num(2)?, num(3)?);
        let (hour, minute, second) = (num(4)?, num(5)?, num(6)?);
        if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
            return Err(err());
        }
        if hour > 23 || minute > 59 || second > 60 {
            return Err(err());
        }

        let nanos = match caps.get(7) {
            Some(frac) => {
                let digits: String = frac.as_str().chars().take(9).collect();
                let scale = 10u32.pow(9 - digits.len() as u32);
                digits.parse::<u32>().map_err(|_| err())? * scale
            }
            None => 0,
        };

        let offset = match caps.get(8).map(|m| m.as_str()) {
            None | Some("Z") | Some("z") => 0,
            Some(o) => {
                let sign = if o.starts_with('-') { -1 } else { 1 };
                let digits: String = o[1..].chars().filter(|c| *c != ':').collect();
                let hours: i64 = digits
                    .get(..2)
                    .ok_or_else(err)?
                    .parse()
                    .map_err(|_| err())?;
                let minutes: i64 = match digits.get(2..) {
                    Some(m) if !m.is_empty() => m.parse().map_err(|_| err())?,
                    _ => 0,
                };
                if hours > 23 || minutes > 59 {
                    return Err(err());
                }
                sign * (hours * 3600 + minutes * 60)
            }
        };

        let days = days_from_civil(year, month, day);
        let seconds = days * SECONDS_PER_DAY + hour * 3600 + minute * 60 + second - offset;
        Ok(Instant { seconds, nanos })
    }

    /// Formats as `YYYY-MM-DDTHH:MM:SS.fffZ`, widening the fraction to nine
    /// digits when the instant is not a whole millisecond.
    pub fn to_iso8601(&self) -> String {
        let days = self.seconds.div_euclid(SECONDS_PER_DAY);
        let secs_of_day = self.seconds.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        let (hour, minute, second) = (secs_of_day / 3600, secs_of_day / 60 % 60, secs_of_day % 60);
        let fraction = if self.nanos % NANOS_PER_MILLI == 0 {
            format!("{:03}", self.nanos / NANOS_PER_MILLI)
        } else {
            format!("{:09}", self.nanos)
        };
        format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{fraction}Z")
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn iso_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(
            r"^([0-9]{4})-([0-9]{2})-([0-9]{2})(?:[Tt ]([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:[.,]([0-9]+))?)?)?\s*(Z|z|[+-][0-9]{2}(?::?[0-9]{2})?)?$",
        )
        .unwrap()
    })
}

fn is_leap_year(y: i64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

fn days_in_month(y: i64, m: i64) -> i64 {
    match m {
        2 if is_leap_year(y) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date (Hinnant).
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let yy = if m <= 2 { y - 1 } else { y };
    let mm = if m <= 2 { m + 9 } else { m - 3 };
    let era = yy.div_euclid(400);
    let yoe = yy - era * 400;
    let doy = (153 * mm + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m as u32, d as u32)
}
