use crate::error::{EnhanceError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

const MAX_FRACTION_DIGITS: u8 = 20;
const DEFAULT_MAX_FRACTION_DIGITS: u8 = 3;

/// The `Intl.NumberFormat` options the pages actually pass.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberFormat {
    pub minimum_fraction_digits: u8,
    /// Unset means `max(minimum, 3)`.
    pub maximum_fraction_digits: Option<u8>,
    pub use_grouping: bool,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            minimum_fraction_digits: 0,
            maximum_fraction_digits: None,
            use_grouping: true,
        }
    }
}

impl NumberFormat {
    /// Effective `(min, max)` fraction digits.
    pub fn fraction_bounds(&self) -> Result<(u8, u8)> {
        let min = self.minimum_fraction_digits;
        let max = self
            .maximum_fraction_digits
            .unwrap_or_else(|| min.max(DEFAULT_MAX_FRACTION_DIGITS));
        if min > MAX_FRACTION_DIGITS || max > MAX_FRACTION_DIGITS {
            return Err(EnhanceError::NumberFormat(format!(
                "fraction digits must be at most {MAX_FRACTION_DIGITS}"
            )));
        }
        if max < min {
            return Err(EnhanceError::NumberFormat(format!(
                "maximumFractionDigits {max} is below minimumFractionDigits {min}"
            )));
        }
        Ok((min, max))
    }
}

/// en-US rendering: `,` thousands separator, `.` decimal point, ties rounded
/// away from zero.
pub fn format_number(value: f64, options: &NumberFormat) -> Result<String> {
    let (min, max) = options.fraction_bounds()?;
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    if value.is_infinite() {
        return Ok(if value > 0.0 { "∞" } else { "-∞" }.to_string());
    }

    let rounded = round_half_expand(value.abs(), max);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < usize::from(min) {
        frac.push('0');
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let mut out = String::new();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    if options.use_grouping {
        out.push_str(&group_thousands(int_part));
    } else {
        out.push_str(int_part);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    Ok(out)
}

/// `abs` with `digits` fraction places. Float formatting already rounds the
/// exact binary value correctly, except that an exact tie goes to even.
fn round_half_expand(abs: f64, digits: u8) -> String {
    // An exact tie at `digits` places means abs * 2 * 10^digits is odd, which
    // for a binary float is the same as abs * 2^(digits + 1) being odd.
    let halves = abs * 2f64.powi(i32::from(digits) + 1);
    let is_tie = halves.fract() == 0.0 && halves % 2.0 == 1.0;
    if !is_tie {
        return format!("{:.*}", usize::from(digits), abs);
    }
    // The expansion ends in a single `5` right after the kept digits.
    let mut exact = format!("{:.*}", usize::from(digits) + 1, abs);
    exact.pop();
    increment_last_digit(&exact)
}

fn increment_last_digit(number: &str) -> String {
    let mut chars: Vec<char> = number.chars().collect();
    for slot in chars.iter_mut().rev() {
        match *slot {
            '.' => {}
            '9' => *slot = '0',
            digit => {
                *slot = char::from(digit as u8 + 1);
                return chars.into_iter().collect();
            }
        }
    }
    std::iter::once('1').chain(chars).collect()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A parsed timestamp, before it is placed in the viewer's zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateStamp {
    /// Date and time with no zone: already local wall-clock time.
    Floating(NaiveDateTime),
    /// A fixed point in time: offset stamps, `Z` stamps and bare dates.
    Instant(DateTime<Utc>),
}

impl DateStamp {
    /// Wall-clock time in the zone `offset_at` reports for the instant.
    pub fn wall_clock(
        &self,
        offset_at: impl FnOnce(&DateTime<Utc>) -> FixedOffset,
    ) -> NaiveDateTime {
        match self {
            Self::Floating(local) => *local,
            Self::Instant(at) => at.with_timezone(&offset_at(at)).naive_local(),
        }
    }
}

const FLOATING_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Reads a timestamp the way `new Date(...)` does: offset and `Z` stamps are
/// instants, date-times without a zone are local, a bare date is UTC midnight.
pub fn parse_date(raw: &str) -> Result<DateStamp> {
    let trimmed = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(DateStamp::Instant(stamp.with_timezone(&Utc)));
    }
    for layout in FLOATING_LAYOUTS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Ok(DateStamp::Floating(stamp));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| DateStamp::Instant(midnight.and_utc()))
        .ok_or_else(|| EnhanceError::InvalidDate {
            raw: raw.to_string(),
        })
}

/// `Oct 19, 2026, 08:03 PM`, the en-US medium date with 2-digit time.
pub fn format_date(stamp: &NaiveDateTime) -> String {
    stamp.format("%b %-d, %Y, %I:%M %p").to_string()
}
