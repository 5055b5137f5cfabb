// Interval tokens: "<positive integer><unit>", unit T/H/D/M.
// "M" is a fixed 30-day month; there is no calendar-aware month here.

/// A validated aggregation interval, always a positive whole number of minutes.
///
/// Only `parse` and `from_minutes` produce one, so any `Interval` in the
/// program is known-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    minutes: i64,
}

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 60 * 24;
const MINUTES_PER_MONTH: i64 = 60 * 24 * 30;

impl Interval {
    /// Parses a compact interval token like "30T", "1H", "1D", "2M".
    /// Returns None for anything malformed, zero, or negative.
    pub fn parse(token: &str) -> Option<Interval> {
        if !Self::is_valid_format(token) {
            return None;
        }
        let (digits, unit) = token.split_at(token.len() - 1);
        let value: i64 = digits.parse().ok()?;
        if value <= 0 {
            return None;
        }
        let multiplier = match unit {
            "T" => 1,
            "H" => MINUTES_PER_HOUR,
            "D" => MINUTES_PER_DAY,
            "M" => MINUTES_PER_MONTH,
            _ => return None,
        };
        value.checked_mul(multiplier).map(|minutes| Interval { minutes })
    }

    /// A pre-computed duration in minutes. None unless positive.
    pub fn from_minutes(minutes: i64) -> Option<Interval> {
        (minutes > 0).then_some(Interval { minutes })
    }

    /// Pure format check: one or more ASCII digits followed by exactly one
    /// unit letter. Does not reject a zero value ("0H" is well-formed but
    /// fails `parse`).
    pub fn is_valid_format(token: &str) -> bool {
        let Some((digits, unit)) = token
            .as_bytes()
            .split_last()
            .map(|(last, rest)| (rest, *last))
        else {
            return false;
        };
        !digits.is_empty()
            && digits.iter().all(u8::is_ascii_digit)
            && matches!(unit, b'T' | b'H' | b'D' | b'M')
    }

    /// Human-readable examples for error messages and docs.
    pub fn supported_formats() -> &'static [&'static str] {
        &[
            "1T - 1 minute",
            "5T - 5 minutes",
            "15T - 15 minutes",
            "30T - 30 minutes",
            "1H - 1 hour",
            "2H - 2 hours",
            "6H - 6 hours",
            "12H - 12 hours",
            "1D - 1 day",
            "7D - 7 days",
            "1M - 1 month (30 days)",
        ]
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }
}
