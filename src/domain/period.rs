//! Fiscal quarter labels and their numeric time axis.
//!
//! A period is written `"YYYY Qn"` and encoded on a continuous time axis as
//! `year + (quarter - 1) / 4`, so consecutive quarters are `0.25` apart.
//!
//! Going back from a time coordinate to a label uses round-half-up on the
//! quarter index (`floor(t * 4 + 0.5)`). Values produced by adding multiples
//! of `0.25` can drift by an ulp, and plain truncation would then land on the
//! previous quarter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// A fiscal quarter, e.g. `2024 Q3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub quarter: u8,
}

impl Period {
    /// Build a period, rejecting quarters outside `1..=4`.
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    /// Parse a `"YYYY Qn"` label.
    ///
    /// The match is anchored at the start of the (trimmed) input: four digits,
    /// optional whitespace, `Q`, one digit. Anything after the quarter digit is
    /// ignored.
    pub fn parse(input: &str) -> Result<Self, ForecastError> {
        parse_prefix(input.trim()).ok_or_else(|| ForecastError::Parse {
            input: input.to_string(),
            line: None,
        })
    }

    /// Numeric time coordinate: `year + (quarter - 1) / 4`.
    pub fn time(self) -> f64 {
        self.year as f64 + (self.quarter as f64 - 1.0) / 4.0
    }

    /// Absolute quarter index (`year * 4 + quarter - 1`).
    pub fn index(self) -> i64 {
        self.year as i64 * 4 + (self.quarter as i64 - 1)
    }

    pub fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(4) as i32,
            quarter: (index.rem_euclid(4) + 1) as u8,
        }
    }

    /// Recover the period for a time coordinate (round-half-up on the quarter index).
    pub fn from_time(time: f64) -> Self {
        Self::from_index((time * 4.0 + 0.5).floor() as i64)
    }

    /// The period `steps` quarters later.
    pub fn add_quarters(self, steps: i64) -> Self {
        Self::from_index(self.index() + steps)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}

impl FromStr for Period {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

fn parse_prefix(s: &str) -> Option<Period> {
    let bytes = s.as_bytes();
    if bytes.len() < 6 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let year: i32 = s[..4].parse().ok()?;

    let rest = s[4..].trim_start();
    let rest = rest.strip_prefix('Q')?;
    let digit = rest.as_bytes().first().filter(|b| b.is_ascii_digit())?;

    Period::new(year, digit - b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_to_time_coordinates() {
        assert_eq!(Period::parse("2024 Q1").unwrap().time(), 2024.0);
        assert_eq!(Period::parse("2024 Q3").unwrap().time(), 2024.5);
        assert_eq!(Period::parse("2019 Q4").unwrap().time(), 2019.75);
    }

    #[test]
    fn whitespace_between_year_and_quarter_is_optional() {
        assert_eq!(Period::parse("2024Q2").unwrap(), Period { year: 2024, quarter: 2 });
        assert_eq!(Period::parse("  2024 \t Q2 ").unwrap(), Period { year: 2024, quarter: 2 });
    }

    #[test]
    fn trailing_text_is_ignored() {
        assert_eq!(Period::parse("2024 Q2 (restated)").unwrap(), Period { year: 2024, quarter: 2 });
    }

    #[test]
    fn malformed_labels_are_rejected() {
        for bad in ["2024-Q1", "Q1 2024", "24 Q1", "2024 q1", "2024 Q", "", "20245 Q1", "2024 QX"] {
            let err = Period::parse(bad).unwrap_err();
            assert!(matches!(err, ForecastError::Parse { .. }), "{bad:?} -> {err}");
        }
    }

    #[test]
    fn quarters_outside_one_to_four_are_rejected() {
        assert!(Period::parse("2024 Q0").is_err());
        assert!(Period::parse("2024 Q5").is_err());
        assert!(Period::new(2024, 9).is_none());
    }

    #[test]
    fn display_round_trips() {
        let p = Period { year: 2023, quarter: 4 };
        assert_eq!(p.to_string(), "2023 Q4");
        assert_eq!("2023 Q4".parse::<Period>().unwrap(), p);
    }

    #[test]
    fn from_time_survives_accumulated_float_error() {
        let start = Period { year: 2023, quarter: 4 };
        let mut t = start.time();
        for i in 1..=400 {
            t += 0.25;
            let expected = start.add_quarters(i);
            assert_eq!(Period::from_time(t), expected, "step {i}");
            // Values just below the boundary still land on the nearest quarter.
            assert_eq!(Period::from_time(expected.time() - 1e-9), expected);
        }
    }

    #[test]
    fn add_quarters_rolls_over_years() {
        let p = Period { year: 2023, quarter: 3 };
        assert_eq!(p.add_quarters(2), Period { year: 2024, quarter: 1 });
        assert_eq!(p.add_quarters(-3), Period { year: 2022, quarter: 4 });
    }
}
