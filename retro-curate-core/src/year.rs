//! Release year values as found in machine databases.
//!
//! Years are literal (`1998`), uncertain (`1998?`), or wildcarded with
//! trailing `?` digits (`199?`, `19??`, `????`). Wildcards expand to an
//! inclusive range clipped to [`YearBounds`].

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::CurateError;

/// Limits used when expanding wildcarded years.
///
/// A decade wildcard `DDD?` covers `DDD0..=DDDx` with `x = decade_last_digit`;
/// century and full wildcards are clipped to `earliest..=latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearBounds {
    pub earliest: i64,
    pub latest: i64,
    pub decade_last_digit: u8,
}

impl Default for YearBounds {
    fn default() -> Self {
        Self {
            earliest: 1970,
            latest: 2015,
            decade_last_digit: 8,
        }
    }
}

/// A parsed year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearValue {
    Exact(i64),
    Wildcard(RangeInclusive<i64>),
}

impl YearValue {
    /// Parse a year string. An empty string is treated as `????`.
    pub fn parse(raw: &str, bounds: &YearBounds) -> Result<Self, CurateError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::parse("????", bounds);
        }

        // "1998?" is a verified-uncertain literal
        if trimmed.len() == 5 && trimmed.ends_with('?') {
            let digits = &trimmed[..4];
            if digits.bytes().all(|b| b.is_ascii_digit()) {
                return digits
                    .parse()
                    .map(YearValue::Exact)
                    .map_err(|_| unknown_year(raw));
            }
        }

        if trimmed.len() != 4 || !trimmed.is_ascii() {
            return Err(unknown_year(raw));
        }

        let known = trimmed.trim_end_matches('?');
        if !known.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unknown_year(raw));
        }
        let wild = 4 - known.len();
        if wild == 0 {
            return known
                .parse()
                .map(YearValue::Exact)
                .map_err(|_| unknown_year(raw));
        }

        let prefix: i64 = if known.is_empty() {
            0
        } else {
            known.parse().map_err(|_| unknown_year(raw))?
        };
        let span = 10i64.pow(wild as u32);
        let first = prefix * span;
        let range = (first, first + span - 10 + i64::from(bounds.decade_last_digit.min(9)));
        let lo = range.0.max(bounds.earliest);
        let hi = range.1.min(bounds.latest);
        if lo > hi {
            return Err(out_of_bounds(raw, range, bounds));
        }
        Ok(YearValue::Wildcard(lo..=hi))
    }
}

fn out_of_bounds(raw: &str, range: (i64, i64), bounds: &YearBounds) -> CurateError {
    let (setting, needed) = if range.0 > bounds.latest {
        ("latest", format!("at least {}", range.0))
    } else {
        ("earliest", format!("at most {}", range.1))
    };
    CurateError::metadata(format!(
        "year '{raw}' falls outside [year_bounds] {}..={}; set {setting} to {needed}",
        bounds.earliest, bounds.latest
    ))
}

fn unknown_year(raw: &str) -> CurateError {
    CurateError::metadata(format!("unknown year format '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> YearValue {
        YearValue::parse(s, &YearBounds::default()).unwrap()
    }

    #[test]
    fn literal_and_uncertain() {
        assert_eq!(parse("1998"), YearValue::Exact(1998));
        assert_eq!(parse("1998?"), YearValue::Exact(1998));
        assert_eq!(parse(" 1983 "), YearValue::Exact(1983));
    }

    #[test]
    fn default_expansion_ranges() {
        assert_eq!(parse("197?"), YearValue::Wildcard(1970..=1978));
        assert_eq!(parse("198?"), YearValue::Wildcard(1980..=1988));
        assert_eq!(parse("199?"), YearValue::Wildcard(1990..=1998));
        assert_eq!(parse("200?"), YearValue::Wildcard(2000..=2008));
        assert_eq!(parse("19??"), YearValue::Wildcard(1970..=1998));
        assert_eq!(parse("20??"), YearValue::Wildcard(2000..=2015));
        assert_eq!(parse("????"), YearValue::Wildcard(1970..=2015));
    }

    #[test]
    fn empty_is_fully_unknown() {
        assert_eq!(parse(""), YearValue::Wildcard(1970..=2015));
    }

    #[test]
    fn bounds_are_configurable() {
        let bounds = YearBounds {
            earliest: 1975,
            latest: 2024,
            decade_last_digit: 9,
        };
        let p = |s: &str| YearValue::parse(s, &bounds).unwrap();
        assert_eq!(p("197?"), YearValue::Wildcard(1975..=1979));
        assert_eq!(p("20??"), YearValue::Wildcard(2000..=2024));
        assert_eq!(p("201?"), YearValue::Wildcard(2010..=2019));
    }

    #[test]
    fn out_of_bounds_wildcard_is_an_error() {
        assert!(YearValue::parse("196?", &YearBounds::default()).is_err());
        assert!(YearValue::parse("202?", &YearBounds::default()).is_err());
    }

    #[test]
    fn out_of_bounds_error_names_the_setting() {
        let late = YearValue::parse("202?", &YearBounds::default()).unwrap_err();
        assert_eq!(late.kind(), crate::ErrorKind::Metadata);
        let msg = late.to_string();
        assert!(msg.contains("[year_bounds]"), "{msg}");
        assert!(msg.contains("set latest to at least 2020"), "{msg}");

        let early = YearValue::parse("196?", &YearBounds::default()).unwrap_err();
        assert!(early.to_string().contains("set earliest to at most 1968"));

        let raised = YearBounds {
            latest: 2020,
            ..Default::default()
        };
        assert_eq!(
            YearValue::parse("202?", &raised).unwrap(),
            YearValue::Wildcard(2020..=2020)
        );
    }

    #[test]
    fn malformed_years_are_errors() {
        for bad in ["19x5", "1?9?", "12345", "abcd", "19", "?998"] {
            let err = YearValue::parse(bad, &YearBounds::default()).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Metadata, "{bad}");
        }
    }
}
