//! Forecast cycle dates.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{ConfigGenError, Result};

/// The forecast initialization timestamp that drives dated file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleDate(NaiveDateTime);

impl CycleDate {
    /// Parses a cycle date.
    ///
    /// Accepted forms: `YYYYMMDD`, `YYYYMMDDHH`, `YYYYMMDDHHMM`,
    /// `YYYY-MM-DD` and `YYYY-MM-DDTHH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid date in one of those forms.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || {
            ConfigGenError::invalid_argument(
                "cdate",
                format!("'{text}' is not a cycle date (expected YYYYMMDD[HH[MM]])"),
            )
        };

        if text.bytes().all(|b| b.is_ascii_digit()) {
            let field = |range: std::ops::Range<usize>| -> Option<u32> {
                text.get(range).and_then(|s| s.parse().ok())
            };
            let (hour, minute) = match text.len() {
                8 => (Some(0), Some(0)),
                10 => (field(8..10), Some(0)),
                12 => (field(8..10), field(10..12)),
                _ => return Err(invalid()),
            };
            let year = text.get(0..4).and_then(|s| s.parse::<i32>().ok());
            return year
                .zip(field(4..6))
                .zip(field(6..8))
                .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
                .zip(hour.zip(minute))
                .and_then(|(date, (h, min))| date.and_hms_opt(h, min, 0))
                .map(Self)
                .ok_or_else(invalid);
        }

        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .map(Self)
            .ok_or_else(invalid)
    }

    /// Builds a cycle date from its calendar components.
    #[must_use]
    pub fn from_ymdh(year: i32, month: u32, day: u32, hour: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .map(Self)
    }

    /// Four-digit year.
    #[must_use]
    pub fn yyyy(&self) -> String {
        format!("{:04}", self.0.year())
    }

    /// Two-digit zero-padded month.
    #[must_use]
    pub fn mm(&self) -> String {
        format!("{:02}", self.0.month())
    }

    /// Two-digit zero-padded day of month.
    #[must_use]
    pub fn dd(&self) -> String {
        format!("{:02}", self.0.day())
    }

    /// Two-digit zero-padded hour.
    #[must_use]
    pub fn hh(&self) -> String {
        format!("{:02}", self.0.hour())
    }

    /// `YYYYMMDD`.
    #[must_use]
    pub fn yyyymmdd(&self) -> String {
        format!("{}{}{}", self.yyyy(), self.mm(), self.dd())
    }

    /// Formats the date with strftime specifiers (`%Y`, `%m`, `%d`, `%H`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern holds an unknown or unsupported
    /// specifier.
    pub fn format(&self, pattern: &str) -> Result<String> {
        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(ConfigGenError::internal(format!(
                "invalid date pattern '{pattern}'"
            )));
        }

        let mut formatted = String::new();
        write!(formatted, "{}", self.0.format_with_items(items.into_iter())).map_err(|_| {
            ConfigGenError::internal(format!("date pattern '{pattern}' cannot format a cycle date"))
        })?;
        Ok(formatted)
    }
}

impl fmt::Display for CycleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.yyyymmdd(), self.hh())
    }
}

impl FromStr for CycleDate {
    type Err = ConfigGenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
