use chrono::{NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Canonical text form of a record date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar date in canonical `YYYY-MM-DD` form.
///
/// Parsing is strict: the input must be exactly ten characters, name a real
/// calendar day, and format back to the identical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordDate(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
pub struct InvalidDate(pub String);

impl RecordDate {
    pub fn parse(s: &str) -> Result<Self, InvalidDate> {
        if s.len() != 10 {
            return Err(InvalidDate(s.to_string()));
        }

        let date =
            NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| InvalidDate(s.to_string()))?;

        if date.format(DATE_FORMAT).to_string() != s {
            return Err(InvalidDate(s.to_string()));
        }

        Ok(Self(date))
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for RecordDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for RecordDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}
