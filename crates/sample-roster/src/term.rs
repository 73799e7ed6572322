//! Academic term derivation from a calendar date.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::TermError;

/// First month of the fall season.
const FALL_START_MONTH: u32 = 7;

/// Half of the academic year a term covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// January through June.
    Spring,
    /// July through December.
    Fall,
}

impl Season {
    /// Returns the season containing `month` (1-based).
    #[must_use]
    pub const fn for_month(month: u32) -> Self {
        if month < FALL_START_MONTH {
            Self::Spring
        } else {
            Self::Fall
        }
    }

    const fn id_prefix(self) -> char {
        match self {
            Self::Spring => 's',
            Self::Fall => 'f',
        }
    }

    const fn bounds(self) -> ((u32, u32), (u32, u32)) {
        match self {
            Self::Spring => ((1, 2), (6, 30)),
            Self::Fall => ((7, 1), (12, 23)),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spring => "Spring",
            Self::Fall => "Fall",
        })
    }
}

/// The academic term all sample courses are provisioned into.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use sample_roster::Term;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
/// let term = Term::for_date(today).expect("term in range");
///
/// assert_eq!(term.id(), "s24");
/// assert_eq!(term.name(), "Spring 2024");
/// assert_eq!(term.start_display(), "01/02/2024");
/// assert_eq!(term.end_display(), "06/30/2024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    id: String,
    name: String,
    season: Season,
    start: NaiveDate,
    end: NaiveDate,
}

impl Term {
    /// Derives the term containing `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::OutOfRange`] if the term boundaries cannot be
    /// represented for the date's year.
    pub fn for_date(date: NaiveDate) -> Result<Self, TermError> {
        let year = date.year();
        let season = Season::for_month(date.month());
        let ((start_month, start_day), (end_month, end_day)) = season.bounds();
        let out_of_range = || TermError::OutOfRange { year };
        let start = NaiveDate::from_ymd_opt(year, start_month, start_day).ok_or_else(out_of_range)?;
        let end = NaiveDate::from_ymd_opt(year, end_month, end_day).ok_or_else(out_of_range)?;

        Ok(Self {
            id: format!("{}{}", season.id_prefix(), date.format("%y")),
            name: format!("{season} {year}"),
            season,
            start,
            end,
        })
    }

    /// Returns the short term id, for example `f24`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name, for example `Fall 2024`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the season.
    #[must_use]
    pub const fn season(&self) -> Season {
        self.season
    }

    /// Returns the first day of the term.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the term.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the start date as `MM/DD/YYYY`.
    #[must_use]
    pub fn start_display(&self) -> String {
        self.start.format("%m/%d/%Y").to_string()
    }

    /// Returns the end date as `MM/DD/YYYY`.
    #[must_use]
    pub fn end_display(&self) -> String {
        self.end.format("%m/%d/%Y").to_string()
    }
}
