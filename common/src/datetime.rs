//! Date and time utilities.

use std::{fmt, time::Duration};

use derive_more::{Display, Error};
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date,
    Month, PrimitiveDateTime,
};

/// Format of a [`DateTime`] as stored by the host application.
const FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Formats accepted by [`DateTime::parse()`] in order of preference.
const INPUT_FORMATS: &[&[BorrowedFormatItem<'_>]] = &[
    FORMAT,
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// Format of a date without time.
const DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Wall-clock date and time without a timezone, as the host application
/// stores it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DateTime(PrimitiveDateTime);

impl DateTime {
    /// Parses a [`DateTime`] from the provided `input`.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM`, their `T`-separated
    /// variants and a bare `YYYY-MM-DD` (meaning midnight).
    ///
    /// # Errors
    ///
    /// If the `input` matches none of the accepted formats.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        INPUT_FORMATS
            .iter()
            .find_map(|f| PrimitiveDateTime::parse(input, *f).ok())
            .or_else(|| {
                Date::parse(input, DATE_FORMAT)
                    .ok()
                    .map(Date::midnight)
            })
            .map(Self)
            .ok_or(ParseError)
    }

    /// Formats this [`DateTime`] as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn format(&self) -> String {
        self.0
            .format(FORMAT)
            .unwrap_or_else(|e| panic!("cannot format `DateTime`: {e}"))
    }

    /// Adds the provided number of calendar `months` to this [`DateTime`].
    ///
    /// Days overflowing the resulting month roll over into the next one, so
    /// `2025-01-31` plus one month is `2025-03-03`.
    ///
    /// [`None`] is returned if the result is out of the supported range.
    #[must_use]
    pub fn checked_add_months(self, months: i32) -> Option<Self> {
        let date = self.0.date();
        let index = date
            .year()
            .checked_mul(12)?
            .checked_add(i32::from(u8::from(date.month())) - 1)?
            .checked_add(months)?;
        let year = index.div_euclid(12);
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        let first = Date::from_calendar_date(
            year,
            Month::try_from(month).ok()?,
            1,
        )
        .ok()?;
        let day = first.checked_add(time::Duration::days(
            i64::from(date.day()) - 1,
        ))?;
        Some(Self(PrimitiveDateTime::new(day, self.0.time())))
    }

    /// Adds the provided [`Duration`] to this [`DateTime`].
    ///
    /// [`None`] is returned if the result is out of the supported range.
    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.0
            .checked_add(duration.try_into().ok()?)
            .map(Self)
    }

    /// Subtracts the provided [`Duration`] from this [`DateTime`].
    ///
    /// [`None`] is returned if the result is out of the supported range.
    #[must_use]
    pub fn checked_sub(self, duration: Duration) -> Option<Self> {
        self.0
            .checked_sub(duration.try_into().ok()?)
            .map(Self)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl From<PrimitiveDateTime> for DateTime {
    fn from(dt: PrimitiveDateTime) -> Self {
        Self(dt)
    }
}

impl From<DateTime> for PrimitiveDateTime {
    fn from(dt: DateTime) -> Self {
        dt.0
    }
}

/// Error of parsing a [`DateTime`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("unsupported `DateTime` format")]
pub struct ParseError;
