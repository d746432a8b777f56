//! Time values.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::decode::{Cursor, DecodeError};
use crate::encode::{EncodeError, EncodeNode};


//------------ Time ----------------------------------------------------------

/// A point in time in UTC with a resolution of one second.
///
/// This type is used for both the `GeneralizedTime` and `UTCTime` types.
/// Both are encoded as strings of ASCII digits. `GeneralizedTime` uses the
/// form `YYYYMMDDHHMMSSZ`, `UTCTime` the form `YYMMDDHHMMSSZ` where a
/// two-digit year below 70 falls into the 21st century. When encoding
/// `UTCTime`, only the years 1970 to 2069 can be represented.
///
/// Fractions of a second are skipped when decoding.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl Time {
    /// Creates a new time value from its components.
    ///
    /// Returns `None` if any of the components are out of range.
    pub fn new(
        year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8
    ) -> Option<Self> {
        if year > 9999
            || !(1..=12).contains(&month)
            || day < 1 || day > days_in_month(year, month)
            || hour > 23 || minute > 59 || second > 59
        {
            return None
        }
        Some(Time { year, month, day, hour, minute, second })
    }

    /// Creates a time value from seconds since the Unix epoch.
    ///
    /// Returns `None` if the time falls outside the years 0 to 9999.
    pub fn from_unix_timestamp(timestamp: i64) -> Option<Self> {
        let days = timestamp.div_euclid(86400);
        let secs = timestamp.rem_euclid(86400);
        let (year, month, day) = civil_from_days(days);
        if !(0..=9999).contains(&year) {
            return None
        }
        Some(Time {
            year: year as u16, month, day,
            hour: (secs / 3600) as u8,
            minute: ((secs % 3600) / 60) as u8,
            second: (secs % 60) as u8,
        })
    }

    /// Returns the number of seconds since the Unix epoch.
    pub fn unix_timestamp(self) -> i64 {
        days_from_civil(i64::from(self.year), self.month, self.day) * 86400
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    pub fn year(self) -> u16 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn day(self) -> u8 {
        self.day
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn second(self) -> u8 {
        self.second
    }
}


/// # Decoding and Encoding
///
impl Time {
    /// Takes a `GeneralizedTime` from the content octets of a value.
    pub(crate) fn take_generalized_from(
        cursor: &mut Cursor
    ) -> Result<Self, DecodeError> {
        let pos = cursor.pos();
        let content = cursor.take_remaining();
        let mut digits = Digits::new(&content);
        let res = digits.year4().and_then(|year| digits.rest(year));
        res.ok_or_else(|| {
            DecodeError::content("invalid GeneralizedTime", pos)
        })
    }

    /// Takes a `UTCTime` from the content octets of a value.
    pub(crate) fn take_utc_from(
        cursor: &mut Cursor
    ) -> Result<Self, DecodeError> {
        let pos = cursor.pos();
        let content = cursor.take_remaining();
        let mut digits = Digits::new(&content);
        let res = digits.two().and_then(|year| {
            let year = u16::from(year);
            digits.rest(if year < 70 { 2000 + year } else { 1900 + year })
        });
        res.ok_or_else(|| DecodeError::content("invalid UTCTime", pos))
    }

    /// Returns the content octets of a `GeneralizedTime`.
    pub(crate) fn encode_generalized(self) -> EncodeNode {
        format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.year, self.month, self.day,
            self.hour, self.minute, self.second
        ).into_bytes().into()
    }

    /// Returns the content octets of a `UTCTime`.
    pub(crate) fn encode_utc(self) -> Result<EncodeNode, EncodeError> {
        if !(1970..2070).contains(&self.year) {
            return Err(EncodeError::from_static(
                "UTCTime year out of range"
            ))
        }
        Ok(format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.year % 100, self.month, self.day,
            self.hour, self.minute, self.second
        ).into_bytes().into())
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day,
            self.hour, self.minute, self.second
        )
    }
}


//------------ Digits --------------------------------------------------------

/// A parser for the digits of a time value.
struct Digits<'a> {
    data: &'a [u8],
}

impl<'a> Digits<'a> {
    fn new(data: &'a [u8]) -> Self {
        Digits { data }
    }

    fn two(&mut self) -> Option<u8> {
        let data = self.data;
        match *data {
            [hi @ b'0'..=b'9', lo @ b'0'..=b'9', ..] => {
                self.data = &data[2..];
                Some((hi - b'0') * 10 + (lo - b'0'))
            }
            _ => None
        }
    }

    fn year4(&mut self) -> Option<u16> {
        let hi = self.two()?;
        let lo = self.two()?;
        Some(u16::from(hi) * 100 + u16::from(lo))
    }

    /// Parses everything after the year.
    ///
    /// An optional fraction of a second is skipped. The value must then
    /// either end or end with a `Z`.
    fn rest(&mut self, year: u16) -> Option<Time> {
        let month = self.two()?;
        let day = self.two()?;
        let hour = self.two()?;
        let minute = self.two()?;
        let second = self.two()?;
        let data = self.data;
        if let [b'.' | b',', ref tail @ ..] = *data {
            let digits = tail.iter().take_while(|x| x.is_ascii_digit()).count();
            if digits == 0 {
                return None
            }
            self.data = &tail[digits..];
        }
        match *self.data {
            [] | [b'Z'] => Time::new(year, month, day, hour, minute, second),
            _ => None
        }
    }
}


//------------ Helper Functions ----------------------------------------------

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Returns the days since 1970-01-01 for a date in the proleptic calendar.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year.rem_euclid(400);
    let month = i64::from(month);
    let doy = (153 * (if month > 2 { month - 3 } else { month + 9 }) + 2) / 5
        + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// Returns year, month, and day for the days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let days = days + 719468;
    let era = days.div_euclid(146097);
    let doe = days.rem_euclid(146097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}


//============ Tests =========================================================
