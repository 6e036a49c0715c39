use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Wrong date format: {0}")]
    WrongFormat(String),
    #[error("Month value is invalid: {0}")]
    MonthOutOfRange(u32),
    #[error("Day value is invalid: {0}")]
    DayOutOfRange(u32),
}

/// Calendar day used as the diary key. Ordered by year, then month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn parse_part<T: FromStr>(part: &str, text: &str) -> Result<T, DateError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::WrongFormat(text.to_string()));
    }
    part.parse()
        .map_err(|_| DateError::WrongFormat(text.to_string()))
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(DateError::WrongFormat(s.to_string()));
        }

        let year: i32 = parse_part(parts[0], s)?;
        let month: u32 = parse_part(parts[1], s)?;
        let day: u32 = parse_part(parts[2], s)?;

        if !(1..=12).contains(&month) {
            return Err(DateError::MonthOutOfRange(month));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(DateError::DayOutOfRange(day));
        }

        Ok(Date::new(year, month as u8, day as u8))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_padded() {
        let d: Date = "2017-01-07".parse().unwrap();
        assert_eq!(d, Date::new(2017, 1, 7));
    }

    #[test]
    fn test_parse_unpadded() {
        let d: Date = "1-2-3".parse().unwrap();
        assert_eq!(d, Date::new(1, 2, 3));
        assert_eq!(d.to_string(), "0001-02-03");
    }

    #[test]
    fn test_wrong_format() {
        for text in ["", "2017-01", "2017-01-01-01", "2017/01/01", "-1-01-01", "2017-+1-01", "2017-01-0a"] {
            assert!(
                matches!(text.parse::<Date>(), Err(DateError::WrongFormat(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_month_out_of_range() {
        assert_eq!("2017-13-01".parse::<Date>(), Err(DateError::MonthOutOfRange(13)));
        assert_eq!("2017-00-01".parse::<Date>(), Err(DateError::MonthOutOfRange(0)));
        assert_eq!("2017-300-01".parse::<Date>(), Err(DateError::MonthOutOfRange(300)));
    }

    #[test]
    fn test_day_out_of_range() {
        assert_eq!("2017-04-31".parse::<Date>(), Err(DateError::DayOutOfRange(31)));
        assert_eq!("2017-02-29".parse::<Date>(), Err(DateError::DayOutOfRange(29)));
        assert_eq!("2017-01-00".parse::<Date>(), Err(DateError::DayOutOfRange(0)));
        assert_eq!("2017-02-300".parse::<Date>(), Err(DateError::DayOutOfRange(300)));
        assert!("2016-02-29".parse::<Date>().is_ok());
        assert!("2000-02-29".parse::<Date>().is_ok());
        assert!("1900-02-29".parse::<Date>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Date::new(2016, 12, 31) < Date::new(2017, 1, 1));
        assert!(Date::new(2017, 1, 31) < Date::new(2017, 2, 1));
        assert!(Date::new(2017, 2, 1) < Date::new(2017, 2, 2));
    }

    #[test]
    fn test_display_error() {
        let err = "x".parse::<Date>().unwrap_err();
        assert_eq!(err.to_string(), "Wrong date format: x");
    }
}
