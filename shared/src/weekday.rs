//! Day-of-week handling shared by every ledger.
//!
//! Some ledgers send the Arabic day name on the wire, others a numeric code
//! `"1"`..`"7"`. Both encodings are mapped here once; the week starts on
//! Saturday (code `"1"`) and ends on Friday (code `"7"`).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

/// How a ledger encodes weekdays on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekdayEncoding {
    ArabicName,
    NumericCode,
}

const ALL: [Weekday; 7] = [
    Weekday::Saturday,
    Weekday::Sunday,
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
];

impl Weekday {
    pub fn all() -> &'static [Weekday; 7] {
        &ALL
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            Weekday::Saturday => "السبت",
            Weekday::Sunday => "الأحد",
            Weekday::Monday => "الاثنين",
            Weekday::Tuesday => "الثلاثاء",
            Weekday::Wednesday => "الأربعاء",
            Weekday::Thursday => "الخميس",
            Weekday::Friday => "الجمعة",
        }
    }

    /// Wire code, "1" for Saturday through "7" for Friday.
    pub fn code(&self) -> &'static str {
        match self {
            Weekday::Saturday => "1",
            Weekday::Sunday => "2",
            Weekday::Monday => "3",
            Weekday::Tuesday => "4",
            Weekday::Wednesday => "5",
            Weekday::Thursday => "6",
            Weekday::Friday => "7",
        }
    }

    pub fn from_code(code: &str) -> Option<Weekday> {
        ALL.iter().copied().find(|d| d.code() == code.trim())
    }

    pub fn from_arabic(name: &str) -> Option<Weekday> {
        let name = name.trim();
        // "الإثنين" is a common alternative spelling
        if name == "الإثنين" {
            return Some(Weekday::Monday);
        }
        ALL.iter().copied().find(|d| d.arabic_name() == name)
    }

    /// Accept either encoding.
    pub fn parse(input: &str) -> Option<Weekday> {
        Self::from_code(input).or_else(|| Self::from_arabic(input))
    }

    pub fn from_date(date: &NaiveDate) -> Weekday {
        match date.weekday() {
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
        }
    }

    pub fn encode(&self, encoding: WeekdayEncoding) -> &'static str {
        match encoding {
            WeekdayEncoding::ArabicName => self.arabic_name(),
            WeekdayEncoding::NumericCode => self.code(),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arabic_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for day in Weekday::all() {
            assert_eq!(Weekday::from_code(day.code()), Some(*day));
            assert_eq!(Weekday::from_arabic(day.arabic_name()), Some(*day));
        }
        assert_eq!(Weekday::from_code("0"), None);
        assert_eq!(Weekday::from_code("8"), None);
    }

    #[test]
    fn test_parse_accepts_both_encodings() {
        assert_eq!(Weekday::parse("1"), Some(Weekday::Saturday));
        assert_eq!(Weekday::parse(" الجمعة "), Some(Weekday::Friday));
        assert_eq!(Weekday::parse("الإثنين"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("Monday"), None);
    }

    #[test]
    fn test_from_date() {
        // 2024-01-06 was a Saturday
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(Weekday::from_date(&date), Weekday::Saturday);
        let date = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
        assert_eq!(Weekday::from_date(&date), Weekday::Friday);
    }

    #[test]
    fn test_encode() {
        assert_eq!(Weekday::Sunday.encode(WeekdayEncoding::NumericCode), "2");
        assert_eq!(Weekday::Sunday.encode(WeekdayEncoding::ArabicName), "الأحد");
    }
}
