//! Time-of-day greeting header.
//!
//! Pure helpers over wall-clock values. The board computes its header once at
//! startup and never refreshes it during a session.

use crate::config::BoardVariant;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

const PREMIUM_NAME: &str = "Boss";
const LOVELY_NAME: &str = "lovely";

/// Part of the day a greeting refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
}

impl DayPart {
    /// `[0,12)` morning, `[12,18)` afternoon, everything else evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }
}

/// Greeting line for `hour` in the variant's phrasing.
pub fn greeting_for_hour(hour: u32, variant: BoardVariant) -> String {
    let part = DayPart::from_hour(hour);
    match variant {
        BoardVariant::Premium => {
            let phrase = match part {
                DayPart::Morning => "Good Morning",
                DayPart::Afternoon => "Good Afternoon",
                DayPart::Evening => "Good Evening",
            };
            format!("{phrase}, {PREMIUM_NAME}")
        }
        BoardVariant::Lovely => {
            let phrase = match part {
                DayPart::Morning => "Good morning",
                DayPart::Afternoon => "Good afternoon",
                DayPart::Evening => "Good evening",
            };
            format!("{phrase}, {LOVELY_NAME}")
        }
    }
}

/// Formats a date as `Monday, Oct 19`.
pub fn format_header_date(date: NaiveDate) -> String {
    date.format("%A, %b %-d").to_string()
}

/// Header content shown above the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub greeting: String,
    /// Present for variants that show the date.
    pub date: Option<String>,
}

impl Header {
    /// Header for a specific local date-time.
    pub fn at(now: NaiveDateTime, variant: BoardVariant) -> Self {
        Self {
            greeting: greeting_for_hour(now.hour(), variant),
            date: variant.shows_date().then(|| format_header_date(now.date())),
        }
    }

    /// Header for the current local time.
    pub fn now(variant: BoardVariant) -> Self {
        Self::at(Local::now().naive_local(), variant)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_header_date, greeting_for_hour, DayPart, Header};
    use crate::config::BoardVariant;
    use chrono::NaiveDate;

    #[test]
    fn hour_partition_boundaries() {
        assert_eq!(DayPart::from_hour(0), DayPart::Morning);
        assert_eq!(DayPart::from_hour(11), DayPart::Morning);
        assert_eq!(DayPart::from_hour(12), DayPart::Afternoon);
        assert_eq!(DayPart::from_hour(17), DayPart::Afternoon);
        assert_eq!(DayPart::from_hour(18), DayPart::Evening);
        assert_eq!(DayPart::from_hour(23), DayPart::Evening);
    }

    #[test]
    fn variants_phrase_greetings_differently() {
        assert_eq!(
            greeting_for_hour(9, BoardVariant::Premium),
            "Good Morning, Boss"
        );
        assert_eq!(
            greeting_for_hour(13, BoardVariant::Premium),
            "Good Afternoon, Boss"
        );
        assert_eq!(
            greeting_for_hour(20, BoardVariant::Lovely),
            "Good evening, lovely"
        );
    }

    #[test]
    fn header_date_uses_long_weekday_and_short_month() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(format_header_date(date), "Monday, Oct 19");
    }

    #[test]
    fn only_premium_header_carries_date() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 5)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        let premium = Header::at(now, BoardVariant::Premium);
        assert_eq!(premium.greeting, "Good Evening, Boss");
        assert_eq!(premium.date.as_deref(), Some("Thursday, Mar 5"));

        let lovely = Header::at(now, BoardVariant::Lovely);
        assert_eq!(lovely.date, None);
    }
}
