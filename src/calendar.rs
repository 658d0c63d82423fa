use chrono::{Datelike, Duration, NaiveDate};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewRange {
    #[default]
    Week,
    Month,
    Year,
}

impl ViewRange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for ViewRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewRange {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!("range must be 'week', 'month' or 'year', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarRange {
    pub dates: Vec<NaiveDate>,
    pub labels: Vec<String>,
}

impl CalendarRange {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

pub fn build_range(range: ViewRange, reference: NaiveDate) -> CalendarRange {
    match range {
        ViewRange::Week => week_range(reference),
        ViewRange::Month => month_range(reference.year(), reference.month()),
        ViewRange::Year => year_range(reference.year()),
    }
}

pub fn week_range(today: NaiveDate) -> CalendarRange {
    let dates: Vec<NaiveDate> = (0..7)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect();
    let labels = dates
        .iter()
        .map(|date| date.format("%a").to_string())
        .collect();
    CalendarRange { dates, labels }
}

pub fn month_range(year: i32, month: u32) -> CalendarRange {
    let dates = month_days(year, month);
    let labels = dates.iter().map(|date| date.day().to_string()).collect();
    CalendarRange { dates, labels }
}

pub fn year_range(year: i32) -> CalendarRange {
    let dates: Vec<NaiveDate> = (1..=12).flat_map(|month| month_days(year, month)).collect();
    let labels = dates
        .iter()
        .map(|date| {
            if date.day() == 1 {
                date.format("%b").to_string()
            } else {
                String::new()
            }
        })
        .collect();
    CalendarRange { dates, labels }
}

pub fn month_days(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|date| date.month() == month)
        .collect()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
