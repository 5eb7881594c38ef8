use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::common::error::AppError;

/// Intervalo semiaberto [start, end) de um mês de calendário (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthRange {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month {}-{:02}", year, month)))?;
        let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let next = NaiveDate::from_ymd_opt(ny, nm, 1)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month {}-{:02}", year, month)))?;

        Ok(Self {
            year,
            month,
            start: Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN)),
            end: Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN)),
        })
    }

    /// Aceita "YYYY-MM".
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let (y, m) = value
            .trim()
            .split_once('-')
            .ok_or_else(|| AppError::BadRequest(format!("Expected YYYY-MM, got '{}'", value)))?;
        let year = y
            .parse::<i32>()
            .map_err(|_| AppError::BadRequest(format!("Invalid year in '{}'", value)))?;
        let month = m
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest(format!("Invalid month in '{}'", value)))?;
        Self::new(year, month)
    }

    pub fn current() -> Result<Self, AppError> {
        let now = Utc::now();
        Self::new(now.year(), now.month())
    }

    /// `None` cai no mês corrente.
    pub fn parse_or_current(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            Some(v) if !v.trim().is_empty() => Self::parse(v),
            _ => Self::current(),
        }
    }

    pub fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn december_rolls_into_next_year() {
        let m = MonthRange::parse("2024-12").unwrap();
        assert_eq!(m.start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(m.end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(m.label(), "2024-12");
    }

    #[test]
    fn rejects_garbage() {
        assert!(MonthRange::parse("2024").is_err());
        assert!(MonthRange::parse("2024-13").is_err());
        assert!(MonthRange::parse("abcd-01").is_err());
    }

    #[test]
    fn empty_means_current_month() {
        let m = MonthRange::parse_or_current(Some("  ")).unwrap();
        assert_eq!(m, MonthRange::current().unwrap());
    }
}
