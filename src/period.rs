use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Half-open `[start, end)` range covering one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    pub fn containing(date: NaiveDate) -> Self {
        let start = date - Days::new(u64::from(date.day0()));
        Self {
            start,
            end: start + Months::new(1),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Months::new(1),
            end: self.start,
        }
    }

    /// `YYYY-MM`, the same bucket label the monthly queries produce.
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The date `months` calendar months before `today` (clamped to month end).
pub fn months_back(today: NaiveDate, months: u32) -> NaiveDate {
    today - Months::new(months)
}

/// `(current - previous) / previous * 100`, rounded to two places; 0 when `previous` is 0.
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    (current - previous)
        .checked_div(previous)
        .map(|ratio| (ratio * Decimal::ONE_HUNDRED).round_dp(2))
        .unwrap_or_default()
}

/// `part / whole * 100`, rounded to two places; 0 when `whole` is 0.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .map(|ratio| (ratio * Decimal::ONE_HUNDRED).round_dp(2))
        .unwrap_or_default()
}
