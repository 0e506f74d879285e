// src/allocation/months.rs

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Faixa de anos aceita para meses vindos do cliente e para o ano fiscal.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// Mês de calendário, guardado como o dia 1 do mês. Serializa como "YYYY-MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    /// Mês seguinte; `None` só no limite do calendário do chrono.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid month '{0}', expected YYYY-MM")]
pub struct InvalidMonth(String);

impl FromStr for Month {
    type Err = InvalidMonth;

    // Aceita "YYYY-MM" e também uma data completa "YYYY-MM-DD"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let mut parts = raw.splitn(3, '-');
        let year = parts.next().and_then(|y| y.parse::<i32>().ok());
        let month = parts.next().and_then(|m| m.parse::<u32>().ok());
        let rest_ok = match parts.next() {
            None => true,
            Some(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok(),
        };

        match (year, month, rest_ok) {
            (Some(y), Some(m), true) => Month::new(y, m).ok_or_else(|| InvalidMonth(s.to_string())),
            _ => Err(InvalidMonth(s.to_string())),
        }
    }
}

impl TryFrom<String> for Month {
    type Error = InvalidMonth;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// Todos os meses de `start` até `end`, inclusive. Vazio se `end < start`.
pub fn months_between(start: Month, end: Month) -> Vec<Month> {
    let mut months = Vec::new();
    let mut current = start;
    while current <= end {
        months.push(current);
        match current.next() {
            Some(next) => current = next,
            None => break,
        }
    }
    months
}

/// Os 12 meses do ano fiscal `fiscal_year`. Com início em janeiro coincide com o
/// ano civil; com outro mês inicial o ano fiscal termina no ano que lhe dá nome
/// (FY2025 com início em outubro = out/2024 .. set/2025). Vazio para anos fora
/// de `MIN_YEAR..=MAX_YEAR`.
pub fn fiscal_year_months(fiscal_year: i32, start_month: u32) -> Vec<Month> {
    let start_month = start_month.clamp(1, 12);
    let first_year = if start_month == 1 {
        Some(fiscal_year)
    } else {
        fiscal_year.checked_sub(1)
    };
    let Some(first) = first_year.and_then(|year| Month::new(year, start_month)) else {
        return Vec::new();
    };

    std::iter::successors(Some(first), |m| m.next())
        .take(12)
        .collect()
}
