//! Recurrence rules for series.
//!
//! A rule answers a single question: does the series offer a quest on a given
//! date? Rules are stored as a `rule_type` string plus a JSON parameter blob
//! ([`RuleParams`]), e.g. `{"selected_days": ["MON", "WED"]}`.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Daily,
    Weekdays,
    Weekly,
    NPerWeek,
    Once,
}

impl RuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekdays => "WEEKDAYS",
            Self::Weekly => "WEEKLY",
            Self::NPerWeek => "N_PER_WEEK",
            Self::Once => "ONCE",
        }
    }
}

impl TryFrom<&str> for RuleType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DAILY" => Ok(Self::Daily),
            "WEEKDAYS" => Ok(Self::Weekdays),
            "WEEKLY" => Ok(Self::Weekly),
            "N_PER_WEEK" => Ok(Self::NPerWeek),
            "ONCE" => Ok(Self::Once),
            other => Err(EngineError::InvalidValue(format!(
                "invalid rule type: {other}"
            ))),
        }
    }
}

/// Stored rule parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_days: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_per_week: Option<u8>,
}

/// A parsed, validated recurrence rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub rule_type: RuleType,
    pub selected_days: Vec<Weekday>,
    pub n_per_week: Option<u8>,
}

impl RecurrenceRule {
    pub fn new(rule_type: RuleType, params: &RuleParams) -> ResultEngine<Self> {
        let selected_days = params
            .selected_days
            .iter()
            .map(|day| parse_weekday(day))
            .collect::<ResultEngine<Vec<_>>>()?;
        if let Some(n) = params.n_per_week
            && !(1..=7).contains(&n)
        {
            return Err(EngineError::InvalidValue(format!(
                "n_per_week must be between 1 and 7, got {n}"
            )));
        }
        Ok(Self {
            rule_type,
            selected_days,
            n_per_week: params.n_per_week,
        })
    }

    /// Whether the rule offers a quest on `date`.
    ///
    /// `N_PER_WEEK` always applies: the weekly completion cap is not enforced
    /// anywhere. `ONCE` always applies until the caller deactivates the series.
    #[must_use]
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday();
        match self.rule_type {
            RuleType::Daily | RuleType::NPerWeek | RuleType::Once => true,
            RuleType::Weekdays => !matches!(weekday, Weekday::Sat | Weekday::Sun),
            RuleType::Weekly if self.selected_days.is_empty() => weekday == Weekday::Mon,
            RuleType::Weekly => self.selected_days.contains(&weekday),
        }
    }

    /// Parameters in storage form.
    #[must_use]
    pub fn params(&self) -> RuleParams {
        RuleParams {
            selected_days: self
                .selected_days
                .iter()
                .map(|day| weekday_code(*day).to_string())
                .collect(),
            n_per_week: self.n_per_week,
        }
    }
}

fn parse_weekday(value: &str) -> ResultEngine<Weekday> {
    match value.trim().to_ascii_uppercase().as_str() {
        "MON" | "MONDAY" => Ok(Weekday::Mon),
        "TUE" | "TUESDAY" => Ok(Weekday::Tue),
        "WED" | "WEDNESDAY" => Ok(Weekday::Wed),
        "THU" | "THURSDAY" => Ok(Weekday::Thu),
        "FRI" | "FRIDAY" => Ok(Weekday::Fri),
        "SAT" | "SATURDAY" => Ok(Weekday::Sat),
        "SUN" | "SUNDAY" => Ok(Weekday::Sun),
        _ => Err(EngineError::InvalidValue(format!("unknown day: {value}"))),
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01 is a Monday.
    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn rule(rule_type: RuleType, days: &[&str]) -> RecurrenceRule {
        let params = RuleParams {
            selected_days: days.iter().map(|d| d.to_string()).collect(),
            n_per_week: None,
        };
        RecurrenceRule::new(rule_type, &params).unwrap()
    }

    #[test]
    fn daily_always_applies() {
        let daily = rule(RuleType::Daily, &[]);
        assert!((1..=7).all(|d| daily.applies_on(day(d))));
    }

    #[test]
    fn weekdays_skip_weekend() {
        let weekdays = rule(RuleType::Weekdays, &[]);
        assert!((1..=5).all(|d| weekdays.applies_on(day(d))));
        assert!(!weekdays.applies_on(day(6)));
        assert!(!weekdays.applies_on(day(7)));
    }

    #[test]
    fn weekly_uses_selected_days() {
        let weekly = rule(RuleType::Weekly, &["MON", "wed"]);
        assert!(weekly.applies_on(day(1)));
        assert!(!weekly.applies_on(day(2)));
        assert!(weekly.applies_on(day(3)));
    }

    #[test]
    fn weekly_defaults_to_monday() {
        let weekly = rule(RuleType::Weekly, &[]);
        assert!(weekly.applies_on(day(8)));
        assert!(!weekly.applies_on(day(9)));
    }

    #[test]
    fn n_per_week_and_once_always_apply() {
        let n_per_week = RecurrenceRule::new(
            RuleType::NPerWeek,
            &RuleParams {
                selected_days: Vec::new(),
                n_per_week: Some(3),
            },
        )
        .unwrap();
        let once = rule(RuleType::Once, &[]);
        assert!((1..=7).all(|d| n_per_week.applies_on(day(d)) && once.applies_on(day(d))));
    }

    #[test]
    fn unknown_day_is_rejected() {
        let params = RuleParams {
            selected_days: vec!["FUNDAY".to_string()],
            n_per_week: None,
        };
        let err = RecurrenceRule::new(RuleType::Weekly, &params).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn day_prefixes_are_not_days() {
        for bogus in ["MONKEY", "Wedge", "sunny", "th"] {
            let params = RuleParams {
                selected_days: vec![bogus.to_string()],
                n_per_week: None,
            };
            assert!(
                RecurrenceRule::new(RuleType::Weekly, &params).is_err(),
                "{bogus} accepted"
            );
        }
        let full = rule(RuleType::Weekly, &["Wednesday", "SUNDAY"]);
        assert_eq!(full.selected_days, vec![Weekday::Wed, Weekday::Sun]);
    }

    #[test]
    fn params_round_trip_as_codes() {
        let weekly = rule(RuleType::Weekly, &["monday", "Fri"]);
        assert_eq!(weekly.params().selected_days, vec!["MON", "FRI"]);
    }
}
