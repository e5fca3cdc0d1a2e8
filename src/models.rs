use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::isoweek;

/// One daily measurement. The timestamp is the natural identity: the store
/// keeps at most one row per exact timestamp and upserts on conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub date: DateTime<Utc>,
    pub weight_kg: f64,
    pub calories: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub year: i32,
    pub week: u32,
    pub loss_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub loss_kg: f64,
}

/// Per-period weight change, grouped by ISO week and by calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub weeks: Vec<WeekSummary>,
    pub months: Vec<MonthSummary>,
}

/// Change over the trailing 7 and 30 days, relative to a caller-supplied
/// "now". Losses are in kg to one decimal, calorie averages to the nearest
/// whole calorie.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingSummary {
    pub weekly_weight_loss: f64,
    pub monthly_weight_loss: f64,
    pub weekly_calorie_avg: f64,
    pub monthly_calorie_avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Weekly,
    Monthly,
}

/// A target weight loss for one period. Display-only: goals never feed the
/// progress aggregation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub year: i32,
    pub month: u32,
    pub week_of_year: u32,
    pub weekly_target_kg: f64,
    pub monthly_target_kg: f64,
}

impl Goal {
    /// Derives the period fields from the goal's start date. A weekly goal
    /// carries its target in `weekly_target_kg` and zero in the other slot,
    /// and vice versa.
    pub fn for_start_date(kind: GoalKind, target_kg: f64, start: DateTime<Utc>) -> Self {
        let date = start.date_naive();
        Goal {
            id: Uuid::new_v4(),
            year: date.year(),
            month: date.month(),
            week_of_year: isoweek::iso_week_number(date),
            weekly_target_kg: if kind == GoalKind::Weekly { target_kg } else { 0.0 },
            monthly_target_kg: if kind == GoalKind::Monthly { target_kg } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn weekly_goal_derives_period_from_start_date() {
        let goal = Goal::for_start_date(GoalKind::Weekly, 0.5, ts("2021-01-04T00:00:00Z"));
        assert_eq!(goal.year, 2021);
        assert_eq!(goal.month, 1);
        assert_eq!(goal.week_of_year, 1);
        assert_eq!(goal.weekly_target_kg, 0.5);
        assert_eq!(goal.monthly_target_kg, 0.0);
    }

    #[test]
    fn monthly_goal_fills_only_monthly_target() {
        let goal = Goal::for_start_date(GoalKind::Monthly, 2.0, ts("2026-03-15T12:00:00Z"));
        assert_eq!(goal.month, 3);
        assert_eq!(goal.weekly_target_kg, 0.0);
        assert_eq!(goal.monthly_target_kg, 2.0);
    }

    #[test]
    fn entry_serializes_with_wire_names() {
        let entry = Entry {
            date: ts("2026-01-04T00:00:00Z"),
            weight_kg: 84.6,
            calories: 2100,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["weightKg"], 84.6);
        assert_eq!(json["calories"], 2100);
    }
}
