use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::isoweek;
use crate::models::{Entry, MonthSummary, ProgressSummary, RollingSummary, WeekSummary};

struct Bucket {
    start_kg: f64,
    end_kg: f64,
}

/// Groups date-sorted entries by (calendar year, ISO week) and by
/// (calendar year, month) and reports the weight change within each group.
///
/// Callers must supply entries sorted ascending by date; this is a
/// precondition, not re-checked here. The loss for a group is the first
/// entry's weight minus the last entry's weight in input order, so a week
/// that ends heavier than it started yields a negative value. Weights are
/// never compared across groups, and a single-entry group reports 0.
///
/// Groups are emitted in first-encountered order. The week key uses the
/// calendar year of the date, so January 1st of a year starting mid-week
/// keys as (year, 52) or (year, 53) rather than under the previous year.
pub fn aggregate(entries: &[Entry]) -> ProgressSummary {
    let mut week_order: Vec<(i32, u32)> = Vec::new();
    let mut by_week: HashMap<(i32, u32), Bucket> = HashMap::new();
    let mut month_order: Vec<(i32, u32)> = Vec::new();
    let mut by_month: HashMap<(i32, u32), Bucket> = HashMap::new();

    for entry in entries {
        let date = entry.date.date_naive();
        let week_key = (date.year(), isoweek::iso_week_number(date));
        let month_key = (date.year(), date.month());

        match by_week.entry(week_key) {
            MapEntry::Occupied(bucket) => bucket.into_mut().end_kg = entry.weight_kg,
            MapEntry::Vacant(slot) => {
                week_order.push(week_key);
                slot.insert(Bucket {
                    start_kg: entry.weight_kg,
                    end_kg: entry.weight_kg,
                });
            }
        }

        match by_month.entry(month_key) {
            MapEntry::Occupied(bucket) => bucket.into_mut().end_kg = entry.weight_kg,
            MapEntry::Vacant(slot) => {
                month_order.push(month_key);
                slot.insert(Bucket {
                    start_kg: entry.weight_kg,
                    end_kg: entry.weight_kg,
                });
            }
        }
    }

    let weeks = week_order
        .iter()
        .map(|key| {
            let bucket = &by_week[key];
            WeekSummary {
                year: key.0,
                week: key.1,
                loss_kg: round2(bucket.start_kg - bucket.end_kg),
            }
        })
        .collect();

    let months = month_order
        .iter()
        .map(|key| {
            let bucket = &by_month[key];
            MonthSummary {
                year: key.0,
                month: key.1,
                loss_kg: round2(bucket.start_kg - bucket.end_kg),
            }
        })
        .collect();

    ProgressSummary { weeks, months }
}

/// Weight change and calorie averages over the trailing 7 and 30 days.
///
/// A window needs at least two entries to report a loss; otherwise it is 0.
/// `now` is explicit so the computation stays deterministic under test.
pub fn rolling_summary(entries: &[Entry], now: DateTime<Utc>) -> RollingSummary {
    let week_ago = now - Duration::days(7);
    let month_ago = now - Duration::days(30);

    let weekly: Vec<&Entry> = entries.iter().filter(|e| e.date >= week_ago).collect();
    let monthly: Vec<&Entry> = entries.iter().filter(|e| e.date >= month_ago).collect();

    RollingSummary {
        weekly_weight_loss: round1(window_loss(&weekly)),
        monthly_weight_loss: round1(window_loss(&monthly)),
        weekly_calorie_avg: calorie_avg(&weekly),
        monthly_calorie_avg: calorie_avg(&monthly),
    }
}

fn window_loss(window: &[&Entry]) -> f64 {
    match (window.first(), window.last()) {
        (Some(first), Some(last)) if window.len() >= 2 => first.weight_kg - last.weight_kg,
        _ => 0.0,
    }
}

fn calorie_avg(window: &[&Entry]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let total: i64 = window.iter().map(|e| i64::from(e.calories)).sum();
    (total as f64 / window.len() as f64).round()
}

// Half-away-from-zero, which is what f64::round does.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
