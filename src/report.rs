use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::Entry;
use crate::progress;

/// Renders a markdown snapshot of progress: per-week and per-month weight
/// change, trailing averages, and the latest measurements.
pub fn build_report(now: DateTime<Utc>, entries: &[Entry]) -> String {
    let summary = progress::aggregate(entries);
    let rolling = progress::rolling_summary(entries, now);

    let mut output = String::new();

    let _ = writeln!(output, "# Weight Tracker Report");
    let _ = writeln!(
        output,
        "Generated {} from {} entries",
        now.date_naive(),
        entries.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Change");

    if summary.weeks.is_empty() {
        let _ = writeln!(output, "No entries recorded yet.");
    } else {
        for week in summary.weeks.iter() {
            let _ = writeln!(
                output,
                "- {} week {}: {:.2} kg",
                week.year, week.week, week.loss_kg
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Change");

    if summary.months.is_empty() {
        let _ = writeln!(output, "No entries recorded yet.");
    } else {
        for month in summary.months.iter() {
            let _ = writeln!(
                output,
                "- {}-{:02}: {:.2} kg",
                month.year, month.month, month.loss_kg
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trailing Averages");
    let _ = writeln!(
        output,
        "- Last 7 days: {:.1} kg lost, {:.0} cal/day",
        rolling.weekly_weight_loss, rolling.weekly_calorie_avg
    );
    let _ = writeln!(
        output,
        "- Last 30 days: {:.1} kg lost, {:.0} cal/day",
        rolling.monthly_weight_loss, rolling.monthly_calorie_avg
    );

    let mut recent: Vec<&Entry> = entries.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Entries");

    if recent.is_empty() {
        let _ = writeln!(output, "No entries recorded yet.");
    } else {
        for entry in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {}: {} kg, {} cal",
                entry.date.date_naive(),
                entry.weight_kg,
                entry.calories
            );
        }
    }

    output
}
