use anyhow::Context;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Entry, Goal};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Create-or-replace keyed on the exact timestamp; returns the stored row.
pub async fn upsert_entry(pool: &PgPool, entry: &Entry) -> Result<Entry, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO weight_tracker.entries (recorded_at, weight_kg, calories)
        VALUES ($1, $2, $3)
        ON CONFLICT (recorded_at) DO UPDATE
        SET weight_kg = EXCLUDED.weight_kg, calories = EXCLUDED.calories
        RETURNING recorded_at, weight_kg, calories
        "#,
    )
    .bind(entry.date)
    .bind(entry.weight_kg)
    .bind(entry.calories)
    .fetch_one(pool)
    .await?;

    Ok(entry_from_row(&row))
}

/// All entries, oldest first. The progress aggregation relies on this
/// ordering and does not re-sort.
pub async fn fetch_entries(pool: &PgPool) -> Result<Vec<Entry>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT recorded_at, weight_kg, calories \
         FROM weight_tracker.entries \
         ORDER BY recorded_at ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(entry_from_row).collect())
}

pub async fn fetch_entry(
    pool: &PgPool,
    date: DateTime<Utc>,
) -> Result<Option<Entry>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT recorded_at, weight_kg, calories \
         FROM weight_tracker.entries \
         WHERE recorded_at = $1",
    )
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(entry_from_row))
}

pub async fn list_goals(pool: &PgPool) -> Result<Vec<Goal>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, year, month, week_of_year, weekly_target_kg, monthly_target_kg \
         FROM weight_tracker.goals \
         ORDER BY year, month, week_of_year",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(goal_from_row).collect())
}

pub async fn insert_goal(pool: &PgPool, goal: &Goal) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO weight_tracker.goals
        (id, year, month, week_of_year, weekly_target_kg, monthly_target_kg)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(goal.id)
    .bind(goal.year)
    .bind(goal.month as i32)
    .bind(goal.week_of_year as i32)
    .bind(goal.weekly_target_kg)
    .bind(goal.monthly_target_kg)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns false when no goal with that id existed.
pub async fn delete_goal(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM weight_tracker.goals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let measurements = vec![
        (2026, 1, 5, 86.2, 2450),
        (2026, 1, 6, 86.0, 2300),
        (2026, 1, 8, 85.7, 2200),
        (2026, 1, 12, 85.1, 2150),
        (2026, 1, 15, 84.9, 2250),
        (2026, 1, 19, 84.4, 2100),
        (2026, 1, 23, 84.2, 2050),
        (2026, 1, 26, 83.8, 2000),
        (2026, 2, 2, 83.5, 2100),
        (2026, 2, 5, 83.1, 1950),
    ];

    for (year, month, day, weight_kg, calories) in measurements {
        let date = chrono::NaiveDate::from_ymd_opt(year, month, day)
            .context("invalid date")?
            .and_time(NaiveTime::MIN)
            .and_utc();
        upsert_entry(
            pool,
            &Entry {
                date,
                weight_kg,
                calories,
            },
        )
        .await?;
    }

    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        date: DateTime<Utc>,
        weight_kg: f64,
        calories: i32,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut imported = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        if !(row.weight_kg.is_finite() && row.weight_kg > 0.0) {
            anyhow::bail!("invalid weight {} for {}", row.weight_kg, row.date);
        }
        if row.calories < 0 {
            anyhow::bail!("negative calories for {}", row.date);
        }

        upsert_entry(
            pool,
            &Entry {
                date: row.date,
                weight_kg: row.weight_kg,
                calories: row.calories,
            },
        )
        .await?;
        imported += 1;
    }

    Ok(imported)
}

fn entry_from_row(row: &sqlx::postgres::PgRow) -> Entry {
    Entry {
        date: row.get("recorded_at"),
        weight_kg: row.get("weight_kg"),
        calories: row.get("calories"),
    }
}

fn goal_from_row(row: &sqlx::postgres::PgRow) -> Goal {
    Goal {
        id: row.get("id"),
        year: row.get("year"),
        month: row.get::<i32, _>("month") as u32,
        week_of_year: row.get::<i32, _>("week_of_year") as u32,
        weekly_target_kg: row.get("weekly_target_kg"),
        monthly_target_kg: row.get("monthly_target_kg"),
    }
}
