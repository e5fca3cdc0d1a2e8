use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Entry, Goal, GoalKind, ProgressSummary, RollingSummary};
use crate::{db, progress};

pub fn create_api_routes() -> Router<PgPool> {
    Router::new()
        .route("/entries", post(create_entry).get(list_entries))
        .route("/entries/{date}", get(get_entry))
        .route("/progress", get(get_progress))
        .route("/progress/summary", get(get_progress_summary))
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/{id}", delete(delete_goal))
}

pub fn create_health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

pub async fn serve(pool: PgPool, port: u16) -> Result<(), AppError> {
    let app = Router::new()
        .nest("/api", create_api_routes())
        .with_state(pool)
        .merge(create_health_routes());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("API listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

async fn create_entry(
    State(pool): State<PgPool>,
    Json(entry): Json<Entry>,
) -> Result<Json<Entry>, AppError> {
    validate_entry(&entry)?;
    let stored = db::upsert_entry(&pool, &entry).await?;
    Ok(Json(stored))
}

async fn list_entries(State(pool): State<PgPool>) -> Result<Json<Vec<Entry>>, AppError> {
    let entries = db::fetch_entries(&pool).await?;
    Ok(Json(entries))
}

async fn get_entry(
    State(pool): State<PgPool>,
    Path(raw): Path<String>,
) -> Result<Json<Entry>, AppError> {
    let date = parse_date_param(&raw)?;
    match db::fetch_entry(&pool, date).await? {
        Some(entry) => Ok(Json(entry)),
        None => Err(AppError::NotFound(format!("no entry for {}", raw))),
    }
}

async fn get_progress(State(pool): State<PgPool>) -> Result<Json<ProgressSummary>, AppError> {
    let entries = db::fetch_entries(&pool).await?;
    Ok(Json(progress::aggregate(&entries)))
}

async fn get_progress_summary(
    State(pool): State<PgPool>,
) -> Result<Json<RollingSummary>, AppError> {
    let entries = db::fetch_entries(&pool).await?;
    Ok(Json(progress::rolling_summary(&entries, Utc::now())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewGoal {
    #[serde(rename = "type")]
    kind: GoalKind,
    target_weight_loss: f64,
    start_date: DateTime<Utc>,
}

async fn list_goals(State(pool): State<PgPool>) -> Result<Json<Vec<Goal>>, AppError> {
    let goals = db::list_goals(&pool).await?;
    Ok(Json(goals))
}

async fn create_goal(
    State(pool): State<PgPool>,
    Json(body): Json<NewGoal>,
) -> Result<Json<Goal>, AppError> {
    if !(body.target_weight_loss.is_finite() && body.target_weight_loss > 0.0) {
        return Err(AppError::InvalidInput(format!(
            "target weight loss must be positive, got {}",
            body.target_weight_loss
        )));
    }
    let goal = Goal::for_start_date(body.kind, body.target_weight_loss, body.start_date);
    db::insert_goal(&pool, &goal).await?;
    Ok(Json(goal))
}

async fn delete_goal(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if db::delete_goal(&pool, id).await? {
        Ok(Json(json!({ "message": "Goal deleted successfully" })))
    } else {
        Err(AppError::NotFound(format!("no goal with id {}", id)))
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

fn validate_entry(entry: &Entry) -> Result<(), AppError> {
    if !(entry.weight_kg.is_finite() && entry.weight_kg > 0.0) {
        return Err(AppError::InvalidInput(format!(
            "weightKg must be a positive number, got {}",
            entry.weight_kg
        )));
    }
    if entry.calories < 0 {
        return Err(AppError::InvalidInput(format!(
            "calories must be non-negative, got {}",
            entry.calories
        )));
    }
    Ok(())
}

/// Accepts either a full RFC 3339 timestamp or a bare `YYYY-MM-DD`, which is
/// read as UTC midnight to match how entries are keyed.
fn parse_date_param(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(timestamp) = raw.parse::<DateTime<Utc>>() {
        return Ok(timestamp);
    }
    raw.parse::<NaiveDate>()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| AppError::InvalidInput(format!("{} is not a valid date", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_check_reports_ok() {
        let app = create_health_routes();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn date_param_accepts_timestamp_and_plain_date() {
        let full = parse_date_param("2026-01-04T08:30:00Z").unwrap();
        assert_eq!(full, "2026-01-04T08:30:00Z".parse::<DateTime<Utc>>().unwrap());

        let midnight = parse_date_param("2026-01-04").unwrap();
        assert_eq!(
            midnight,
            "2026-01-04T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn date_param_rejects_garbage() {
        assert!(matches!(
            parse_date_param("not-a-date"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_date_param("2026-13-40"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn entry_validation_enforces_positive_weight() {
        let mut entry = Entry {
            date: "2026-01-04T00:00:00Z".parse().unwrap(),
            weight_kg: 84.2,
            calories: 2100,
        };
        assert!(validate_entry(&entry).is_ok());

        entry.weight_kg = 0.0;
        assert!(matches!(
            validate_entry(&entry),
            Err(AppError::InvalidInput(_))
        ));

        entry.weight_kg = f64::NAN;
        assert!(matches!(
            validate_entry(&entry),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn entry_validation_rejects_negative_calories() {
        let entry = Entry {
            date: "2026-01-04T00:00:00Z".parse().unwrap(),
            weight_kg: 84.2,
            calories: -1,
        };
        assert!(matches!(
            validate_entry(&entry),
            Err(AppError::InvalidInput(_))
        ));
    }
}
