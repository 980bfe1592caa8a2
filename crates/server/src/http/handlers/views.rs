use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::fail;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ViewsQuery {
    pub slug: String,
}

#[derive(Deserialize)]
pub struct RecordViewRequest {
    pub slug: String,
}

/// Site-wide daily views are bucketed by UTC+8 calendar days.
fn utc8_date_key(now: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(8 * 3600).expect("static offset");
    now.with_timezone(&offset).format("%Y-%m-%d").to_string()
}

pub async fn get_views(
    State(state): State<AppState>,
    Query(query): Query<ViewsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if query.slug.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Missing slug"));
    }

    let total = state.db.get_views(&query.slug).await.map_err(|e| {
        tracing::error!(error = %e, "failed to read views");
        fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read views")
    })?;

    Ok(Json(json!({ "slug": query.slug, "totalViews": total })))
}

/// One view per call; dedup per device is the caller's concern.
pub async fn record_view(
    State(state): State<AppState>,
    Json(payload): Json<RecordViewRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if payload.slug.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Missing slug"));
    }

    let now = Utc::now();
    let date_key = utc8_date_key(now);

    let (total, daily) = state
        .db
        .record_view(&payload.slug, &date_key)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to record view");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record view")
        })?;

    Ok(Json(json!({
        "success": true,
        "slug": payload.slug,
        "totalViews": total,
        "dailyViews": daily,
        "date": date_key,
        "timestamp": now.to_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_rolls_over_at_utc8_midnight() {
        let late = DateTime::parse_from_rfc3339("2026-08-28T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(utc8_date_key(late), "2026-08-29");

        let early = DateTime::parse_from_rfc3339("2026-08-28T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(utc8_date_key(early), "2026-08-28");
    }
}
