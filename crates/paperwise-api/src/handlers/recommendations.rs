//! `GET /api/v1/recommendations/weekly`

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use paperwise_core::{logging, RecommendationSet};

use crate::error::ApiError;
use crate::AppState;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
pub struct WeeklyParams {
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub force_refresh: bool,
}

fn user_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::BadRequest("missing X-User-Id header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::BadRequest("X-User-Id header is not valid text".to_string()))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("X-User-Id is not a UUID: {}", raw)))
}

pub async fn get_weekly_recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<WeeklyParams>, QueryRejection>,
) -> Result<Json<RecommendationSet>, ApiError> {
    let user_id = user_id(&headers)?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let set = state
        .orchestrator
        .get_weekly_recommendations(user_id, params.project_id, params.force_refresh)
        .await?;

    info!(
        { logging::USER_ID } = %user_id,
        { logging::RESULT_COUNT } = set.total_papers(),
        "Weekly recommendations served"
    );
    Ok(Json(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_id_header_parsing() {
        let mut headers = HeaderMap::new();
        assert!(matches!(user_id(&headers), Err(ApiError::BadRequest(_))));

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(user_id(&headers), Err(ApiError::BadRequest(_))));

        let id = Uuid::new_v4();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(user_id(&headers).unwrap(), id);
    }
}
