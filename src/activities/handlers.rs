use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{ActivityRequest, EstimateBody, EstimateQuery, EstimateResponse};
use super::repo_types::Activity;
use super::services;
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(list_activities).post(create_activity))
        .route(
            "/activities/estimate",
            get(estimate_from_query).post(estimate_from_body),
        )
        .route(
            "/activities/:id",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
}

#[instrument(skip(state, body))]
pub async fn create_activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<ActivityRequest>, AppError>,
) -> AppResult<(StatusCode, HeaderMap, Json<Activity>)> {
    let activity = services::create_activity(&state, user_id, body).await?;

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/activities/{}", activity.id))
        .map_err(|e| AppError::Fatal(e.into()))?;
    headers.insert(header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(activity)))
}

#[instrument(skip(state))]
pub async fn list_activities(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Activity>>> {
    Ok(Json(services::get_all_activities(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<Activity>> {
    Ok(Json(services::get_activity_by_id(&state, id, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(body), _): WithRejection<Json<ActivityRequest>, AppError>,
) -> AppResult<Json<Activity>> {
    Ok(Json(services::update_activity(&state, id, user_id, body).await?))
}

#[instrument(skip(state))]
pub async fn delete_activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<StatusCode> {
    services::delete_activity(&state, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, q))]
pub async fn estimate_from_query(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    WithRejection(Query(q), _): WithRejection<Query<EstimateQuery>, AppError>,
) -> AppResult<Json<EstimateResponse>> {
    let (Some(activity_type), Some(raw)) = (q.activity_type, q.details) else {
        return Err(AppError::invalid("Activity type and details are required"));
    };
    let details: Value = serde_json::from_str(&raw).map_err(|e| {
        warn!(error = %e, "estimate details are not valid JSON");
        AppError::invalid("Invalid details format. Must be valid JSON")
    })?;
    Ok(Json(
        services::estimate_emissions(&state, activity_type, details).await?,
    ))
}

#[instrument(skip(state, body))]
pub async fn estimate_from_body(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<EstimateBody>, AppError>,
) -> AppResult<Json<EstimateResponse>> {
    Ok(Json(
        services::estimate_emissions(&state, body.activity_type, body.details).await?,
    ))
}
