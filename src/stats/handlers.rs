use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Extension, Path},
};
use serde::Serialize;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    models::envelope::ApiResponse,
    state::AppState,
    stats::aggregate::{
        self, AdvancedStats, Summary, UserHeartRate, UserList, UserOverview,
    },
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

#[derive(Debug, Serialize)]
pub struct LoginReport {
    pub total_logins: usize,
    pub successful_logins: usize,
    pub failed_logins: usize,
    pub success_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct HeartRateReport {
    pub total_readings: usize,
    pub average: f64,
    pub min: i64,
    pub max: i64,
}

pub async fn get_summary(_user: AuthUser, Extension(state): Extension<AppState>) -> ApiResult<Summary> {
    let log = state.logs.get().await;
    Ok(Json(ApiResponse::success(aggregate::summary(&log.records))))
}

pub async fn get_users(_user: AuthUser, Extension(state): Extension<AppState>) -> ApiResult<UserList> {
    let log = state.logs.get().await;
    Ok(Json(ApiResponse::success(aggregate::user_list(&log.records))))
}

pub async fn get_logins(
    _user: AuthUser,
    Extension(state): Extension<AppState>,
) -> ApiResult<LoginReport> {
    let log = state.logs.get().await;
    let stats = aggregate::login_stats(&log.records);
    Ok(Json(ApiResponse::success(LoginReport {
        total_logins: stats.total,
        successful_logins: stats.successful,
        failed_logins: stats.failed,
        success_rate: stats.success_rate,
    })))
}

pub async fn get_heart_rate(
    _user: AuthUser,
    Extension(state): Extension<AppState>,
) -> ApiResult<HeartRateReport> {
    let log = state.logs.get().await;
    let stats = aggregate::heart_rate_stats(&aggregate::heart_rates(&log.records));
    Ok(Json(ApiResponse::success(HeartRateReport {
        total_readings: stats.count,
        average: stats.average,
        min: stats.min,
        max: stats.max,
    })))
}

pub async fn get_user(
    _user: AuthUser,
    Extension(state): Extension<AppState>,
    Path(username): Path<String>,
) -> ApiResult<UserOverview> {
    let log = state.logs.get().await;
    aggregate::user_overview(&log.records, &username)
        .map(|overview| Json(ApiResponse::success(overview)))
        .ok_or_else(|| AppError::NotFound(format!("User '{username}' not found")))
}

pub async fn get_user_heart_rate(
    _user: AuthUser,
    Extension(state): Extension<AppState>,
    Path(username): Path<String>,
) -> ApiResult<UserHeartRate> {
    let log = state.logs.get().await;
    aggregate::user_heart_rate(&log.records, &username)
        .map(|report| Json(ApiResponse::success(report)))
        .ok_or_else(|| {
            AppError::NotFound(format!("No heart rate data found for user '{username}'"))
        })
}

pub async fn get_user_wise_heart_rate(
    _user: AuthUser,
    Extension(state): Extension<AppState>,
) -> ApiResult<BTreeMap<String, f64>> {
    let log = state.logs.get().await;
    Ok(Json(ApiResponse::success(aggregate::per_user_heart_rate(&log.records))))
}

pub async fn get_advanced_stats(
    _user: AuthUser,
    Extension(state): Extension<AppState>,
) -> ApiResult<AdvancedStats> {
    let log = state.logs.get().await;
    aggregate::advanced_stats(&log.records)
        .map(|stats| Json(ApiResponse::success(stats)))
        .ok_or_else(|| AppError::NotFound("No data available".into()))
}
