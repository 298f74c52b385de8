use axum::{Json, extract::Extension};
use serde::Serialize;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    logs::ParseDiagnostic,
    models::{dto::RefreshReport, envelope::ApiResponse},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct DiagnosticsReport {
    pub total_logs: usize,
    pub diagnostics: Vec<ParseDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
}

pub async fn refresh_logs(
    AuthUser { username, .. }: AuthUser,
    Extension(state): Extension<AppState>,
) -> Result<Json<ApiResponse<RefreshReport>>, AppError> {
    tracing::info!(%username, path = %state.logs.path().display(), "Log refresh requested");
    let log = state.logs.refresh().await;
    Ok(Json(
        ApiResponse::success(RefreshReport {
            total_logs: log.records.len(),
            skipped_lines: log.skipped_lines(),
        })
        .with_message("Log cache refreshed"),
    ))
}

pub async fn get_diagnostics(
    _user: AuthUser,
    Extension(state): Extension<AppState>,
) -> Result<Json<ApiResponse<DiagnosticsReport>>, AppError> {
    let log = state.logs.get().await;
    Ok(Json(ApiResponse::success(DiagnosticsReport {
        total_logs: log.records.len(),
        diagnostics: log.diagnostics.clone(),
        source_error: log.source_error.clone(),
    })))
}
