//! Range checks for submitted health metrics. Every violated constraint is reported, not
//! just the first one.

use axum::{Json, extract::rejection::JsonRejection};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{auth::jwt::AuthUser, error::AppError, models::envelope::ApiResponse};

pub const HEART_RATE_RANGE: (i64, i64) = (20, 220);
pub const TEMPERATURE_RANGE: (f64, f64) = (35.0, 42.0);
pub const SYSTOLIC_RANGE: (i64, i64) = (70, 200);
pub const DIASTOLIC_RANGE: (i64, i64) = (40, 130);

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses "sys/dia".
fn blood_pressure(value: &Value) -> Option<(i64, i64)> {
    let (sys, dia) = value.as_str()?.split_once('/')?;
    Some((sys.trim().parse().ok()?, dia.trim().parse().ok()?))
}

fn within<T: PartialOrd>(value: T, (low, high): (T, T)) -> bool {
    low <= value && value <= high
}

pub fn validate_metrics(payload: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(value) = payload.get("heart_rate") {
        match as_integer(value) {
            Some(hr) if within(hr, HEART_RATE_RANGE) => {}
            Some(_) => errors.push("Heart rate must be between 20 and 220 BPM".to_string()),
            None => errors.push("Heart rate must be a valid number".to_string()),
        }
    }

    if let Some(value) = payload.get("blood_pressure") {
        match blood_pressure(value) {
            Some((sys, dia)) if within(sys, SYSTOLIC_RANGE) && within(dia, DIASTOLIC_RANGE) => {}
            Some(_) => errors.push("Blood pressure values out of normal range".to_string()),
            None => errors.push("Blood pressure format should be 'sys/dia'".to_string()),
        }
    }

    if let Some(value) = payload.get("temperature") {
        match as_float(value) {
            Some(t) if within(t, TEMPERATURE_RANGE) => {}
            Some(_) => errors.push("Temperature must be between 35°C and 42°C".to_string()),
            None => errors.push("Temperature must be a valid number".to_string()),
        }
    }

    errors
}

pub async fn validate_health_data(
    AuthUser { username, .. }: AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let Json(payload) = payload?;
    let fields = match &payload {
        Value::Object(fields) if !fields.is_empty() => fields,
        _ => return Err(AppError::BadRequest("No data provided".into())),
    };

    let errors = validate_metrics(fields);
    if !errors.is_empty() {
        warn!(%username, ?errors, "Validation errors");
        return Err(AppError::Validation(errors));
    }

    info!(%username, "Health data validated successfully");
    Ok(Json(ApiResponse::success(payload).with_message("Data is valid")))
}
