use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};
use tokio::task::spawn_blocking;
use validator::{Validate, ValidationErrors};

use crate::{
    auth::jwt::{AuthUser, TOKEN_TTL_HOURS},
    error::AppError,
    models::{
        dto::{AuthResponse, CredentialsRequest, RegisteredUser, Registration},
        envelope::ApiResponse,
        security_log::{SecurityLogEntry, Severity},
    },
    state::AppState,
    utils::{client_ip::ClientIp, logger::log_security_event},
};

const MISSING_CREDENTIALS: &str = "Missing username or password";
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// First validation message, username before password.
fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    ["username", "password"]
        .iter()
        .filter_map(|field| fields.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid registration".to_string())
}

pub async fn register_account(
    state: &AppState,
    request: CredentialsRequest,
) -> Result<String, AppError> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(AppError::BadRequest(MISSING_CREDENTIALS.into()));
    };

    let registration = Registration {
        username: username.trim().to_string(),
        password: password.trim().to_string(),
    };
    registration
        .validate()
        .map_err(|e| AppError::BadRequest(first_message(&e)))?;

    if state.credentials.exists(&registration.username).await? {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let cost = state.bcrypt_cost;
    let Registration { username, password } = registration;
    let hash = spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    // Lost race against a concurrent registration of the same name.
    if !state.credentials.put(&username, hash).await? {
        return Err(AppError::Conflict("User already exists".into()));
    }

    Ok(username)
}

/// Checks the credentials and mints a token. Unknown user and wrong password fail identically.
pub async fn authenticate(
    state: &AppState,
    request: CredentialsRequest,
) -> Result<AuthResponse, AppError> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(AppError::BadRequest(MISSING_CREDENTIALS.into()));
    };

    let Some(password_hash) = state.credentials.get(&username).await? else {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let valid = spawn_blocking(move || bcrypt::verify(password, &password_hash)).await??;
    if !valid {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = state.tokens.issue(&username)?;
    Ok(AuthResponse {
        username,
        token,
        expires_in_hours: TOKEN_TTL_HOURS,
    })
}

pub async fn register(
    ClientIp(client_ip): ClientIp,
    Extension(state): Extension<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredUser>>), AppError> {
    let Json(payload) = payload?;
    let attempted = payload.username.clone().unwrap_or_default();

    match register_account(&state, payload).await {
        Ok(username) => {
            log_security_event(
                &SecurityLogEntry::new("user_registered", Severity::Info)
                    .username(username.clone())
                    .ip_address(client_ip),
            );
            let message = format!("User '{username}' registered successfully");
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(RegisteredUser { username }).with_message(message)),
            ))
        }
        Err(e) => {
            log_security_event(
                &SecurityLogEntry::new("failed_registration", Severity::Info)
                    .username(attempted)
                    .ip_address(client_ip)
                    .detail(e.to_string()),
            );
            Err(e)
        }
    }
}

pub async fn login(
    ClientIp(client_ip): ClientIp,
    Extension(state): Extension<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let Json(payload) = payload?;
    let attempted = payload.username.clone().unwrap_or_default();

    match authenticate(&state, payload).await {
        Ok(auth) => {
            log_security_event(
                &SecurityLogEntry::new("successful_login", Severity::Info)
                    .username(auth.username.clone())
                    .ip_address(client_ip)
                    .detail("User logged in"),
            );
            Ok(Json(ApiResponse::success(auth).with_message("Login successful")))
        }
        Err(e) => {
            log_security_event(
                &SecurityLogEntry::new("failed_login", Severity::Warning)
                    .username(attempted)
                    .ip_address(client_ip)
                    .detail(e.to_string()),
            );
            Err(e)
        }
    }
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(
    ClientIp(client_ip): ClientIp,
    AuthUser { username, .. }: AuthUser,
) -> Json<ApiResponse<RegisteredUser>> {
    log_security_event(
        &SecurityLogEntry::new("logout", Severity::Info)
            .username(username.clone())
            .ip_address(client_ip),
    );
    Json(
        ApiResponse::success(RegisteredUser { username })
            .with_message("Logout successful. Please discard the token."),
    )
}
