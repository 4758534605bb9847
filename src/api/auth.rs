use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::Principal;
use crate::api::validation::{normalize_email, validate_password_len};
use crate::core::redis::RateLimitScope;
use crate::core::security::{self, Role};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::auth::TokenResponse;
use crate::schemas::user::{AccountCreate, AccountLogin, AccountResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register/teacher", post(register_teacher))
        .route("/register/student", post(register_student))
        .route("/login/teacher", post(login_teacher))
        .route("/login/student", post(login_student))
        .route("/me", get(me))
}

async fn register_teacher(
    State(state): State<AppState>,
    Json(payload): Json<AccountCreate>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let email = check_registration(&state, &payload).await?;

    let existing = repositories::teachers::exists_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing teacher"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Teacher with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let teacher = repositories::teachers::create(
        state.db(),
        repositories::teachers::CreateTeacher {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            email: &email,
            hashed_password,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create teacher"))?
    .ok_or_else(|| ApiError::Conflict("Teacher with this email already exists".to_string()))?;

    tracing::info!(teacher_id = %teacher.id, "Teacher registered");
    let account = AccountResponse::from_teacher(&teacher);
    let response = token_response(&state, &teacher.id, Role::Teacher, account)?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn register_student(
    State(state): State<AppState>,
    Json(payload): Json<AccountCreate>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let email = check_registration(&state, &payload).await?;

    let existing = repositories::students::exists_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing student"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Student with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let student = repositories::students::create(
        state.db(),
        repositories::students::CreateStudent {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            email: &email,
            hashed_password,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create student"))?
    .ok_or_else(|| ApiError::Conflict("Student with this email already exists".to_string()))?;

    tracing::info!(student_id = %student.id, "Student registered");
    let account = AccountResponse::from_student(&student);
    let response = token_response(&state, &student.id, Role::Student, account)?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login_teacher(
    State(state): State<AppState>,
    Json(payload): Json<AccountLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = check_login_rate(&state, &payload).await?;

    let teacher = repositories::teachers::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load teacher"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))?;

    verify_credentials(&payload.password, &teacher.hashed_password)?;

    token_response(&state, &teacher.id, Role::Teacher, AccountResponse::from_teacher(&teacher))
        .map(Json)
}

async fn login_student(
    State(state): State<AppState>,
    Json(payload): Json<AccountLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = check_login_rate(&state, &payload).await?;

    let student = repositories::students::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))?;

    verify_credentials(&payload.password, &student.hashed_password)?;

    token_response(&state, &student.id, Role::Student, AccountResponse::from_student(&student))
        .map(Json)
}

async fn me(principal: Principal) -> Json<AccountResponse> {
    match principal {
        Principal::Teacher(teacher) => Json(AccountResponse::from_teacher(&teacher)),
        Principal::Student(student) => Json(AccountResponse::from_student(&student)),
    }
}

async fn check_registration(state: &AppState, payload: &AccountCreate) -> Result<String, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_password_len(&payload.password)?;

    let email = normalize_email(&payload.email);
    let per_minute = state.settings().security().auth_rate_limit_per_minute;
    if !state.redis().allow(RateLimitScope::Register, &email, per_minute).await {
        return Err(ApiError::TooManyRequests("Too many registration attempts, try again later"));
    }

    Ok(email)
}

async fn check_login_rate(state: &AppState, payload: &AccountLogin) -> Result<String, ApiError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    }

    let per_minute = state.settings().security().auth_rate_limit_per_minute;
    if !state.redis().allow(RateLimitScope::Login, &email, per_minute).await {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    Ok(email)
}

fn verify_credentials(password: &str, hashed_password: &str) -> Result<(), ApiError> {
    let verified = security::verify_password(password, hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;

    if verified {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("Incorrect email or password"))
    }
}

fn token_response(
    state: &AppState,
    subject: &str,
    role: Role,
    user: AccountResponse,
) -> Result<TokenResponse, ApiError> {
    let access_token = security::create_access_token(subject, role, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse { access_token, token_type: "bearer".to_string(), user })
}
