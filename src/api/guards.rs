use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::security::{self, Claims, Role};
use crate::core::state::AppState;
use crate::db::models::{Student, Teacher};
use crate::repositories;

pub(crate) struct CurrentTeacher(pub(crate) Teacher);
pub(crate) struct CurrentStudent(pub(crate) Student);

/// Whoever holds the token, teacher or student.
pub(crate) enum Principal {
    Teacher(Teacher),
    Student(Student),
}

async fn bearer_claims(
    parts: &mut Parts,
    state: &AppState,
) -> Result<(AppState, Claims), ApiError> {
    let State(app_state) = State::<AppState>::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    let claims = security::verify_token(token, app_state.settings())
        .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

    Ok((app_state, claims))
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (app_state, claims) = bearer_claims(parts, state).await?;

        match claims.role {
            Role::Teacher => repositories::teachers::find_by_id(app_state.db(), &claims.sub)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load teacher"))?
                .map(Principal::Teacher)
                .ok_or(ApiError::Unauthorized("User not found")),
            Role::Student => repositories::students::find_by_id(app_state.db(), &claims.sub)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load student"))?
                .map(Principal::Student)
                .ok_or(ApiError::Unauthorized("User not found")),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTeacher {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (app_state, claims) = bearer_claims(parts, state).await?;
        if claims.role != Role::Teacher {
            return Err(ApiError::Forbidden("Teacher access required"));
        }

        let teacher = repositories::teachers::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load teacher"))?
            .ok_or(ApiError::Unauthorized("User not found"))?;

        Ok(CurrentTeacher(teacher))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (app_state, claims) = bearer_claims(parts, state).await?;
        if claims.role != Role::Student {
            return Err(ApiError::Forbidden("Student access required"));
        }

        let student = repositories::students::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student"))?
            .ok_or(ApiError::Unauthorized("User not found"))?;

        Ok(CurrentStudent(student))
    }
}
