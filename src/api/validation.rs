use crate::api::errors::ApiError;
use crate::core::config::StorageSettings;
use crate::services::question_source::file_extension;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Checks the uploaded source file name against the configured extensions.
pub(crate) fn validate_source_upload(
    filename: &str,
    storage: &StorageSettings,
) -> Result<(), ApiError> {
    let extension = file_extension(filename)
        .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;

    if storage.is_allowed_extension(&extension) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")))
    }
}

pub(crate) fn validate_question_count(count: u32, max: u32) -> Result<(), ApiError> {
    if (1..=max).contains(&count) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("question_count must be between 1 and {max}")))
    }
}
