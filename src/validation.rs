//! Shape checks applied to request input before anything touches the store

use url::Url;

use crate::error::AppError;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MIN_CUSTOM_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 10;

/// Validates a URL submitted for shortening
///
/// The URL must be an absolute `http` or `https` URL with a host and at most
/// 2048 characters long. Non-ASCII hosts and paths are accepted; the stored
/// string is kept as submitted and only encoded when redirecting.
pub fn validate_url(raw: &str) -> Result<(), AppError> {
    if raw.is_empty() || raw.chars().count() > MAX_URL_LENGTH {
        return Err(AppError::invalid(format!(
            "URL must be between 1 and {MAX_URL_LENGTH} characters"
        )));
    }

    let parsed = Url::parse(raw).map_err(|e| AppError::invalid(format!("Invalid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
        return Err(AppError::invalid("Invalid URL: expected an absolute http(s) URL"));
    }

    Ok(())
}

/// Validates a caller-supplied custom code: 4-10 ASCII letters or digits
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < MIN_CUSTOM_CODE_LENGTH || code.len() > MAX_CODE_LENGTH {
        return Err(AppError::invalid(format!(
            "Custom code must be {MIN_CUSTOM_CODE_LENGTH}-{MAX_CODE_LENGTH} characters"
        )));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::invalid(
            "Custom code may only contain letters and digits",
        ));
    }

    Ok(())
}

/// Validates the shape of a code received on the redirect path
///
/// Looser than [`validate_custom_code`]: any length from 1 to 10 and `_` is allowed.
pub fn validate_code_shape(code: &str) -> Result<(), AppError> {
    let well_formed = !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(AppError::invalid("Invalid short code"))
    }
}
