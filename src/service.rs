//! Link creation and redirect resolution.
//!
//! The service decides what to do with the outcomes of the store's atomic
//! primitives; it never relies on an earlier read still holding at write time.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::database::LinkRepository;
use crate::error::{AppError, StoreError};
use crate::generator::{generate_code, DEFAULT_CODE_LENGTH};
use crate::validation::validate_code_shape;

/// Upper bound on random codes tried before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
}

impl LinkService {
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self { repository }
    }

    /// Returns the short code for `original_url`, creating a mapping if needed.
    ///
    /// A URL that already has a record gets its existing code back. Otherwise
    /// `custom_code` is used as given (callers validate it first) or a random
    /// code is generated.
    ///
    /// # Errors
    ///
    /// - [`AppError::CodeConflict`] if the custom code belongs to a different URL
    /// - [`AppError::GenerationExhausted`] if every random attempt collided
    /// - [`AppError::StoreUnavailable`] on storage failures
    pub fn create_short_link(
        &self,
        original_url: &str,
        custom_code: Option<&str>,
    ) -> Result<String, AppError> {
        if let Some(existing) = self.repository.find_by_original_url(original_url)? {
            info!(short_code = %existing.short_code, "URL already shortened");
            return Ok(existing.short_code);
        }

        let short_code = match custom_code {
            Some(code) => code.to_owned(),
            None => self.generate_unique_code()?,
        };

        match self.repository.insert(original_url, &short_code) {
            Ok(record) => {
                info!(id = record.id, short_code = %record.short_code, "created short link");
                Ok(record.short_code)
            }
            Err(StoreError::AlreadyExists(existing)) if existing.original_url == original_url => {
                // A concurrent request mapped this URL first, possibly under another code
                info!(short_code = %existing.short_code, "short link created concurrently");
                Ok(existing.short_code)
            }
            Err(StoreError::AlreadyExists(_)) => {
                warn!(short_code = %short_code, "code already in use for a different URL");
                Err(AppError::CodeConflict(short_code))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves a short code to its original URL and counts the click.
    ///
    /// A failed click increment is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidInput`] if the code is malformed
    /// - [`AppError::NotFound`] if no record has this code
    /// - [`AppError::StoreUnavailable`] if the lookup fails
    pub fn resolve(&self, code: &str) -> Result<String, AppError> {
        if let Err(err) = validate_code_shape(code) {
            warn!(code, "invalid short code");
            return Err(err);
        }

        let Some(record) = self.repository.find_by_code(code)? else {
            warn!(code, "short code not found");
            return Err(AppError::NotFound);
        };

        match self.repository.increment_clicks(code) {
            Ok(true) => {}
            Ok(false) => warn!(code, "record vanished before click was counted"),
            Err(err) => error!(code, error = %err, "failed to count click"),
        }

        info!(code, url = %record.original_url, "redirecting");
        Ok(record.original_url)
    }

    fn generate_unique_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = generate_code(DEFAULT_CODE_LENGTH);

            if self.repository.find_by_code(&code)?.is_none() {
                return Ok(code);
            }
        }

        error!(attempts = MAX_GENERATION_ATTEMPTS, "failed to generate unique short code");
        Err(AppError::GenerationExhausted(MAX_GENERATION_ATTEMPTS))
    }
}
