//! Domain service for beehive records.
//!
//! Every owner-scoped operation takes the caller's [`Session`] explicitly.

use async_trait::async_trait;
use thiserror::Error;

use crate::identifiers::IdentifierError;
use crate::models::{Beehive, BeehivePatch, NewBeehive, Session};
use crate::services::validation::ValidationError;
use crate::services::views::HiveStats;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum BeehiveError {
    #[error("Beehive not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Could not find an unused QR token after {attempts} attempts")]
    TokenExhausted { attempts: u32 },

    #[error("No serial number left after {0}")]
    SerialExhausted(String),

    #[error("Session expired or invalid")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Not supported by this store: {0}")]
    Unsupported(&'static str),
}

impl From<StoreError> for BeehiveError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<ValidationError> for BeehiveError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<IdentifierError> for BeehiveError {
    fn from(err: IdentifierError) -> Self {
        match err {
            IdentifierError::TokenExhausted { attempts } => Self::TokenExhausted { attempts },
            IdentifierError::SerialExhausted { last } => Self::SerialExhausted(last),
        }
    }
}

impl BeehiveError {
    /// Whether the caller should drop its session and log in again.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[async_trait]
pub trait BeehiveService: Send + Sync {
    /// Hives owned by the session user, in store order.
    async fn list(&self, session: &Session) -> Result<Vec<Beehive>, BeehiveError>;

    /// Validates the input, assigns serial number and QR token, and persists it.
    async fn create(&self, session: &Session, input: NewBeehive)
    -> Result<Beehive, BeehiveError>;

    /// Merges `patch` into the hive and refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`BeehiveError::NotFound`] if the session user owns no hive with that serial.
    async fn update(
        &self,
        session: &Session,
        serial: &str,
        patch: BeehivePatch,
    ) -> Result<Beehive, BeehiveError>;

    /// Hard delete.
    ///
    /// # Errors
    ///
    /// Returns [`BeehiveError::NotFound`] if nothing was deleted.
    async fn delete(&self, session: &Session, serial: &str) -> Result<(), BeehiveError>;

    async fn find_by_serial(
        &self,
        session: &Session,
        serial: &str,
    ) -> Result<Option<Beehive>, BeehiveError>;

    /// Public lookup used by the QR page. No ownership check.
    async fn find_by_token(&self, token: &str) -> Result<Option<Beehive>, BeehiveError>;

    /// Marks the hive sold today.
    async fn sell(&self, session: &Session, serial: &str) -> Result<Beehive, BeehiveError>;

    /// Returns a sold hive to the active inventory.
    async fn unsell(&self, session: &Session, serial: &str) -> Result<Beehive, BeehiveError>;

    async fn stats(&self, session: &Session) -> Result<HiveStats, BeehiveError>;

    /// Printable QR label sheet for the given hives.
    async fn export_qr_pdf(
        &self,
        session: &Session,
        serials: &[String],
    ) -> Result<Vec<u8>, BeehiveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beehive_error_display() {
        let err = BeehiveError::NotFound("TO042".to_string());
        assert_eq!(err.to_string(), "Beehive not found: TO042");

        let err: BeehiveError = IdentifierError::TokenExhausted { attempts: 8 }.into();
        assert_eq!(
            err.to_string(),
            "Could not find an unused QR token after 8 attempts"
        );

        let err: BeehiveError = IdentifierError::SerialExhausted {
            last: "TO18446744073709551615".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            BeehiveError::SerialExhausted(ref last) if last.ends_with("551615")
        ));

        let err: BeehiveError = ValidationError::new("quantity", "must be between 1 and 100").into();
        assert_eq!(
            err.to_string(),
            "Validation failed: quantity: must be between 1 and 100"
        );
    }

    #[test]
    fn only_unauthorized_is_auth_failure() {
        assert!(BeehiveError::Unauthorized.is_auth_failure());
        assert!(!BeehiveError::NotFound("TO001".into()).is_auth_failure());
    }
}
