//! Input checks applied before anything is written.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::limits;
use crate::models::{Beehive, BeehivePatch, NewBeehive, ProfilePatch};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid regex")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]+$").expect("Invalid regex"))
}

pub fn validate_new_beehive(input: &NewBeehive, today: NaiveDate) -> Result<(), ValidationError> {
    validate_dates(input.import_date, input.split_date, today)?;
    validate_notes(input.notes.as_deref())
}

/// Checks the record that would result from applying `patch` to `current`.
pub fn validate_patch(
    patch: &BeehivePatch,
    current: &Beehive,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    let import_date = patch.import_date.unwrap_or(current.import_date);
    let split_date = patch.split_date.unwrap_or(current.split_date);
    validate_dates(import_date, split_date, today)?;
    validate_notes(patch.notes.as_deref())?;

    if let (Some(sold), Some(false)) = (patch.sold_date, patch.is_sold) {
        return Err(ValidationError::new(
            "sold_date",
            format!("cannot set a sold date ({sold}) while marking the hive unsold"),
        ));
    }

    Ok(())
}

fn validate_dates(
    import_date: NaiveDate,
    split_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if import_date > today {
        return Err(ValidationError::new(
            "import_date",
            "cannot be in the future",
        ));
    }

    if let Some(split) = split_date {
        if split > today {
            return Err(ValidationError::new("split_date", "cannot be in the future"));
        }
        if split < import_date {
            return Err(ValidationError::new(
                "split_date",
                "cannot be earlier than the import date",
            ));
        }
    }

    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<(), ValidationError> {
    if let Some(notes) = notes {
        let len = notes.chars().count();
        if len > limits::MAX_NOTES_LENGTH {
            return Err(ValidationError::new(
                "notes",
                format!(
                    "must be at most {} characters (got {len})",
                    limits::MAX_NOTES_LENGTH
                ),
            ));
        }
    }
    Ok(())
}

pub fn validate_quantity(quantity: usize) -> Result<usize, ValidationError> {
    if !(limits::MIN_BULK_QUANTITY..=limits::MAX_BULK_QUANTITY).contains(&quantity) {
        return Err(ValidationError::new(
            "quantity",
            format!(
                "must be between {} and {}",
                limits::MIN_BULK_QUANTITY,
                limits::MAX_BULK_QUANTITY
            ),
        ));
    }
    Ok(quantity)
}

pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    let len = username.trim().chars().count();
    if !(3..=80).contains(&len) {
        return Err(ValidationError::new(
            "username",
            "must be between 3 and 80 characters",
        ));
    }
    if password.is_empty() {
        return Err(ValidationError::new("password", "is required"));
    }
    Ok(())
}

pub fn validate_profile(patch: &ProfilePatch) -> Result<(), ValidationError> {
    if let Some(email) = &patch.email {
        if !email_regex().is_match(email.trim()) {
            return Err(ValidationError::new("email", "must be a valid email address"));
        }
    }

    if let Some(name) = &patch.business_name {
        let len = name.trim().chars().count();
        if len == 0 || len > limits::MAX_BUSINESS_NAME_LENGTH {
            return Err(ValidationError::new(
                "business_name",
                format!(
                    "must be between 1 and {} characters",
                    limits::MAX_BUSINESS_NAME_LENGTH
                ),
            ));
        }
    }

    if let Some(contact) = &patch.contact_info {
        let contact = contact.trim();
        if contact.is_empty() || contact.len() > 20 || !phone_regex().is_match(contact) {
            return Err(ValidationError::new(
                "contact_info",
                "must be a phone number (digits, spaces, + - ( ) only)",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(import: NaiveDate, split: Option<NaiveDate>) -> NewBeehive {
        NewBeehive {
            import_date: import,
            split_date: split,
            health_status: HealthStatus::Good,
            notes: None,
        }
    }

    #[test]
    fn test_validate_new_beehive_dates() {
        let today = date(2024, 6, 1);
        assert!(validate_new_beehive(&input(date(2024, 1, 1), None), today).is_ok());
        assert!(
            validate_new_beehive(&input(date(2024, 1, 1), Some(date(2024, 2, 1))), today).is_ok()
        );

        let err = validate_new_beehive(&input(date(2024, 7, 1), None), today).unwrap_err();
        assert_eq!(err.field, "import_date");

        let err = validate_new_beehive(&input(date(2024, 3, 1), Some(date(2024, 2, 1))), today)
            .unwrap_err();
        assert_eq!(err.field, "split_date");
    }

    #[test]
    fn test_validate_notes_length() {
        let today = date(2024, 6, 1);
        let mut hive = input(date(2024, 1, 1), None);
        hive.notes = Some("x".repeat(1000));
        assert!(validate_new_beehive(&hive, today).is_ok());
        hive.notes = Some("x".repeat(1001));
        assert!(validate_new_beehive(&hive, today).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(101).is_err());
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("admin", "admin123").is_ok());
        assert!(validate_credentials("ab", "admin123").is_err());
        assert!(validate_credentials("admin", "").is_err());
    }

    #[test]
    fn test_validate_profile() {
        assert!(
            validate_profile(&ProfilePatch {
                email: Some("owner@farm.vn".to_string()),
                contact_info: Some("+84 (90) 123-4567".to_string()),
                ..ProfilePatch::default()
            })
            .is_ok()
        );
        assert!(
            validate_profile(&ProfilePatch {
                email: Some("not-an-email".to_string()),
                ..ProfilePatch::default()
            })
            .is_err()
        );
        assert!(
            validate_profile(&ProfilePatch {
                contact_info: Some("call me".to_string()),
                ..ProfilePatch::default()
            })
            .is_err()
        );
        assert!(
            validate_profile(&ProfilePatch {
                business_name: Some("   ".to_string()),
                ..ProfilePatch::default()
            })
            .is_err()
        );
    }
}
