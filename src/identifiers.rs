//! Serial numbers and QR tokens for new hives.

use rand::Rng;
use thiserror::Error;

use crate::constants::identifiers::{QR_TOKEN_ALPHABET, QR_TOKEN_LENGTH};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Could not find an unused QR token after {attempts} attempts")]
    TokenExhausted { attempts: u32 },

    #[error("No serial number left after {last}")]
    SerialExhausted { last: String },
}

/// Draws a token uniformly from `A-Z0-9`.
#[must_use]
pub fn generate_qr_token() -> String {
    generate_qr_token_with(&mut rand::rng())
}

pub fn generate_qr_token_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..QR_TOKEN_LENGTH)
        .map(|_| char::from(QR_TOKEN_ALPHABET[rng.random_range(0..QR_TOKEN_ALPHABET.len())]))
        .collect()
}

/// Generates tokens until one is not taken, giving up after `max_attempts`.
pub fn allocate_qr_token<F>(is_taken: F, max_attempts: u32) -> Result<String, IdentifierError>
where
    F: Fn(&str) -> bool,
{
    allocate_with(generate_qr_token, is_taken, max_attempts)
}

pub(crate) fn allocate_with<G, F>(
    mut generate: G,
    is_taken: F,
    max_attempts: u32,
) -> Result<String, IdentifierError>
where
    G: FnMut() -> String,
    F: Fn(&str) -> bool,
{
    for attempt in 1..=max_attempts {
        let token = generate();
        if !is_taken(&token) {
            return Ok(token);
        }
        tracing::debug!(attempt, "QR token collision, retrying");
    }

    Err(IdentifierError::TokenExhausted {
        attempts: max_attempts,
    })
}

/// Numeric part of `serial` when it carries `prefix`.
#[must_use]
pub fn serial_suffix(serial: &str, prefix: &str) -> Option<u64> {
    let digits = serial.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Next serial after the highest numeric suffix among `existing`.
///
/// Serials without the prefix or without a numeric suffix are skipped.
pub fn generate_serial_number<'a, I>(
    existing: I,
    prefix: &str,
    width: usize,
) -> Result<String, IdentifierError>
where
    I: IntoIterator<Item = &'a str>,
{
    let next = match existing
        .into_iter()
        .filter_map(|serial| serial_suffix(serial, prefix))
        .max()
    {
        None => 1,
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| IdentifierError::SerialExhausted {
                last: format!("{prefix}{max}"),
            })?,
    };

    Ok(format!("{prefix}{next:0width$}"))
}

/// Public page a hive's QR code points at.
#[must_use]
pub fn public_url(base_url: &str, token: &str) -> String {
    format!(
        "{}/beehive/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn token_has_fixed_length_and_alphabet() {
        for _ in 0..50 {
            let token = generate_qr_token();
            assert_eq!(token.len(), QR_TOKEN_LENGTH);
            assert!(token.bytes().all(|b| QR_TOKEN_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn allocation_retries_past_collisions() {
        let calls = Cell::new(0);
        let token = allocate_with(
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    "TAKENTAKEN00".to_string()
                } else {
                    "FRESHTOKEN01".to_string()
                }
            },
            |t| t == "TAKENTAKEN00",
            5,
        )
        .unwrap();

        assert_eq!(token, "FRESHTOKEN01");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn allocation_gives_up_after_max_attempts() {
        let err = allocate_with(|| "SAMESAMESAME".to_string(), |_| true, 4).unwrap_err();
        assert_eq!(err, IdentifierError::TokenExhausted { attempts: 4 });
    }

    #[test]
    fn next_serial_follows_highest_suffix() {
        let existing = ["TO001", "TO002", "TO003"];
        assert_eq!(generate_serial_number(existing, "TO", 3).unwrap(), "TO004");
    }

    #[test]
    fn next_serial_uses_max_not_last() {
        let existing = ["TO010", "TO002", "TO007"];
        assert_eq!(generate_serial_number(existing, "TO", 3).unwrap(), "TO011");
    }

    #[test]
    fn next_serial_on_empty_collection() {
        assert_eq!(
            generate_serial_number(Vec::<&str>::new(), "TO", 3).unwrap(),
            "TO001"
        );
    }

    #[test]
    fn foreign_serials_are_ignored() {
        let existing = ["HV900", "TOabc", "TO", "TO005"];
        assert_eq!(generate_serial_number(existing, "TO", 3).unwrap(), "TO006");
    }

    #[test]
    fn serial_grows_past_width() {
        assert_eq!(generate_serial_number(["TO999"], "TO", 3).unwrap(), "TO1000");
    }

    #[test]
    fn serial_space_exhaustion_is_an_error() {
        let last = format!("TO{}", u64::MAX);
        let err = generate_serial_number([last.as_str(), "TO001"], "TO", 3).unwrap_err();
        assert_eq!(err, IdentifierError::SerialExhausted { last });
    }

    #[test]
    fn generated_suffix_exceeds_every_prior_suffix() {
        let mut serials: Vec<String> = vec!["TO004".into(), "TO017".into(), "TO003".into()];
        for _ in 0..20 {
            let next = generate_serial_number(serials.iter().map(String::as_str), "TO", 3).unwrap();
            let next_suffix = serial_suffix(&next, "TO").unwrap();
            assert!(
                serials
                    .iter()
                    .filter_map(|s| serial_suffix(s, "TO"))
                    .all(|prior| next_suffix > prior)
            );
            serials.push(next);
        }
    }

    #[test]
    fn public_url_joins_base() {
        assert_eq!(
            public_url("https://kbee.vn/", "ABC123DEF456"),
            "https://kbee.vn/beehive/ABC123DEF456"
        );
    }
}
