// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use base64::{engine::general_purpose, Engine};
use rand::{rng, Rng};
use regex::Regex;
use std::sync::LazyLock;

use super::error::code::ErrorCode;

pub mod shutdown;

#[macro_export]
macro_rules! rustblast_version {
    () => {
        env!("CARGO_PKG_VERSION")
    };
}

#[macro_export]
macro_rules! utc_now {
    () => {{
        use chrono::Utc;
        Utc::now().timestamp_millis()
    }};
}

#[macro_export]
macro_rules! base64_encode {
    ($bytes:expr) => {{
        use base64::{engine::general_purpose::STANDARD, *};
        STANDARD.encode($bytes)
    }};
}

#[macro_export]
macro_rules! raise_error {
    ($msg:expr, $code:expr) => {
        $crate::modules::error::RustBlastError::Generic {
            message: $msg,
            location: snafu::Location::default(),
            code: $code,
        }
    };
}

// Digits with an optional leading '+', the way gateway providers expect targets.
static PHONE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{6,20}$").unwrap());

pub fn validate_phone_number(number: &str) -> crate::modules::error::RustBlastResult<()> {
    if number.is_empty() {
        return Err(raise_error!(
            "'number' cannot be empty.".into(),
            ErrorCode::InvalidParameter
        ));
    }

    if PHONE_NUMBER_REGEX.is_match(number) {
        Ok(())
    } else {
        Err(raise_error!(
            format!(
                "'{}' is not a valid phone number. Use digits only, optionally prefixed with '+'.",
                number
            ),
            ErrorCode::InvalidParameter
        ))
    }
}

#[macro_export]
macro_rules! id {
    ($bit_strength:expr) => {{
        // Generate a token with the given bit strength
        let token = $crate::modules::utils::generate_token_impl($bit_strength);
        // Hash the generated token
        $crate::modules::utils::hash(&token)
    }};
}

pub(crate) fn generate_token_impl(bit_strength: usize) -> String {
    let byte_length = (bit_strength + 23) / 24 * 3;
    let random_bytes: Vec<u8> = (0..byte_length).map(|_| rand::random::<u8>()).collect();
    let mut encoded = general_purpose::URL_SAFE.encode(&random_bytes);

    encoded = encoded
        .chars()
        .map(|c| {
            if c == '/' || c == '+' || c == '-' || c == '_' {
                make_single_random_char()
            } else {
                c
            }
        })
        .collect();

    encoded
}

fn make_single_random_char() -> char {
    let random_bytes: [u8; 3] = rng().random();
    let encoded = general_purpose::URL_SAFE.encode(random_bytes);
    encoded
        .chars()
        .find(|&c| c != '-' && c != '_' && c != '+' && c != '/')
        .unwrap_or('a')
}

/// Generates a 64-bit hash from a string, ensuring the output is within JavaScript's safe integer range (0 to 2^53 - 1).
pub fn hash(s: &str) -> u64 {
    let mut cursor = Vec::new();
    cursor.extend_from_slice(s.as_bytes());
    let mut cursor = std::io::Cursor::new(cursor);
    let hash = murmur3::murmur3_x64_128(&mut cursor, 0).unwrap();
    (hash & 0x1F_FFFF_FFFF_FFFF) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_validation_accepts_international_formats() {
        assert!(validate_phone_number("6281234567890").is_ok());
        assert!(validate_phone_number("+6281234567890").is_ok());
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("08-1234").is_err());
        assert!(validate_phone_number("not a number").is_err());
    }

    #[test]
    fn hash_stays_within_js_safe_range() {
        for input in ["a", "campaign", "6281234567890"] {
            assert!(hash(input) <= 0x1F_FFFF_FFFF_FFFF);
        }
    }
}
