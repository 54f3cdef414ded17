//! Inline validation for collected answers.
//!
//! Email, phone, and budget have shape checks; every other field is recorded
//! verbatim. A failed check never advances the session step.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::FieldError;
use crate::lead::{FieldKey, LeadDraft};

/// Region assumed for phone numbers when no country has been recorded yet.
pub const FALLBACK_REGION: &str = "US";

/// Basic `local@domain.tld` shape.
pub fn is_valid_email(input: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    });
    re.is_match(input)
}

/// Strip thousands separators and currency symbols. `Some` only when the
/// remainder is all digits; the normalized string is what gets recorded.
pub fn normalize_budget(input: &str) -> Option<String> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
        Some(cleaned)
    } else {
        None
    }
}

/// Validation of an international phone number.
///
/// Numbers are parsed with `default_region` (the previously recorded country
/// answer, uppercased) as the default region and must be valid for the
/// region they resolve to. Numbers with a leading `+` carry their own
/// region; without one, an unrecognized default region rejects the number,
/// the same way the parser fails on an unknown region.
pub fn is_valid_phone(input: &str, default_region: &str) -> bool {
    let region: Option<phonenumber::country::Id> =
        default_region.trim().to_ascii_uppercase().parse().ok();
    match phonenumber::parse(region, input) {
        Ok(number) => phonenumber::is_valid(&number),
        Err(_) => false,
    }
}

/// Validate and normalize one answer against its field key. The `Ok` value
/// is what gets recorded (budget comes back normalized, everything else
/// verbatim).
pub fn validate_field(
    key: FieldKey,
    input: &str,
    draft: &LeadDraft,
) -> Result<String, FieldError> {
    match key {
        FieldKey::Email => {
            if is_valid_email(input) {
                Ok(input.to_string())
            } else {
                Err(FieldError::Email)
            }
        }
        FieldKey::Phone => {
            let region = draft.get(FieldKey::Country).unwrap_or(FALLBACK_REGION);
            if is_valid_phone(input, region) {
                Ok(input.to_string())
            } else {
                Err(FieldError::Phone)
            }
        }
        FieldKey::Budget => normalize_budget(input).ok_or(FieldError::Budget),
        _ => Ok(input.to_string()),
    }
}
