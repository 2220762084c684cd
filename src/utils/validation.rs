use crate::error::{AppError, AppResult};
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Field-keyed validation messages.
///
/// Insertion order is preserved (and serialized as a JSON object in that
/// order) so the first entry is the field a client should focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message; a field keeps its first message.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, message);
            false
        } else {
            true
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn first_field(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }

    pub fn first_message(&self) -> Option<&str> {
        self.entries.first().map(|(_, v)| v.as_str())
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (k, v) in other.entries {
            self.add(k, v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldErrors(self))
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

fn digits_without_whitespace(value: &str) -> Option<String> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.chars().all(|c| c.is_ascii_digit()) {
        Some(compact)
    } else {
        None
    }
}

fn has_digit_count(value: &str, count: usize) -> bool {
    digits_without_whitespace(value).is_some_and(|d| d.len() == count)
}

/// 10 digits once whitespace is removed
pub fn is_valid_mobile(mobile: &str) -> bool {
    has_digit_count(mobile, 10)
}

pub fn is_valid_aadhar(aadhar: &str) -> bool {
    has_digit_count(aadhar, 12)
}

/// Exactly `count` ASCII digits and nothing else
pub fn has_exact_digits(value: &str, count: usize) -> bool {
    value.len() == count && value.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_pincode(pincode: &str) -> bool {
    has_exact_digits(pincode, 6)
}

/// Strips every non-digit (spaces, dashes, a leading `+`), used for OTP identities
pub fn normalize_mobile(mobile: &str) -> AppResult<String> {
    let digits: String = mobile.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 10 {
        return Err(AppError::ValidationError(
            "Please enter a valid 10-digit mobile number".to_string(),
        ));
    }
    Ok(digits)
}

pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(email)
}

/// Leading integer of an income string such as "1200000" or "12 lakh"
pub fn parse_income_prefix(value: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
