//! Request parameter validation.
//!
//! Query strings are taken as raw strings and checked here so that a bad
//! value produces the JSON error envelope instead of a framework rejection.
//! [`Validator`] collects every failure before reporting, so a client sees
//! all rejected fields at once.

use crate::error::{AppError, FieldError};

/// Message for a malformed object ID path parameter.
pub const INVALID_OBJECT_ID: &str = "Invalid event ID format (must be a valid Sui object ID)";

/// Message for a malformed address.
pub const INVALID_ADDRESS: &str = "Invalid Sui address format";

/// Whether `value` is `0x` followed by exactly 64 hex digits.
///
/// Sui object IDs and account addresses share this form.
#[must_use]
pub fn is_valid_object_id(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Validate an object ID path parameter.
///
/// # Errors
///
/// Returns a 400 [`AppError`] naming `field` when the ID is malformed.
pub fn validate_object_id(field: &str, value: &str) -> Result<(), AppError> {
    if is_valid_object_id(value) {
        Ok(())
    } else {
        Err(AppError::validation(vec![FieldError::new(field, INVALID_OBJECT_ID)]))
    }
}

/// Validate an address path parameter.
///
/// # Errors
///
/// Returns a 400 [`AppError`] naming `field` when the address is malformed.
pub fn validate_address(field: &str, value: &str) -> Result<(), AppError> {
    if is_valid_object_id(value) {
        Ok(())
    } else {
        Err(AppError::validation(vec![FieldError::new(field, INVALID_ADDRESS)]))
    }
}

/// Accumulates field errors while parsing query parameters.
///
/// Each method returns a usable value (the default when the input is missing
/// or invalid) and records a [`FieldError`] for invalid input.
///
/// # Example
///
/// ```
/// use suistage_web::Validator;
///
/// let mut v = Validator::new();
/// let page = v.integer("page", Some("2"), 1, 1, u32::MAX);
/// let limit = v.integer("limit", Some("500"), 10, 1, 100);
///
/// assert_eq!(page, 2);
/// assert_eq!(limit, 10);
/// assert!(v.finish().is_err());
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    /// Start with no errors.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Parse an integer in `min..=max`, or `default` when absent.
    pub fn integer(&mut self, field: &str, raw: Option<&str>, default: u32, min: u32, max: u32) -> u32 {
        let Some(raw) = raw else {
            return default;
        };

        match raw.trim().parse::<u32>() {
            Ok(value) if (min..=max).contains(&value) => value,
            _ => {
                let message = if max == u32::MAX {
                    format!("{} must be an integer of at least {min}", capitalize(field))
                } else {
                    format!("{} must be between {min} and {max}", capitalize(field))
                };
                self.errors.push(FieldError::new(field, message));
                default
            }
        }
    }

    /// Trimmed text of `min..=max` characters.
    pub fn text(&mut self, field: &str, raw: Option<&str>, min: usize, max: usize) -> Option<String> {
        let value = raw?.trim();
        let len = value.chars().count();

        if (min..=max).contains(&len) {
            Some(value.to_string())
        } else {
            self.errors.push(FieldError::new(
                field,
                format!("{} must be between {min} and {max} characters", capitalize(field)),
            ));
            None
        }
    }

    /// A Sui address.
    pub fn address(&mut self, field: &str, raw: Option<&str>) -> Option<String> {
        let value = raw?;

        if is_valid_object_id(value) {
            Some(value.to_string())
        } else {
            self.errors.push(FieldError::new(field, INVALID_ADDRESS));
            None
        }
    }

    /// `true`/`false` (also `1`/`0`).
    pub fn boolean(&mut self, field: &str, raw: Option<&str>) -> Option<bool> {
        match raw?.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => {
                self.errors
                    .push(FieldError::new(field, format!("{field} must be a boolean")));
                None
            }
        }
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`AppError`] listing every recorded failure.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.errors))
        }
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
