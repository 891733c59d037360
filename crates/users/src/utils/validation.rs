//! Input validation utilities.
//!
//! Validators collect every failure for a record instead of stopping at the
//! first one; batch endpoints report all of them at once.

use regex::Regex;

use crate::types::{NewUser, ValidationErrors};
use crewdesk_database::UserRole;

pub const MAX_NAME_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Check email shape without judging uniqueness
pub fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email regex is valid");

    email_regex.is_match(email) && email.len() <= 255
}

/// Validate a single bulk-create record, collecting every field failure.
/// Uniqueness against the store and the rest of the batch is layered on by
/// the caller, which knows both.
pub fn validate_new_user(record: &NewUser) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if record.name.trim().is_empty() {
        errors.add("name", "The name field is required.");
    } else if record.name.len() > MAX_NAME_LEN {
        errors.add(
            "name",
            format!("The name must not be greater than {MAX_NAME_LEN} characters."),
        );
    }

    if record.email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    } else if !is_valid_email(&record.email) {
        errors.add("email", "The email must be a valid email address.");
    }

    if record.role.trim().is_empty() {
        errors.add("role", "The role field is required.");
    } else if UserRole::parse(&record.role).is_none() {
        errors.add("role", "The selected role is invalid.");
    }

    if record.password.is_empty() {
        errors.add("password", "The password field is required.");
    } else {
        if record.password.len() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        if record.password != record.password_confirmation {
            errors.add("password", "The password confirmation does not match.");
        }
    }

    errors
}

/// Validate a login request body; same field-message shape as bulk create.
pub fn validate_login(email: &str, password: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    } else if !is_valid_email(email) {
        errors.add("email", "The email must be a valid email address.");
    }

    if password.is_empty() {
        errors.add("password", "The password field is required.");
    }

    errors
}
