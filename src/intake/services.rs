use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{LoginCredentials, RegistrationRequest};
use super::error::{Field, FieldError};
use crate::accounts::schema::{EMAIL_MAX_CHARS, NAME_MAX_CHARS, USER_NAME_MAX_CHARS};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_required(errors: &mut Vec<FieldError>, field: Field, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::Required(field));
        return false;
    }
    true
}

/// Passwords are taken as typed, so only an empty value is missing.
fn check_present(errors: &mut Vec<FieldError>, field: Field, value: &str) -> bool {
    if value.is_empty() {
        errors.push(FieldError::Required(field));
        return false;
    }
    true
}

fn check_max(errors: &mut Vec<FieldError>, field: Field, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(FieldError::TooLong { field, max });
    }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if check_required(errors, Field::Email, email) && !is_valid_email(email) {
        errors.push(FieldError::InvalidEmail(Field::Email));
    }
}

/// Checks the sign-in form can be sent. An empty result means it can.
pub(crate) fn validate_login(creds: &LoginCredentials) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_email(&mut errors, &creds.email);
    check_present(&mut errors, Field::Password, &creds.password);
    errors
}

/// Field checks for registration. The terms gate is not a field error; the
/// form simply refuses to submit while it is unchecked.
pub(crate) fn validate_registration(req: &RegistrationRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if check_required(&mut errors, Field::Name, &req.name) {
        check_max(&mut errors, Field::Name, &req.name, NAME_MAX_CHARS);
    }
    if check_required(&mut errors, Field::UserName, &req.user_name) {
        check_max(&mut errors, Field::UserName, &req.user_name, USER_NAME_MAX_CHARS);
    }
    check_email(&mut errors, &req.email);
    check_max(&mut errors, Field::Email, &req.email, EMAIL_MAX_CHARS);
    check_present(&mut errors, Field::Password, &req.password);
    if check_present(&mut errors, Field::ConfirmPassword, &req.confirm_password)
        && req.password != req.confirm_password
    {
        errors.push(FieldError::PasswordMismatch);
    }
    errors
}
