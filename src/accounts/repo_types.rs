use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

use super::schema::{EMAIL_MAX_CHARS, NAME_MAX_CHARS, PHONE_NUMBER_MAX_CHARS, USER_NAME_MAX_CHARS};

/// User record in the `users` table.
#[derive(Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: i32,
    pub name: String,
    #[sqlx(rename = "username")]
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // opaque stored representation, never exposed in JSON
    pub phone_number: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

impl UserAccount {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

/// Insert bundle for a new account. Timestamps and the id are assigned by the store.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

impl NewAccount {
    /// Checks the required and max-length rules of the `users` columns.
    pub fn validate(&self) -> Result<(), AccountError> {
        required("name", &self.name)?;
        max_chars("name", &self.name, NAME_MAX_CHARS)?;
        required("userName", &self.user_name)?;
        max_chars("userName", &self.user_name, USER_NAME_MAX_CHARS)?;
        required("email", &self.email)?;
        max_chars("email", &self.email, EMAIL_MAX_CHARS)?;
        required("password", &self.password)?;
        if let Some(phone) = &self.phone_number {
            max_chars("phoneNumber", phone, PHONE_NUMBER_MAX_CHARS)?;
        }
        Ok(())
    }
}

/// Partial profile edit. `None` leaves the column untouched; `phone_number: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone_number: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), AccountError> {
        if let Some(name) = &self.name {
            required("name", name)?;
            max_chars("name", name, NAME_MAX_CHARS)?;
        }
        if let Some(Some(phone)) = &self.phone_number {
            max_chars("phoneNumber", phone, PHONE_NUMBER_MAX_CHARS)?;
        }
        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> Result<(), AccountError> {
    if value.trim().is_empty() {
        return Err(AccountError::InvalidField {
            field,
            reason: "is required".into(),
        });
    }
    Ok(())
}

fn max_chars(field: &'static str, value: &str, max: usize) -> Result<(), AccountError> {
    if value.chars().count() > max {
        return Err(AccountError::InvalidField {
            field,
            reason: format!("must be at most {max} characters"),
        });
    }
    Ok(())
}

/// Columns that must be unique among active accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    UserName,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::UserName => f.write_str("userName"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{field} is already taken")]
    Conflict { field: UniqueField },
    #[error("account not found")]
    NotFound,
    #[error("{field} {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
