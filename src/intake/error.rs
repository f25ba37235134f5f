use std::fmt;

use thiserror::Error;

/// Form fields, named the way they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    UserName,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::UserName => "userName",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
        }
    }

    /// Accepts both the camelCase wire names and the snake/column spellings a backend may use.
    pub fn from_wire(name: &str) -> Option<Field> {
        match name {
            "name" => Some(Field::Name),
            "userName" | "user_name" | "username" => Some(Field::UserName),
            "email" => Some(Field::Email),
            "password" => Some(Field::Password),
            "confirmPassword" | "confirm_password" => Some(Field::ConfirmPassword),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline error attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(Field),
    #[error("{0} must be a valid email address")]
    InvalidEmail(Field),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },
    #[error("passwords do not match")]
    PasswordMismatch,
    /// Reported by the endpoint; cleared only by editing the field.
    #[error("{message}")]
    Conflict { field: Field, message: String },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required(f) | FieldError::InvalidEmail(f) => *f,
            FieldError::TooLong { field, .. } | FieldError::Conflict { field, .. } => *field,
            FieldError::PasswordMismatch => Field::ConfirmPassword,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, FieldError::Conflict { .. })
    }
}

/// Outcome of a failed call to the sign-in or registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("network failure: {message}")]
    NetworkFailure { message: String },
    #[error("rejected: {message}")]
    ValidationConflict {
        field: Option<Field>,
        message: String,
    },
    #[error("authentication rejected")]
    AuthenticationRejected,
}

impl SubmitError {
    pub fn network(message: impl Into<String>) -> Self {
        SubmitError::NetworkFailure {
            message: message.into(),
        }
    }

    /// Only transport-level failures are worth repeating unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::NetworkFailure { .. })
    }

    /// Form-level message. Conflicts tied to a field surface inline instead.
    pub fn banner(&self) -> Option<String> {
        match self {
            SubmitError::NetworkFailure { .. } => {
                Some("We couldn't reach the server. Please try again.".into())
            }
            SubmitError::ValidationConflict { field: None, message } => Some(message.clone()),
            SubmitError::ValidationConflict { field: Some(_), .. } => None,
            SubmitError::AuthenticationRejected => Some("Invalid email or password.".into()),
        }
    }
}
