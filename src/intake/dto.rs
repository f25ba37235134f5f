use std::fmt;

use serde::{Deserialize, Serialize};

/// Mutually exclusive account role picked on the registration form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Applicant,
    Employer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Employer => "employer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory sign-in bundle, alive only while the form is.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn payload(&self) -> SignInPayload {
        SignInPayload {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of the sign-in request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInPayload")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// In-memory registration bundle. `confirm_password` and `agree_to_terms`
/// never leave the client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub agree_to_terms: bool,
}

impl RegistrationRequest {
    pub fn payload(&self) -> RegistrationPayload {
        RegistrationPayload {
            name: self.name.clone(),
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            role: self.role,
        }
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("agree_to_terms", &self.agree_to_terms)
            .finish_non_exhaustive()
    }
}

/// Body of the registration request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for RegistrationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationPayload")
            .field("name", &self.name)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
