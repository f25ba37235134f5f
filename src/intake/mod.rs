//! Client-side credential intake: the sign-in and registration forms and the
//! endpoint they submit to.

pub mod dto;
pub mod endpoint;
pub mod error;
pub mod login;
pub mod register;
mod services;

pub use dto::{LoginCredentials, RegistrationPayload, RegistrationRequest, Role, SignInPayload};
pub use endpoint::{AuthEndpoint, HttpAuthEndpoint};
pub use error::{Field, FieldError, SubmitError};
pub use login::{LoginForm, LoginStatus};
pub use register::{PasswordField, RegistrationForm, RegistrationStatus};
