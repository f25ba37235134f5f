use tracing::{debug, info, instrument, warn};

use super::dto::{LoginCredentials, SignInPayload};
use super::endpoint::AuthEndpoint;
use super::error::{Field, FieldError, SubmitError};
use super::services::validate_login;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoginStatus {
    #[default]
    Idle,
    Submitting,
    /// Terminal: the endpoint accepted the credentials.
    SignedIn,
    /// Interactive again; the error is kept for display until the next attempt.
    Failed(SubmitError),
}

/// Sign-in form state.
#[derive(Debug, Default)]
pub struct LoginForm {
    credentials: LoginCredentials,
    password_visible: bool,
    status: LoginStatus,
    errors: Vec<FieldError>,
    /// Set by an endpoint conflict; resending the same credentials needs an edit first.
    awaiting_edit: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    pub fn status(&self) -> &LoginStatus {
        &self.status
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.credentials.email = email.into();
        self.clear_errors(Field::Email);
        self.awaiting_edit = false;
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.password = password.into();
        self.clear_errors(Field::Password);
        self.awaiting_edit = false;
    }

    pub fn toggle_password_visibility(&mut self) {
        self.password_visible = !self.password_visible;
    }

    pub fn password_visible(&self) -> bool {
        self.password_visible
    }

    pub fn is_submitting(&self) -> bool {
        self.status == LoginStatus::Submitting
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !matches!(self.status, LoginStatus::Submitting | LoginStatus::SignedIn)
            && !self.awaiting_edit
            && !self.errors.iter().any(FieldError::is_conflict)
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn errors_for(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field() == field)
    }

    pub fn banner(&self) -> Option<String> {
        match &self.status {
            LoginStatus::Failed(SubmitError::ValidationConflict {
                field: Some(field),
                message,
            }) if !is_login_field(*field) => Some(message.clone()),
            LoginStatus::Failed(e) => e.banner(),
            _ => None,
        }
    }

    fn clear_errors(&mut self, field: Field) {
        self.errors.retain(|e| e.field() != field);
    }

    /// Validates locally and moves to `Submitting`, returning the payload to
    /// send. Returns `None` when the submit control is disabled or a field
    /// check fails; nothing should be sent in that case.
    pub fn begin_submit(&mut self) -> Option<SignInPayload> {
        if !self.can_submit() {
            debug!(status = ?self.status, "sign-in submit suppressed");
            return None;
        }
        let errors = validate_login(&self.credentials);
        if !errors.is_empty() {
            debug!(count = errors.len(), "sign-in blocked by field errors");
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        self.status = LoginStatus::Submitting;
        Some(self.credentials.payload())
    }

    /// Applies the endpoint's answer to an in-flight submission.
    pub fn complete(&mut self, result: Result<(), SubmitError>) {
        if !self.is_submitting() {
            warn!(status = ?self.status, "sign-in completion without a pending submit");
            return;
        }
        self.status = match result {
            Ok(()) => {
                info!(email = %self.credentials.email, "signed in");
                self.credentials.password.clear();
                LoginStatus::SignedIn
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                if let SubmitError::ValidationConflict { field, message } = &e {
                    self.awaiting_edit = true;
                    // conflicts on fields this form lacks go to the banner
                    if let Some(field) = field.filter(|f| is_login_field(*f)) {
                        self.errors.push(FieldError::Conflict {
                            field,
                            message: message.clone(),
                        });
                    }
                }
                LoginStatus::Failed(e)
            }
        };
    }

    #[instrument(skip(self, endpoint))]
    pub async fn submit<E>(&mut self, endpoint: &E) -> &LoginStatus
    where
        E: AuthEndpoint + ?Sized,
    {
        if let Some(payload) = self.begin_submit() {
            let result = endpoint.sign_in(&payload).await;
            self.complete(result);
        }
        &self.status
    }
}

fn is_login_field(field: Field) -> bool {
    matches!(field, Field::Email | Field::Password)
}
