use tracing::{debug, info, instrument, warn};

use super::dto::{RegistrationPayload, RegistrationRequest, Role};
use super::endpoint::AuthEndpoint;
use super::error::{Field, FieldError, SubmitError};
use super::services::validate_registration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegistrationStatus {
    #[default]
    Idle,
    Submitting,
    /// Terminal: the account request was accepted.
    Submitted,
    /// Interactive again; the error is kept for display until the next attempt.
    Failed(SubmitError),
}

/// Password inputs with their own visibility toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordField {
    Password,
    ConfirmPassword,
}

/// Registration form state.
#[derive(Debug, Default)]
pub struct RegistrationForm {
    request: RegistrationRequest,
    password_visible: bool,
    confirm_password_visible: bool,
    status: RegistrationStatus,
    errors: Vec<FieldError>,
    /// Set by an endpoint conflict; resending the same request needs an edit first.
    awaiting_edit: bool,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> &RegistrationRequest {
        &self.request
    }

    pub fn status(&self) -> &RegistrationStatus {
        &self.status
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.request.name = name.into();
        self.clear_errors(Field::Name);
        self.awaiting_edit = false;
    }

    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.request.user_name = user_name.into();
        self.clear_errors(Field::UserName);
        self.awaiting_edit = false;
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.request.email = email.into();
        self.clear_errors(Field::Email);
        self.awaiting_edit = false;
    }

    /// Editing either password re-opens the mismatch check, so both fields' errors are cleared.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.request.password = password.into();
        self.clear_errors(Field::Password);
        self.clear_errors(Field::ConfirmPassword);
        self.awaiting_edit = false;
    }

    pub fn set_confirm_password(&mut self, confirm_password: impl Into<String>) {
        self.request.confirm_password = confirm_password.into();
        self.clear_errors(Field::ConfirmPassword);
        self.awaiting_edit = false;
    }

    pub fn set_agree_to_terms(&mut self, agree: bool) {
        self.request.agree_to_terms = agree;
    }

    pub fn select_role(&mut self, role: Role) {
        self.request.role = role;
        self.awaiting_edit = false;
    }

    pub fn toggle_visibility(&mut self, field: PasswordField) {
        match field {
            PasswordField::Password => self.password_visible = !self.password_visible,
            PasswordField::ConfirmPassword => {
                self.confirm_password_visible = !self.confirm_password_visible
            }
        }
    }

    pub fn is_visible(&self, field: PasswordField) -> bool {
        match field {
            PasswordField::Password => self.password_visible,
            PasswordField::ConfirmPassword => self.confirm_password_visible,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.status == RegistrationStatus::Submitting
    }

    /// Whether the submit control is enabled: terms accepted, nothing in
    /// flight, not yet submitted, and no endpoint conflict left unedited.
    pub fn can_submit(&self) -> bool {
        self.request.agree_to_terms
            && !matches!(
                self.status,
                RegistrationStatus::Submitting | RegistrationStatus::Submitted
            )
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
            RegistrationStatus::Failed(e) => e.banner(),
            _ => None,
        }
    }

    fn clear_errors(&mut self, field: Field) {
        self.errors.retain(|e| e.field() != field);
    }

    /// Validates locally and moves to `Submitting`, returning the outbound
    /// payload. `None` means nothing may be sent.
    pub fn begin_submit(&mut self) -> Option<RegistrationPayload> {
        if !self.can_submit() {
            debug!(
                status = ?self.status,
                agree_to_terms = self.request.agree_to_terms,
                "registration submit suppressed"
            );
            return None;
        }
        let errors = validate_registration(&self.request);
        if !errors.is_empty() {
            debug!(count = errors.len(), "registration blocked by field errors");
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        self.status = RegistrationStatus::Submitting;
        Some(self.request.payload())
    }

    pub fn complete(&mut self, result: Result<(), SubmitError>) {
        if !self.is_submitting() {
            warn!(status = ?self.status, "registration completion without a pending submit");
            return;
        }
        self.status = match result {
            Ok(()) => {
                info!(
                    user_name = %self.request.user_name,
                    role = %self.request.role,
                    "registration submitted"
                );
                RegistrationStatus::Submitted
            }
            Err(e) => {
                warn!(error = %e, "registration failed");
                if let SubmitError::ValidationConflict { field, message } = &e {
                    self.awaiting_edit = true;
                    if let Some(field) = field {
                        self.errors.push(FieldError::Conflict {
                            field: *field,
                            message: message.clone(),
                        });
                    }
                }
                RegistrationStatus::Failed(e)
            }
        };
    }

    #[instrument(skip(self, endpoint))]
    pub async fn submit<E>(&mut self, endpoint: &E) -> &RegistrationStatus
    where
        E: AuthEndpoint + ?Sized,
    {
        if let Some(payload) = self.begin_submit() {
            let result = endpoint.register(&payload).await;
            self.complete(result);
        }
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::intake::dto::SignInPayload;

    #[derive(Default)]
    struct FakeEndpoint {
        registrations: Mutex<Vec<RegistrationPayload>>,
        replies: Mutex<VecDeque<Result<(), SubmitError>>>,
    }

    impl FakeEndpoint {
        fn replying(replies: Vec<Result<(), SubmitError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<RegistrationPayload> {
            self.registrations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuthEndpoint for FakeEndpoint {
        async fn sign_in(&self, _payload: &SignInPayload) -> Result<(), SubmitError> {
            unreachable!("registration form never signs in")
        }

        async fn register(&self, payload: &RegistrationPayload) -> Result<(), SubmitError> {
            self.registrations.lock().unwrap().push(payload.clone());
            self.replies.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    fn filled(agree: bool) -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.set_name("Jo Doe");
        form.set_user_name("jodoe");
        form.set_email("jo@example.com");
        form.set_password("pw123456");
        form.set_confirm_password("pw123456");
        form.set_agree_to_terms(agree);
        form
    }

    #[test]
    fn setters_touch_only_their_field() {
        let mut form = filled(true);
        let before = form.request().clone();
        form.set_user_name("other");
        form.set_user_name("final");
        let after = form.request();
        assert_eq!(after.user_name, "final");
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.password, before.password);
        assert_eq!(after.confirm_password, before.confirm_password);
        assert_eq!(after.role, before.role);
        assert_eq!(after.agree_to_terms, before.agree_to_terms);
    }

    #[test]
    fn role_selection_is_exclusive_and_idempotent() {
        let mut form = RegistrationForm::new();
        assert_eq!(form.request().role, Role::Applicant);
        form.select_role(Role::Employer);
        form.select_role(Role::Employer);
        assert_eq!(form.request().role, Role::Employer);
        form.select_role(Role::Applicant);
        assert_eq!(form.request().role, Role::Applicant);
    }

    #[test]
    fn visibility_toggles_are_independent_and_pure() {
        let mut form = filled(true);
        form.toggle_visibility(PasswordField::Password);
        assert!(form.is_visible(PasswordField::Password));
        assert!(!form.is_visible(PasswordField::ConfirmPassword));
        form.toggle_visibility(PasswordField::ConfirmPassword);
        assert!(form.is_visible(PasswordField::ConfirmPassword));
        assert_eq!(form.request().password, "pw123456");
        assert_eq!(form.request().confirm_password, "pw123456");
    }

    #[tokio::test]
    async fn terms_unchecked_sends_nothing_for_any_input() {
        let endpoint = FakeEndpoint::default();
        for mask in 0u8..32 {
            let mut form = RegistrationForm::new();
            if mask & 1 != 0 {
                form.set_name("Jo");
            }
            if mask & 2 != 0 {
                form.set_user_name("jo");
            }
            if mask & 4 != 0 {
                form.set_email("jo@example.com");
            }
            if mask & 8 != 0 {
                form.set_password("pw");
                form.set_confirm_password("pw");
            }
            if mask & 16 != 0 {
                form.select_role(Role::Employer);
            }
            assert!(!form.can_submit());
            assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Idle);
            assert!(form.field_errors().is_empty());
        }
        assert!(endpoint.sent().is_empty());
    }

    #[tokio::test]
    async fn employer_payload_omits_client_only_fields() {
        let endpoint = FakeEndpoint::default();
        let mut form = filled(true);
        form.select_role(Role::Employer);
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Submitted);

        let sent = endpoint.sent();
        assert_eq!(sent.len(), 1);
        let body = serde_json::to_value(&sent[0]).unwrap();
        assert_eq!(body["role"], json!("employer"));
        assert!(body.get("confirmPassword").is_none());
        assert!(body.get("agreeToTerms").is_none());
    }

    #[tokio::test]
    async fn mismatched_passwords_block_locally() {
        let endpoint = FakeEndpoint::default();
        let mut form = filled(true);
        form.set_confirm_password("typo");
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Idle);
        assert!(endpoint.sent().is_empty());
        assert_eq!(
            form.errors_for(Field::ConfirmPassword).collect::<Vec<_>>(),
            vec![&FieldError::PasswordMismatch]
        );

        form.set_confirm_password("pw123456");
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Submitted);
    }

    #[test]
    fn double_begin_yields_one_payload() {
        let mut form = filled(true);
        let first = form.begin_submit();
        let second = form.begin_submit();
        assert!(first.is_some());
        assert!(second.is_none());
        form.complete(Ok(()));
        assert_eq!(form.status(), &RegistrationStatus::Submitted);
        assert!(form.begin_submit().is_none());
    }

    #[tokio::test]
    async fn conflict_sticks_to_field_until_edited() {
        let endpoint = FakeEndpoint::replying(vec![Err(SubmitError::ValidationConflict {
            field: Some(Field::Email),
            message: "Email already registered".into(),
        })]);
        let mut form = filled(true);
        form.submit(&endpoint).await;

        assert!(matches!(form.status(), RegistrationStatus::Failed(_)));
        assert_eq!(form.banner(), None);
        assert_eq!(form.errors_for(Field::Email).count(), 1);
        assert!(!form.can_submit());
        form.submit(&endpoint).await;
        assert!(matches!(form.status(), RegistrationStatus::Failed(_)));
        assert_eq!(endpoint.sent().len(), 1);

        form.set_email("jo2@example.com");
        assert!(form.can_submit());
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Submitted);
        assert_eq!(endpoint.sent().len(), 2);
        assert_eq!(endpoint.sent()[1].email, "jo2@example.com");
    }

    #[tokio::test]
    async fn plain_conflict_blocks_resend_until_any_edit() {
        let endpoint = FakeEndpoint::replying(vec![Err(SubmitError::ValidationConflict {
            field: None,
            message: "Email already registered".into(),
        })]);
        let mut form = filled(true);
        form.submit(&endpoint).await;

        assert_eq!(form.banner().as_deref(), Some("Email already registered"));
        assert!(form.field_errors().is_empty());
        assert!(!form.can_submit());
        assert!(form.begin_submit().is_none());
        assert_eq!(endpoint.sent().len(), 1);

        form.set_user_name("jodoe2");
        assert!(form.can_submit());
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Submitted);
        assert_eq!(endpoint.sent().len(), 2);
    }

    #[tokio::test]
    async fn conflict_on_other_field_clears_after_editing_it() {
        let endpoint = FakeEndpoint::replying(vec![Err(SubmitError::ValidationConflict {
            field: Some(Field::UserName),
            message: "User name already taken".into(),
        })]);
        let mut form = filled(true);
        form.submit(&endpoint).await;
        assert_eq!(form.errors_for(Field::UserName).count(), 1);

        // editing an unrelated field leaves the inline conflict in place
        form.set_name("Jo Q. Doe");
        assert!(!form.can_submit());

        form.set_user_name("jodoe2");
        assert!(form.can_submit());
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Submitted);
    }

    #[tokio::test]
    async fn whitespace_passwords_are_sent_as_typed() {
        let endpoint = FakeEndpoint::default();
        let mut form = filled(true);
        form.set_password("  ");
        form.set_confirm_password("  ");
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Submitted);
        assert_eq!(endpoint.sent()[0].password, "  ");
    }

    #[tokio::test]
    async fn network_failure_returns_to_interactive() {
        let endpoint = FakeEndpoint::replying(vec![Err(SubmitError::network("timed out"))]);
        let mut form = filled(true);
        form.submit(&endpoint).await;
        assert!(form.can_submit());
        assert!(form.banner().is_some());
        assert_eq!(form.submit(&endpoint).await, &RegistrationStatus::Submitted);
    }

    #[test]
    fn unchecking_terms_disables_submit_again() {
        let mut form = filled(true);
        assert!(form.can_submit());
        form.set_agree_to_terms(false);
        assert!(!form.can_submit());
        assert!(form.begin_submit().is_none());
    }
}
