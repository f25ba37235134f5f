use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::debug;

use super::repo::AccountRepo;
use super::repo_types::{AccountError, NewAccount, ProfileUpdate, UniqueField, UserAccount};

#[derive(Default)]
struct Rows {
    next_id: i32,
    rows: Vec<UserAccount>,
}

/// Process-local account store with the same constraints as the `users` table.
#[derive(Default)]
pub struct MemoryAccountRepo {
    inner: Mutex<Rows>,
}

impl MemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> MutexGuard<'_, Rows> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Never earlier than `created_at`, even if the wall clock steps backwards.
fn refreshed(created_at: OffsetDateTime) -> OffsetDateTime {
    OffsetDateTime::now_utc().max(created_at)
}

fn active_mut(rows: &mut Rows, id: i32) -> Result<&mut UserAccount, AccountError> {
    rows.rows
        .iter_mut()
        .find(|u| u.id == id && u.is_active())
        .ok_or(AccountError::NotFound)
}

#[async_trait]
impl AccountRepo for MemoryAccountRepo {
    async fn create(&self, new: &NewAccount) -> Result<UserAccount, AccountError> {
        new.validate()?;
        let mut rows = self.rows();
        for existing in rows.rows.iter().filter(|u| u.is_active()) {
            if existing.user_name == new.user_name {
                return Err(AccountError::Conflict {
                    field: UniqueField::UserName,
                });
            }
            if existing.email == new.email {
                return Err(AccountError::Conflict {
                    field: UniqueField::Email,
                });
            }
        }

        rows.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = UserAccount {
            id: rows.next_id,
            name: new.name.clone(),
            user_name: new.user_name.clone(),
            email: new.email.clone(),
            password: new.password.clone(),
            phone_number: new.phone_number.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.rows.push(user.clone());
        debug!(user_id = user.id, "account created");
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserAccount>, AccountError> {
        Ok(self.rows().rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountError> {
        Ok(self
            .rows()
            .rows
            .iter()
            .find(|u| u.is_active() && u.email == email)
            .cloned())
    }

    async fn find_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<UserAccount>, AccountError> {
        Ok(self
            .rows()
            .rows
            .iter()
            .find(|u| u.is_active() && u.user_name == user_name)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: i32,
        update: &ProfileUpdate,
    ) -> Result<UserAccount, AccountError> {
        update.validate()?;
        let mut rows = self.rows();
        let user = active_mut(&mut rows, id)?;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(phone) = &update.phone_number {
            user.phone_number = phone.clone();
        }
        user.updated_at = refreshed(user.created_at);
        Ok(user.clone())
    }

    async fn change_password(&self, id: i32, password: &str) -> Result<UserAccount, AccountError> {
        if password.is_empty() {
            return Err(AccountError::InvalidField {
                field: "password",
                reason: "is required".into(),
            });
        }
        let mut rows = self.rows();
        let user = active_mut(&mut rows, id)?;
        user.password = password.to_string();
        user.updated_at = refreshed(user.created_at);
        Ok(user.clone())
    }

    async fn soft_delete(&self, id: i32) -> Result<UserAccount, AccountError> {
        let mut rows = self.rows();
        let user = active_mut(&mut rows, id)?;
        let now = refreshed(user.created_at);
        user.deleted_at = Some(now);
        user.updated_at = now;
        debug!(user_id = id, "account soft-deleted");
        Ok(user.clone())
    }

    async fn count_active(&self) -> Result<i64, AccountError> {
        Ok(self.rows().rows.iter().filter(|u| u.is_active()).count() as i64)
    }
}
