use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::repo_types::{AccountError, NewAccount, ProfileUpdate, UniqueField, UserAccount};

/// Storage for `users` rows.
///
/// Lookups by email and user name only see active accounts; `find_by_id`
/// also returns soft-deleted rows so callers can inspect `deleted_at`.
/// Every mutation refreshes `updated_at` and fails with `NotFound` on a
/// soft-deleted row.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn create(&self, new: &NewAccount) -> Result<UserAccount, AccountError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<UserAccount>, AccountError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountError>;
    async fn find_by_user_name(&self, user_name: &str)
        -> Result<Option<UserAccount>, AccountError>;
    async fn update_profile(
        &self,
        id: i32,
        update: &ProfileUpdate,
    ) -> Result<UserAccount, AccountError>;
    async fn change_password(&self, id: i32, password: &str) -> Result<UserAccount, AccountError>;
    async fn soft_delete(&self, id: i32) -> Result<UserAccount, AccountError>;
    async fn count_active(&self) -> Result<i64, AccountError>;
}

#[derive(Clone)]
pub struct PgAccountRepo {
    db: PgPool,
}

impl PgAccountRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USERNAME_INDEX: &str = "users_username_active_key";
const EMAIL_INDEX: &str = "users_email_active_key";

fn map_db_err(e: sqlx::Error) -> AccountError {
    let conflict = match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some(USERNAME_INDEX) => Some(UniqueField::UserName),
                Some(EMAIL_INDEX) => Some(UniqueField::Email),
                _ => None,
            }
        }
        _ => None,
    };
    match conflict {
        Some(field) => {
            warn!(%field, "unique constraint violated");
            AccountError::Conflict { field }
        }
        None => AccountError::Database(e),
    }
}

#[async_trait]
impl AccountRepo for PgAccountRepo {
    #[instrument(skip(self, new), fields(user_name = %new.user_name))]
    async fn create(&self, new: &NewAccount) -> Result<UserAccount, AccountError> {
        new.validate()?;
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            INSERT INTO users (name, username, email, password, phone_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, username, email, password, phone_number,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.user_name)
        .bind(&new.email)
        .bind(&new.password)
        .bind(&new.phone_number)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_err)?;
        debug!(user_id = user.id, "account created");
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserAccount>, AccountError> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, name, username, email, password, phone_number,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountError> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, name, username, email, password, phone_number,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<UserAccount>, AccountError> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, name, username, email, password, phone_number,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE username = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, update))]
    async fn update_profile(
        &self,
        id: i32,
        update: &ProfileUpdate,
    ) -> Result<UserAccount, AccountError> {
        update.validate()?;
        let (set_phone, phone) = match &update.phone_number {
            Some(p) => (true, p.clone()),
            None => (false, None),
        };
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone_number = CASE WHEN $3 THEN $4 ELSE phone_number END,
                updated_at = GREATEST(now(), created_at)
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, username, email, password, phone_number,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(set_phone)
        .bind(phone)
        .fetch_optional(&self.db)
        .await
        .map_err(map_db_err)?
        .ok_or(AccountError::NotFound)?;
        Ok(user)
    }

    #[instrument(skip(self, password))]
    async fn change_password(&self, id: i32, password: &str) -> Result<UserAccount, AccountError> {
        if password.is_empty() {
            return Err(AccountError::InvalidField {
                field: "password",
                reason: "is required".into(),
            });
        }
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            UPDATE users
            SET password = $2,
                updated_at = GREATEST(now(), created_at)
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, username, email, password, phone_number,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(password)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AccountError::NotFound)?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: i32) -> Result<UserAccount, AccountError> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            UPDATE users
            SET deleted_at = GREATEST(now(), created_at),
                updated_at = GREATEST(now(), created_at)
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, username, email, password, phone_number,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AccountError::NotFound)?;
        debug!(user_id = user.id, "account soft-deleted");
        Ok(user)
    }

    async fn count_active(&self) -> Result<i64, AccountError> {
        let (count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM users WHERE deleted_at IS NULL"#)
                .fetch_one(&self.db)
                .await?;
        Ok(count)
    }
}
