//! Column contract for the `users` table.
//!
//! `migrations/0001_create_users.sql` is the DDL form of this table; the
//! constants here are what application code validates against before it
//! ever reaches the database.

pub const USERS_TABLE: &str = "users";

pub const NAME_MAX_CHARS: usize = 255;
pub const USER_NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PHONE_NUMBER_MAX_CHARS: usize = 20;

/// How a column gets its value when an insert leaves it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    None,
    /// Sequence-assigned surrogate key.
    Serial,
    /// Transaction timestamp at insert.
    Now,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub max_chars: Option<usize>,
    pub nullable: bool,
    /// Unique among active (not soft-deleted) rows.
    pub unique: bool,
    pub default: ColumnDefault,
}

const fn column(
    name: &'static str,
    sql_type: &'static str,
    max_chars: Option<usize>,
    nullable: bool,
    unique: bool,
    default: ColumnDefault,
) -> Column {
    Column {
        name,
        sql_type,
        max_chars,
        nullable,
        unique,
        default,
    }
}

pub const USERS_COLUMNS: &[Column] = &[
    column("id", "SERIAL", None, false, true, ColumnDefault::Serial),
    column("name", "VARCHAR", Some(NAME_MAX_CHARS), false, false, ColumnDefault::None),
    column("username", "VARCHAR", Some(USER_NAME_MAX_CHARS), false, true, ColumnDefault::None),
    column("email", "VARCHAR", Some(EMAIL_MAX_CHARS), false, true, ColumnDefault::None),
    column("password", "TEXT", None, false, false, ColumnDefault::None),
    column("phone_number", "VARCHAR", Some(PHONE_NUMBER_MAX_CHARS), true, false, ColumnDefault::None),
    column("created_at", "TIMESTAMPTZ", None, false, false, ColumnDefault::Now),
    column("updated_at", "TIMESTAMPTZ", None, false, false, ColumnDefault::Now),
    column("deleted_at", "TIMESTAMPTZ", None, true, false, ColumnDefault::None),
];

/// Looks up a column of the `users` table by its SQL name.
pub fn users_column(name: &str) -> Option<&'static Column> {
    USERS_COLUMNS.iter().find(|c| c.name == name)
}
