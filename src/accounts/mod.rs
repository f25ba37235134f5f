//! Persisted user accounts: the `users` table contract and its repositories.

mod memory;
mod repo;
mod repo_types;
pub mod schema;

pub use memory::MemoryAccountRepo;
pub use repo::{AccountRepo, PgAccountRepo};
pub use repo_types::{AccountError, NewAccount, ProfileUpdate, UniqueField, UserAccount};
