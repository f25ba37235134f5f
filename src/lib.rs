//! JobJet account intake: the `users` table contract, its repositories, and
//! the sign-in and registration workflows that feed it.

pub mod accounts;
pub mod config;
pub mod db;
pub mod intake;
