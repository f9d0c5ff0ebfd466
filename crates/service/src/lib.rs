//! Service layer for the user center.
//! - Separates business logic from data access (repository traits with SeaORM,
//!   Redis and in-memory implementations).
//! - Reuses validation and entity definitions in the `models` crate.
//! - Pure page-window and page-selection rules live in [`pagination`].

pub mod errors;
pub mod cache;
pub mod pagination;
pub mod orders;
pub mod history;
pub mod token;
pub mod mail;
pub mod auth;
pub mod address;
#[cfg(test)]
pub mod test_support;
#[cfg(test)]
mod seaorm_tests;

pub(crate) mod sync {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Lock a mock store, recovering the data if a previous holder panicked.
    pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
