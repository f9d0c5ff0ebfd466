//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration with email activation, login and session tokens for the user
//! center.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod session;
pub mod repo;

pub use service::AuthService;
