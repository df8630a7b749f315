//! Domain layer - Pure business abstractions
//!
//! Trait definitions, value objects, validation rules and domain error types.
//! Nothing here talks to Axum; SeaORM only appears as the source of `DbErr`.

pub mod errors;
pub mod repositories;
pub mod validation;

pub use errors::{DomainError, ValidationErrors};
pub use repositories::*;
