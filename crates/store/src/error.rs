use thiserror::Error;

use crate::{OrderId, OrderStatus};

/// Errors that can occur when interacting with the repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced entity does not exist (or has been soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The conditional cancel found the order outside of `Pending`.
    #[error("Order {order_id} cannot be canceled from {current} status")]
    InvalidTransition {
        order_id: OrderId,
        current: OrderStatus,
    },

    /// The email is already bound to a credential.
    #[error("Identity already registered: {email}")]
    DuplicateIdentity { email: String },

    /// The stored hash did not match the presented secret.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A stored row violates an invariant the schema should have enforced.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// The credential hasher failed.
    #[error("Credential hashing failed: {0}")]
    Hashing(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Builds a `NotFound` error for the given entity name and key.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
