//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::identity::TokenError;
use crate::order::OrderError;

/// Errors reported by every use-case.
///
/// Use-cases never swallow failures; each variant reaches the caller as-is.
/// Anything from storage that is not one of the named kinds becomes
/// `Internal` and must not be detailed to external callers.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An error raised by the order lifecycle rules.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Referenced entity is absent (or not visible to the caller).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The email is already bound to a credential.
    #[error("Identity already registered: {email}")]
    DuplicateIdentity { email: String },

    /// Unknown email or wrong secret. The two cases are deliberately identical.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The token service could not sign.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Storage failure outside the named kinds.
    #[error("Internal failure: {0}")]
    Internal(StoreError),
}

/// Coarse classification of a [`DomainError`], used for response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidTransition,
    InvalidStatus,
    DuplicateIdentity,
    InvalidCredentials,
    Internal,
}

impl DomainError {
    /// Builds a `NotFound` error for the given entity name and key.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Order(err) => match err {
                OrderError::NoItems
                | OrderError::InvalidQuantity { .. }
                | OrderError::InvalidPrice { .. }
                | OrderError::TotalOutOfRange => ErrorKind::Validation,
                OrderError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
                OrderError::InvalidStatus(_) => ErrorKind::InvalidStatus,
            },
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::DuplicateIdentity { .. } => ErrorKind::DuplicateIdentity,
            DomainError::InvalidCredentials => ErrorKind::InvalidCredentials,
            DomainError::Token(_) | DomainError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::InvalidTransition { order_id, current } => {
                DomainError::Order(OrderError::InvalidTransition {
                    order_id,
                    current,
                    action: "cancel",
                })
            }
            StoreError::DuplicateIdentity { email } => DomainError::DuplicateIdentity { email },
            StoreError::InvalidCredentials => DomainError::InvalidCredentials,
            other => DomainError::Internal(other),
        }
    }
}
