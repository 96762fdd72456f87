//! Account use-cases: registration, login and the bootstrap admin.

use std::sync::Arc;

use common::{Identity, SubjectId};
use store::{Repository, StoreError, credential};

use crate::error::DomainError;
use crate::identity::TokenService;

/// Registration and login over a [`Repository`], issuing tokens on success.
pub struct AccountService<R: Repository> {
    repo: R,
    tokens: Arc<TokenService>,
}

impl<R: Repository> AccountService<R> {
    pub fn new(repo: R, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    /// Binds a new non-admin credential to `email`, storing a one-way hash
    /// of `secret`.
    #[tracing::instrument(skip(self, secret))]
    pub async fn register(&self, email: &str, secret: &str) -> Result<SubjectId, DomainError> {
        validate_registration(email, secret)?;

        let secret_hash = credential::hash_secret(secret)?;
        let subject_id = self.repo.create_credential(email, &secret_hash).await?;

        tracing::info!(%subject_id, "account registered");
        Ok(subject_id)
    }

    /// Checks the credentials and issues a token.
    ///
    /// An unknown email and a wrong secret both fail with the same
    /// `InvalidCredentials`.
    #[tracing::instrument(skip(self, secret))]
    pub async fn login(&self, email: &str, secret: &str) -> Result<String, DomainError> {
        let identity = match self.repo.verify_credentials(email, secret).await {
            Ok(identity) => identity,
            Err(StoreError::NotFound { .. } | StoreError::InvalidCredentials) => {
                metrics::counter!("logins_failed_total").increment(1);
                tracing::debug!("login rejected");
                return Err(DomainError::InvalidCredentials);
            }
            Err(other) => return Err(DomainError::Internal(other)),
        };

        let token = self.tokens.issue(identity)?;
        tracing::info!(subject = %identity.subject_id, "login succeeded");
        Ok(token)
    }

    /// Makes sure an admin account exists for `email`.
    ///
    /// The account is registered when absent; when present, `secret` must
    /// match it. Either way the subject is granted the admin role.
    #[tracing::instrument(skip(self, secret))]
    pub async fn ensure_admin(&self, email: &str, secret: &str) -> Result<Identity, DomainError> {
        let subject_id = match self.register(email, secret).await {
            Ok(subject_id) => subject_id,
            Err(DomainError::DuplicateIdentity { .. }) => {
                match self.repo.verify_credentials(email, secret).await {
                    Ok(identity) => identity.subject_id,
                    Err(StoreError::NotFound { .. } | StoreError::InvalidCredentials) => {
                        return Err(DomainError::InvalidCredentials);
                    }
                    Err(other) => return Err(DomainError::Internal(other)),
                }
            }
            Err(err) => return Err(err),
        };

        self.repo.grant_admin(subject_id).await?;
        tracing::info!(%subject_id, "admin role granted");
        Ok(Identity::admin(subject_id))
    }
}

fn validate_registration(email: &str, secret: &str) -> Result<(), DomainError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::Validation(format!(
            "email must contain '@': {email:?}"
        )));
    }
    if secret.is_empty() {
        return Err(DomainError::Validation("secret must not be empty".to_string()));
    }
    Ok(())
}
