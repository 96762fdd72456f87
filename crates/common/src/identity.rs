use serde::{Deserialize, Serialize};

use crate::SubjectId;

/// The claim set attached to an authenticated request.
///
/// Produced by credential verification or by a valid bearer token. It is
/// never persisted and lives only as long as the request it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: SubjectId,
    pub is_admin: bool,
}

impl Identity {
    /// Creates a non-admin identity.
    pub fn customer(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            is_admin: false,
        }
    }

    /// Creates an admin identity.
    pub fn admin(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            is_admin: true,
        }
    }

    /// Returns true if this identity may act on a resource owned by `owner`.
    pub fn can_access(&self, owner: SubjectId) -> bool {
        self.is_admin || self.subject_id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_can_access_own_resource() {
        let identity = Identity::customer(SubjectId::new(1));
        assert!(identity.can_access(SubjectId::new(1)));
        assert!(!identity.can_access(SubjectId::new(2)));
    }

    #[test]
    fn admin_can_access_any_resource() {
        let identity = Identity::admin(SubjectId::new(1));
        assert!(identity.can_access(SubjectId::new(2)));
    }
}
