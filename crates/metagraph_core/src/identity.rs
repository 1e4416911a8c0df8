//! Caller identity.
//!
//! Every handler and facade call takes `&CallerIdentity` explicitly —
//! there is no implicit or thread-local identity anywhere in the core.
//! Authentication happens outside; the core receives a pre-validated
//! identity.

use crate::error::MetaGraphError;

#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub actor_id: String,
    pub roles: Vec<String>,
    pub tenancy: Option<String>,
}

impl CallerIdentity {
    pub fn new(actor_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            roles,
            tenancy: None,
        }
    }

    pub fn with_tenancy(mut self, tenancy: impl Into<String>) -> Self {
        self.tenancy = Some(tenancy.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    pub fn require_admin(&self, operation: &str) -> Result<(), MetaGraphError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(MetaGraphError::UserNotAuthorized {
                actor: self.actor_id.clone(),
                operation: operation.to_string(),
            })
        }
    }
}
