//! Caller-facing error taxonomy.
//!
//! One variant per outcome kind. The repository facade is the single
//! translation boundary: nothing above it ever sees a store-specific
//! failure type.

use thiserror::Error;
use uuid::Uuid;

use crate::types::InstanceStatus;

pub type Result<T> = std::result::Result<T, MetaGraphError>;

#[derive(Debug, Error)]
pub enum MetaGraphError {
    #[error("invalid parameter {parameter}: {message}")]
    InvalidParameter { parameter: String, message: String },

    #[error("entity not known: {guid}")]
    EntityNotKnown { guid: Uuid },

    #[error("entity {guid} is only known as a proxy")]
    EntityProxyOnly { guid: Uuid },

    #[error("relationship not known: {guid}")]
    RelationshipNotKnown { guid: Uuid },

    #[error("classification {classification} on element {element}: {message}")]
    ClassificationError {
        element: Uuid,
        classification: String,
        message: String,
    },

    #[error("property {property}: {message}")]
    PropertyError { property: String, message: String },

    #[error("type {type_name}: {message}")]
    TypeError { type_name: String, message: String },

    #[error("status {status} is not supported for type {type_name}")]
    StatusNotSupported {
        type_name: String,
        status: InstanceStatus,
    },

    #[error("entity {guid} is not deleted")]
    EntityNotDeleted { guid: Uuid },

    #[error("relationship {guid} is not deleted")]
    RelationshipNotDeleted { guid: Uuid },

    #[error("function not supported: {operation}")]
    FunctionNotSupported { operation: String },

    #[error("{actor} is not authorized to {operation}")]
    UserNotAuthorized { actor: String, operation: String },

    #[error("repository error during {operation}: {source}")]
    RepositoryError {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("store unreachable during {operation}: {source}")]
    StoreUnreachable {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid paging (start_from={start_from}, page_size={page_size}): {message}")]
    PagingError {
        start_from: usize,
        page_size: usize,
        message: String,
    },
}

impl MetaGraphError {
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Stable kind discriminator for logging and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::EntityNotKnown { .. } => "entity_not_known",
            Self::EntityProxyOnly { .. } => "entity_proxy_only",
            Self::RelationshipNotKnown { .. } => "relationship_not_known",
            Self::ClassificationError { .. } => "classification_error",
            Self::PropertyError { .. } => "property_error",
            Self::TypeError { .. } => "type_error",
            Self::StatusNotSupported { .. } => "status_not_supported",
            Self::EntityNotDeleted { .. } => "entity_not_deleted",
            Self::RelationshipNotDeleted { .. } => "relationship_not_deleted",
            Self::FunctionNotSupported { .. } => "function_not_supported",
            Self::UserNotAuthorized { .. } => "user_not_authorized",
            Self::RepositoryError { .. } => "repository_error",
            Self::StoreUnreachable { .. } => "store_unreachable",
            Self::PagingError { .. } => "paging_error",
        }
    }

    /// Transient failures a caller may sensibly retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RepositoryError { .. } | Self::StoreUnreachable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_entity_not_known() {
        let guid = Uuid::new_v4();
        let e = MetaGraphError::EntityNotKnown { guid };
        assert_eq!(e.to_string(), format!("entity not known: {guid}"));
    }

    #[test]
    fn display_invalid_parameter() {
        let e = MetaGraphError::invalid_parameter("page_size", "must be positive");
        assert_eq!(
            e.to_string(),
            "invalid parameter page_size: must be positive"
        );
    }

    #[test]
    fn display_status_not_supported() {
        let e = MetaGraphError::StatusNotSupported {
            type_name: "glossary_term".into(),
            status: InstanceStatus::Prepared,
        };
        assert_eq!(
            e.to_string(),
            "status prepared is not supported for type glossary_term"
        );
    }

    #[test]
    fn kind_is_stable() {
        assert_eq!(
            MetaGraphError::EntityNotDeleted {
                guid: Uuid::new_v4()
            }
            .kind(),
            "entity_not_deleted"
        );
        assert_eq!(
            MetaGraphError::FunctionNotSupported {
                operation: "neighborhood".into()
            }
            .kind(),
            "function_not_supported"
        );
        assert_eq!(
            MetaGraphError::RepositoryError {
                operation: "get-element".into(),
                source: anyhow::anyhow!("boom"),
            }
            .kind(),
            "repository_error"
        );
    }

    #[test]
    fn only_store_failures_are_retryable() {
        assert!(MetaGraphError::RepositoryError {
            operation: "x".into(),
            source: anyhow::anyhow!("conflict"),
        }
        .is_retryable());
        assert!(MetaGraphError::StoreUnreachable {
            operation: "x".into(),
            source: anyhow::anyhow!("down"),
        }
        .is_retryable());
        assert!(!MetaGraphError::EntityNotKnown {
            guid: Uuid::new_v4()
        }
        .is_retryable());
    }
}
