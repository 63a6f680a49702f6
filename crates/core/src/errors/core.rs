use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for convention-based registration
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Ambiguous {marker} implementation '{implementation}': implements {} marker interfaces ({})",
        .candidates.len(),
        .candidates.join(", ")
    )]
    AmbiguousMarkerImplementation {
        implementation: String,
        marker: String,
        candidates: Vec<String>,
    },

    #[error("Unable to load module '{module}' referenced by '{referenced_by}': {reason}")]
    UnresolvableReferencedModule {
        module: String,
        referenced_by: String,
        reason: String,
    },

    #[error("Service not found: {service_type}")]
    ServiceNotFound { service_type: String },

    #[error("Required binding missing after auto-resolve: {service_type}")]
    RequiredBindingMissing { service_type: String },

    #[error("Service '{service_type}' has no activator for implementation '{implementation}'")]
    ServiceActivationFailed {
        service_type: String,
        implementation: String,
    },

    #[error("Service '{service_type}' cannot be resolved as '{requested}'")]
    ServiceTypeMismatch {
        service_type: String,
        requested: String,
    },

    #[error("Invalid service scope: {scope}")]
    InvalidServiceScope { scope: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },
}

impl CoreError {
    /// Create a new ambiguity error
    pub fn ambiguous(
        implementation: impl Into<String>,
        marker: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        Self::AmbiguousMarkerImplementation {
            implementation: implementation.into(),
            marker: marker.into(),
            candidates,
        }
    }

    /// Create a new unresolvable module error
    pub fn unresolvable_module(
        module: impl Into<String>,
        referenced_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnresolvableReferencedModule {
            module: module.into(),
            referenced_by: referenced_by.into(),
            reason: reason.into(),
        }
    }

    /// Create a new service not found error
    pub fn service_not_found(service_type: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_type: service_type.into(),
        }
    }

    /// Create a new lock error
    pub fn lock_error(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Create an activation error for `implementation` exposed as `service_type`
    pub fn activation_failed(
        service_type: impl Into<String>,
        implementation: impl Into<String>,
    ) -> Self {
        Self::ServiceActivationFailed {
            service_type: service_type.into(),
            implementation: implementation.into(),
        }
    }

    /// Check if the error is a service lookup error
    pub fn is_service(&self) -> bool {
        matches!(
            self,
            Self::ServiceNotFound { .. } | Self::RequiredBindingMissing { .. }
        )
    }

    /// Check if the error was raised while classifying types
    pub fn is_discovery(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousMarkerImplementation { .. }
                | Self::UnresolvableReferencedModule { .. }
                | Self::ServiceActivationFailed { .. }
        )
    }

    /// Stable code identifying the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIG_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::AmbiguousMarkerImplementation { .. } => "AMBIGUOUS_MARKER_IMPLEMENTATION",
            Self::UnresolvableReferencedModule { .. } => "UNRESOLVABLE_REFERENCED_MODULE",
            Self::ServiceNotFound { .. } => "SERVICE_NOT_FOUND",
            Self::RequiredBindingMissing { .. } => "REQUIRED_BINDING_MISSING",
            Self::ServiceActivationFailed { .. } => "SERVICE_ACTIVATION_FAILED",
            Self::ServiceTypeMismatch { .. } => "SERVICE_TYPE_MISMATCH",
            Self::InvalidServiceScope { .. } => "INVALID_SERVICE_SCOPE",
            Self::LockError { .. } => "LOCK_ERROR",
        }
    }
}

/// Serializable form of a diagnosed error, used in scan reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
}

impl From<&CoreError> for Diagnostic {
    fn from(error: &CoreError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}
