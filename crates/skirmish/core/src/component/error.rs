use thiserror::Error;

use crate::error::{CoreError, ErrorSeverity};

/// Errors raised by [`ComponentContainer`](super::ComponentContainer) composition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ComponentError {
    #[error("{component} requires {required}, which could not be built: {reason}")]
    RequirementFailed {
        component: &'static str,
        required: &'static str,
        reason: String,
    },

    #[error("requirement cycle: {component} requires {required}, which is already being resolved")]
    RequirementCycle {
        component: &'static str,
        required: &'static str,
    },

    #[error("cannot remove {component}: required by {dependent}")]
    RequiredBy {
        component: &'static str,
        dependent: &'static str,
    },
}

impl CoreError for ComponentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RequirementFailed { .. } | Self::RequirementCycle { .. } => ErrorSeverity::Fatal,
            Self::RequiredBy { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RequirementFailed { .. } => "COMPONENT_REQUIREMENT_FAILED",
            Self::RequirementCycle { .. } => "COMPONENT_REQUIREMENT_CYCLE",
            Self::RequiredBy { .. } => "COMPONENT_REQUIRED_BY",
        }
    }
}

/// A component handler failed while processing an event.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("{component} faulted: {reason}")]
    Fault {
        component: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Component(#[from] ComponentError),
}

impl HandlerError {
    pub fn fault(component: &'static str, reason: impl Into<String>) -> Self {
        Self::Fault {
            component,
            reason: reason.into(),
        }
    }
}

impl CoreError for HandlerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Fault { .. } => ErrorSeverity::Internal,
            Self::Component(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Fault { .. } => "HANDLER_FAULT",
            Self::Component(err) => err.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_component_error_keeps_classification() {
        let err = HandlerError::from(ComponentError::RequiredBy {
            component: "health",
            dependent: "regen",
        });
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "COMPONENT_REQUIRED_BY");
        assert_eq!(err.to_string(), "cannot remove health: required by regen");
    }

    #[test]
    fn fault_is_internal() {
        let err = HandlerError::fault("attack", "no opponent");
        assert!(err.severity().is_internal());
    }
}
