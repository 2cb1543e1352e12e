//! Errors raised by the crate itself.
//!
//! Domain failures travel through [`Outcome`](crate::Outcome); `FlowError` only
//! covers contract violations detected while running steps.

use thiserror::Error;

/// Boxed error alias used for type-erased failure payloads.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Contract violations reported by the step machinery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FlowError {
    /// A step exposes neither a `handle` nor an `execute` capability.
    #[error("step of type {type_name} is not callable and has no handle() or execute() capability")]
    InvalidStep {
        /// Type name of the offending step.
        type_name: &'static str,
    },
}

impl FlowError {
    /// Build an [`FlowError::InvalidStep`] naming `T`.
    pub fn invalid_step<T: ?Sized>() -> Self {
        FlowError::InvalidStep {
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl From<FlowError> for String {
    fn from(err: FlowError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    #[test]
    fn invalid_step_names_type() {
        let err = FlowError::invalid_step::<Widget>();
        assert!(err.to_string().contains("Widget"));
        assert!(err.to_string().contains("handle()"));
    }

    #[test]
    fn converts_into_string_and_box() {
        let s: String = FlowError::invalid_step::<Widget>().into();
        assert!(s.starts_with("step of type"));

        let boxed: BoxError = FlowError::invalid_step::<Widget>().into();
        assert!(boxed.downcast_ref::<FlowError>().is_some());
    }
}
