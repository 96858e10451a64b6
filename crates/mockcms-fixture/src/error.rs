//! Error types for fixture lifecycle management

use crate::context::LifecycleState;
use crate::variant::ContextVariant;
use mockcms_builder::ContentError;

/// Fixture lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// A context of another type is already bound to the invocation
    #[error(
        "found fixture context of type {stored}, required is {requested}; \
         all lifecycle steps of one invocation must request the same context type"
    )]
    TypeMismatch {
        stored: &'static str,
        requested: &'static str,
    },

    /// Operation not allowed in the current lifecycle state
    #[error("cannot {operation} fixture {fixture} in state {state}")]
    LifecycleViolation {
        fixture: String,
        state: LifecycleState,
        operation: &'static str,
    },

    /// Construction or one-time setup failed
    #[error("could not create {variant} context")]
    Setup {
        variant: ContextVariant,
        #[source]
        source: ContentError,
    },

    /// No constructor registered for the variant
    #[error("no constructor registered for variant {0}")]
    UnknownVariant(ContextVariant),

    /// The variant runs without a content store
    #[error("{variant} context has no content store")]
    StoreUnavailable { variant: ContextVariant },

    /// Malformed configuration
    #[error("invalid fixture configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl FixtureError {
    /// Check if this is a type mismatch between lifecycle steps
    #[inline]
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}
