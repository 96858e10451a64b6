//! Fixture lifecycle management
//!
//! Hands each test invocation its own [`FixtureContext`], selecting the
//! context variant from the requested type, the invocation's declared
//! parameters or the configured default. Contexts are set up once and torn
//! down exactly once, even when the test body panics.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod context;
mod error;
mod manager;
mod variant;

pub use config::FixtureConfig;
pub use context::{allowed_transitions, is_allowed, FixtureContext, LifecycleState};
pub use error::FixtureError;
pub use manager::{FixtureManager, Invocation, InvocationKey, InvocationScope};
pub use variant::{
    select_variant, ContextConstructor, ContextType, ContextVariant, ParameterDecl, VariantRegistry,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
