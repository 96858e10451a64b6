//! Fixture lifecycle manager
//!
//! Binds one [`FixtureContext`] to each test invocation: created and set up
//! on first resolution, shared on later ones, torn down exactly once.

use crate::config::FixtureConfig;
use crate::context::{FixtureContext, LifecycleState};
use crate::error::FixtureError;
use crate::variant::{select_variant, ContextType, ParameterDecl, VariantRegistry};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Identity of one test invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvocationKey(String);

impl InvocationKey {
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InvocationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvocationKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for InvocationKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A test invocation: its key and declared parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    key: InvocationKey,
    parameters: Vec<ParameterDecl>,
}

impl Invocation {
    #[must_use]
    pub fn new(key: impl Into<InvocationKey>) -> Self {
        Self {
            key: key.into(),
            parameters: Vec::new(),
        }
    }

    /// With an additional declared parameter
    #[inline]
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &InvocationKey {
        &self.key
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDecl] {
        &self.parameters
    }
}

/// Registry of live fixture contexts keyed by invocation
///
/// Safe to share between test threads; each invocation only touches its own
/// entry.
#[derive(Debug)]
pub struct FixtureManager {
    registry: VariantRegistry,
    config: FixtureConfig,
    contexts: DashMap<InvocationKey, Arc<FixtureContext>>,
    retired: DashSet<InvocationKey>,
}

impl FixtureManager {
    /// Manager with the built-in variants
    #[must_use]
    pub fn new(config: FixtureConfig) -> Self {
        Self::with_registry(VariantRegistry::with_defaults(), config)
    }

    #[must_use]
    pub fn with_registry(registry: VariantRegistry, config: FixtureConfig) -> Self {
        Self {
            registry,
            config,
            contexts: DashMap::new(),
            retired: DashSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Whether this manager resolves the given parameter
    #[inline]
    #[must_use]
    pub fn supports_parameter(&self, parameter: &ParameterDecl) -> bool {
        matches!(parameter, ParameterDecl::Context(_))
    }

    /// Context bound to `invocation`, creating and setting it up on first use
    ///
    /// # Errors
    /// - [`FixtureError::TypeMismatch`] if the bound context does not satisfy
    ///   `requested`
    /// - [`FixtureError::LifecycleViolation`] if the invocation was torn down
    /// - [`FixtureError::UnknownVariant`] or [`FixtureError::Setup`] if the
    ///   context cannot be created
    pub fn resolve(
        &self,
        requested: ContextType,
        invocation: &Invocation,
    ) -> Result<Arc<FixtureContext>, FixtureError> {
        let key = invocation.key();
        if self.retired.contains(key) {
            return Err(retired(key));
        }

        match self.contexts.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let context = Arc::clone(entry.get());
                if context.satisfies(requested) {
                    Ok(context)
                } else {
                    tracing::warn!(
                        %key,
                        stored = context.type_name(),
                        requested = requested.type_name(),
                        "fixture context type mismatch"
                    );
                    Err(FixtureError::TypeMismatch {
                        stored: context.type_name(),
                        requested: requested.type_name(),
                    })
                }
            }
            // the key may have been retired since the check above
            Entry::Vacant(_) if self.retired.contains(key) => Err(retired(key)),
            Entry::Vacant(entry) => {
                let context = Arc::new(self.create_context(requested, invocation)?);
                entry.insert(Arc::clone(&context));
                tracing::info!(%key, variant = %context.variant(), "fixture context created");
                Ok(context)
            }
        }
    }

    /// Tear down the context bound to `key`; no-op if there is none
    ///
    /// The key is retired before its entry is removed. Only the caller that
    /// removes the entry runs the context's teardown.
    ///
    /// # Errors
    /// Returns error if the context refuses the transition
    pub fn teardown(&self, key: &InvocationKey) -> Result<(), FixtureError> {
        if !self.contexts.contains_key(key) {
            return Ok(());
        }
        self.retired.insert(key.clone());
        let Some((_, context)) = self.contexts.remove(key) else {
            return Ok(());
        };
        tracing::info!(%key, variant = %context.variant(), "fixture context removed");
        context.tear_down()
    }

    /// Open a scope that tears the invocation down when dropped
    #[must_use]
    pub fn scope(&self, invocation: Invocation) -> InvocationScope<'_> {
        InvocationScope {
            manager: self,
            invocation,
        }
    }

    /// Number of live contexts
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.contexts.len()
    }

    /// Whether a live context is bound to `key`
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &InvocationKey) -> bool {
        self.contexts.contains_key(key)
    }

    fn create_context(
        &self,
        requested: ContextType,
        invocation: &Invocation,
    ) -> Result<FixtureContext, FixtureError> {
        let variant = select_variant(requested, invocation.parameters(), self.config.default_variant);
        let constructor = self
            .registry
            .get(variant)
            .ok_or(FixtureError::UnknownVariant(variant))?;
        let context = constructor(&self.config);
        if let Err(err) = context.set_up() {
            tracing::warn!(key = %invocation.key(), %variant, error = %err, "fixture setup failed");
            return Err(err);
        }
        Ok(context)
    }
}

fn retired(key: &InvocationKey) -> FixtureError {
    FixtureError::LifecycleViolation {
        fixture: key.to_string(),
        state: LifecycleState::TornDown,
        operation: "resolve",
    }
}

impl Default for FixtureManager {
    fn default() -> Self {
        Self::new(FixtureConfig::default())
    }
}

/// Scope of one test invocation
///
/// Dropping the scope tears the invocation down, including during a panic
/// unwind out of the test body.
#[derive(Debug)]
pub struct InvocationScope<'m> {
    manager: &'m FixtureManager,
    invocation: Invocation,
}

impl InvocationScope<'_> {
    /// Resolve a context parameter for this invocation
    ///
    /// # Errors
    /// See [`FixtureManager::resolve`]
    pub fn resolve(&self, requested: ContextType) -> Result<Arc<FixtureContext>, FixtureError> {
        self.manager.resolve(requested, &self.invocation)
    }

    #[inline]
    #[must_use]
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Tear down now and report the outcome
    ///
    /// # Errors
    /// See [`FixtureManager::teardown`]
    pub fn finish(self) -> Result<(), FixtureError> {
        self.manager.teardown(self.invocation.key())
    }
}

impl Drop for InvocationScope<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.manager.teardown(self.invocation.key()) {
            tracing::warn!(key = %self.invocation.key(), error = %err, "fixture teardown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::ContextVariant;

    #[test]
    fn supports_only_context_parameters() {
        let manager = FixtureManager::default();
        assert!(manager.supports_parameter(&ParameterDecl::Context(ContextType::Base)));
        assert!(manager.supports_parameter(&ParameterDecl::Context(ContextVariant::JcrMock.into())));
        assert!(!manager.supports_parameter(&ParameterDecl::Other("tempdir")));
    }

    #[test]
    fn unknown_variant() {
        let mut registry = VariantRegistry::with_defaults();
        registry.remove(ContextVariant::JcrMock);
        let manager = FixtureManager::with_registry(registry, FixtureConfig::default());
        let err = manager
            .resolve(ContextVariant::JcrMock.into(), &Invocation::new("t"))
            .unwrap_err();
        assert!(matches!(err, FixtureError::UnknownVariant(ContextVariant::JcrMock)));
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn failed_setup_stores_nothing() {
        let config = FixtureConfig::default().with_bootstrap_path("not/absolute");
        let manager = FixtureManager::new(config);
        let invocation = Invocation::new("t");
        assert!(matches!(
            manager.resolve(ContextType::Base, &invocation),
            Err(FixtureError::Setup { .. })
        ));
        assert!(!manager.contains(invocation.key()));
    }

    #[test]
    fn finish_then_drop_tears_down_once() {
        let manager = FixtureManager::default();
        let scope = manager.scope(Invocation::new("t"));
        let context = scope.resolve(ContextType::Base).unwrap();
        scope.finish().unwrap();
        assert_eq!(context.state(), LifecycleState::TornDown);
        assert_eq!(manager.active_count(), 0);
    }
}
