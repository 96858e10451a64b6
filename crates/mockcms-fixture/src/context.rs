//! Fixture context and its lifecycle
//!
//! A context moves `Uninitialized → Active → TornDown` and never returns to
//! `Active`. Content access is only allowed while active.

use crate::config::FixtureConfig;
use crate::error::FixtureError;
use crate::variant::{ContextType, ContextVariant};
use mockcms_builder::{AssetManager, ContentBuilder, ContentError};
use mockcms_store::MemoryStore;
use parking_lot::Mutex;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Lifecycle state of a fixture context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Constructed, setup not run yet
    Uninitialized,
    /// Set up and usable
    Active,
    /// Torn down; terminal
    TornDown,
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::TornDown => "torn-down",
        })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: LifecycleState) -> &'static [LifecycleState] {
    use LifecycleState::{Active, TornDown, Uninitialized};
    match from {
        Uninitialized => &[Active, TornDown],
        Active => &[TornDown],
        TornDown => &[],
    }
}

/// Check a single transition
#[must_use]
pub fn is_allowed(from: LifecycleState, to: LifecycleState) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Per-invocation test environment
///
/// Owns the content store of its variant (if any). Shared through `Arc` by
/// the manager and the invocation it belongs to.
#[derive(Debug)]
pub struct FixtureContext {
    variant: ContextVariant,
    store: Option<MemoryStore>,
    resource_root: PathBuf,
    page_template: String,
    bootstrap_paths: Vec<String>,
    state: Mutex<LifecycleState>,
}

impl FixtureContext {
    /// Create an unset-up context
    #[must_use]
    pub fn new(variant: ContextVariant, store: Option<MemoryStore>, config: &FixtureConfig) -> Self {
        Self {
            variant,
            store,
            resource_root: config.resource_root.clone(),
            page_template: config.default_page_template.clone(),
            bootstrap_paths: config.bootstrap_paths.clone(),
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> ContextVariant {
        self.variant
    }

    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.variant.type_name()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// Whether this variant carries a content store
    #[inline]
    #[must_use]
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Check if this context can be handed out for `requested`
    #[inline]
    #[must_use]
    pub fn satisfies(&self, requested: ContextType) -> bool {
        requested.is_satisfied_by(self.variant)
    }

    /// Content store of this context
    ///
    /// # Errors
    /// Returns [`FixtureError::LifecycleViolation`] unless active and
    /// [`FixtureError::StoreUnavailable`] for variants without a store
    pub fn store(&self) -> Result<&MemoryStore, FixtureError> {
        self.ensure_active("access content of")?;
        self.store.as_ref().ok_or(FixtureError::StoreUnavailable {
            variant: self.variant,
        })
    }

    /// Content builder over this context's store
    ///
    /// # Errors
    /// See [`FixtureContext::store`]
    pub fn create(&self) -> Result<ContentBuilder<'_>, FixtureError> {
        let store = self.store()?;
        Ok(ContentBuilder::new(store)
            .with_resource_root(self.resource_root.clone())
            .with_default_template(self.page_template.clone()))
    }

    /// Asset manager over this context's store
    ///
    /// # Errors
    /// See [`FixtureContext::store`]
    pub fn asset_manager(&self) -> Result<AssetManager<'_>, FixtureError> {
        self.create().map(AssetManager::new)
    }

    /// Run one-time setup: create bootstrap nodes and commit
    pub(crate) fn set_up(&self) -> Result<(), FixtureError> {
        let mut state = self.state.lock();
        self.check_transition(*state, LifecycleState::Active, "set up")?;

        if let Some(store) = &self.store {
            self.bootstrap(store).map_err(|source| FixtureError::Setup {
                variant: self.variant,
                source,
            })?;
        } else if !self.bootstrap_paths.is_empty() {
            tracing::debug!(variant = %self.variant, "no store, skipping bootstrap paths");
        }

        *state = LifecycleState::Active;
        tracing::debug!(variant = %self.variant, "fixture context set up");
        Ok(())
    }

    /// Release the store; terminal
    pub(crate) fn tear_down(&self) -> Result<(), FixtureError> {
        let mut state = self.state.lock();
        self.check_transition(*state, LifecycleState::TornDown, "tear down")?;
        if let Some(store) = &self.store {
            store.close();
        }
        *state = LifecycleState::TornDown;
        tracing::debug!(variant = %self.variant, "fixture context torn down");
        Ok(())
    }

    fn bootstrap(&self, store: &MemoryStore) -> Result<(), ContentError> {
        let builder = ContentBuilder::new(store);
        for path in &self.bootstrap_paths {
            builder.ensure_resource(path)?;
        }
        builder.commit()
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), FixtureError> {
        let state = self.state();
        if state == LifecycleState::Active {
            Ok(())
        } else {
            Err(self.violation(state, operation))
        }
    }

    fn check_transition(
        &self,
        from: LifecycleState,
        to: LifecycleState,
        operation: &'static str,
    ) -> Result<(), FixtureError> {
        if is_allowed(from, to) {
            Ok(())
        } else {
            Err(self.violation(from, operation))
        }
    }

    fn violation(&self, state: LifecycleState, operation: &'static str) -> FixtureError {
        FixtureError::LifecycleViolation {
            fixture: self.type_name().to_string(),
            state,
            operation,
        }
    }
}
