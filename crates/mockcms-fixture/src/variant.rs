//! Context variants and the variant registry
//!
//! Provides [`ContextVariant`], [`ContextType`] and [`VariantRegistry`] for
//! mapping a requested context type to a constructor.

use crate::config::FixtureConfig;
use crate::context::FixtureContext;
use indexmap::IndexMap;
use mockcms_store::{MemoryStore, StoreFlavor};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Concrete fixture context flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextVariant {
    /// Permissive in-memory store (default)
    #[default]
    ResourceResolverMock,

    /// In-memory store enforcing node-type constraints
    JcrMock,

    /// No content store at all
    NoResourceResolver,
}

impl ContextVariant {
    /// All variants
    pub const ALL: [Self; 3] = [Self::ResourceResolverMock, Self::JcrMock, Self::NoResourceResolver];

    /// Type name used in diagnostics
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::ResourceResolverMock => "ResourceResolverMockContext",
            Self::JcrMock => "JcrMockContext",
            Self::NoResourceResolver => "NoResourceResolverContext",
        }
    }

    /// Store flavour backing this variant, `None` if it has no store
    #[must_use]
    pub fn store_flavor(self) -> Option<StoreFlavor> {
        match self {
            Self::ResourceResolverMock => Some(StoreFlavor::Permissive),
            Self::JcrMock => Some(StoreFlavor::Structured),
            Self::NoResourceResolver => None,
        }
    }
}

impl Display for ContextVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Context type a parameter or lifecycle step asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    /// Any context; the variant is inferred
    Base,

    /// One specific variant
    Variant(ContextVariant),
}

impl ContextType {
    /// Check if a context of `variant` can be handed out for this type
    #[inline]
    #[must_use]
    pub fn is_satisfied_by(self, variant: ContextVariant) -> bool {
        match self {
            Self::Base => true,
            Self::Variant(wanted) => wanted == variant,
        }
    }

    /// Type name used in diagnostics
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Base => "FixtureContext",
            Self::Variant(variant) => variant.type_name(),
        }
    }
}

impl From<ContextVariant> for ContextType {
    fn from(variant: ContextVariant) -> Self {
        Self::Variant(variant)
    }
}

/// Declared parameter of a test invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterDecl {
    /// A fixture context parameter
    Context(ContextType),

    /// Anything else, left to other resolvers
    Other(&'static str),
}

impl ParameterDecl {
    /// Concrete variant this parameter declares, if any
    #[inline]
    #[must_use]
    pub fn concrete_variant(&self) -> Option<ContextVariant> {
        match self {
            Self::Context(ContextType::Variant(variant)) => Some(*variant),
            Self::Context(ContextType::Base) | Self::Other(_) => None,
        }
    }
}

/// Pick the variant to construct for `requested`
///
/// A concrete request wins. For [`ContextType::Base`] the first concrete
/// context type among `parameters` is used, else `default`.
#[must_use]
pub fn select_variant(
    requested: ContextType,
    parameters: &[ParameterDecl],
    default: ContextVariant,
) -> ContextVariant {
    match requested {
        ContextType::Variant(variant) => variant,
        ContextType::Base => parameters
            .iter()
            .find_map(ParameterDecl::concrete_variant)
            .unwrap_or(default),
    }
}

/// Builds an unset-up context of one variant
pub type ContextConstructor = fn(&FixtureConfig) -> FixtureContext;

/// Table of constructors per variant
#[derive(Clone, Default)]
pub struct VariantRegistry {
    constructors: IndexMap<ContextVariant, ContextConstructor>,
}

impl VariantRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with constructors for every built-in variant
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ContextVariant::ResourceResolverMock, resource_resolver_mock);
        registry.register(ContextVariant::JcrMock, jcr_mock);
        registry.register(ContextVariant::NoResourceResolver, no_resource_resolver);
        registry
    }

    /// Register or replace the constructor for `variant`
    pub fn register(&mut self, variant: ContextVariant, constructor: ContextConstructor) {
        self.constructors.insert(variant, constructor);
    }

    /// Remove the constructor for `variant`
    pub fn remove(&mut self, variant: ContextVariant) -> bool {
        self.constructors.shift_remove(&variant).is_some()
    }

    /// Constructor for `variant`
    #[inline]
    #[must_use]
    pub fn get(&self, variant: ContextVariant) -> Option<ContextConstructor> {
        self.constructors.get(&variant).copied()
    }

    /// Check if a constructor is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, variant: ContextVariant) -> bool {
        self.constructors.contains_key(&variant)
    }

    /// Registered variants in registration order
    pub fn variants(&self) -> impl Iterator<Item = ContextVariant> + '_ {
        self.constructors.keys().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for VariantRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

fn resource_resolver_mock(config: &FixtureConfig) -> FixtureContext {
    FixtureContext::new(
        ContextVariant::ResourceResolverMock,
        Some(MemoryStore::new(StoreFlavor::Permissive)),
        config,
    )
}

fn jcr_mock(config: &FixtureConfig) -> FixtureContext {
    FixtureContext::new(
        ContextVariant::JcrMock,
        Some(MemoryStore::new(StoreFlavor::Structured)),
        config,
    )
}

fn no_resource_resolver(config: &FixtureConfig) -> FixtureContext {
    FixtureContext::new(ContextVariant::NoResourceResolver, None, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_is_satisfied_by_every_variant() {
        for variant in ContextVariant::ALL {
            assert!(ContextType::Base.is_satisfied_by(variant));
            assert!(ContextType::Variant(variant).is_satisfied_by(variant));
        }
        assert!(!ContextType::Variant(ContextVariant::JcrMock)
            .is_satisfied_by(ContextVariant::ResourceResolverMock));
    }

    #[test]
    fn select_concrete_request() {
        let selected = select_variant(
            ContextVariant::JcrMock.into(),
            &[ParameterDecl::Context(ContextVariant::NoResourceResolver.into())],
            ContextVariant::ResourceResolverMock,
        );
        assert_eq!(selected, ContextVariant::JcrMock);
    }

    #[test]
    fn select_base_uses_first_concrete_parameter() {
        let params = [
            ParameterDecl::Other("tempdir"),
            ParameterDecl::Context(ContextType::Base),
            ParameterDecl::Context(ContextVariant::JcrMock.into()),
            ParameterDecl::Context(ContextVariant::NoResourceResolver.into()),
        ];
        assert_eq!(
            select_variant(ContextType::Base, &params, ContextVariant::ResourceResolverMock),
            ContextVariant::JcrMock
        );
    }

    #[test]
    fn select_base_falls_back_to_default() {
        let params = [ParameterDecl::Context(ContextType::Base), ParameterDecl::Other("x")];
        assert_eq!(
            select_variant(ContextType::Base, &params, ContextVariant::NoResourceResolver),
            ContextVariant::NoResourceResolver
        );
        assert_eq!(
            select_variant(ContextType::Base, &[], ContextVariant::ResourceResolverMock),
            ContextVariant::ResourceResolverMock
        );
    }

    #[test]
    fn registry_defaults_and_remove() {
        let mut registry = VariantRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert!(ContextVariant::ALL.iter().all(|v| registry.contains(*v)));

        assert!(registry.remove(ContextVariant::JcrMock));
        assert!(!registry.remove(ContextVariant::JcrMock));
        assert!(registry.get(ContextVariant::JcrMock).is_none());
        assert_eq!(
            registry.variants().collect::<Vec<_>>(),
            vec![ContextVariant::ResourceResolverMock, ContextVariant::NoResourceResolver]
        );
        assert!(VariantRegistry::new().is_empty());
    }

    #[test]
    fn default_constructors_pick_store_flavour() {
        let registry = VariantRegistry::with_defaults();
        let config = FixtureConfig::default();
        for variant in ContextVariant::ALL {
            let ctor = registry.get(variant).unwrap();
            let context = ctor(&config);
            assert_eq!(context.variant(), variant);
            assert_eq!(context.has_store(), variant.store_flavor().is_some());
        }
    }
}
