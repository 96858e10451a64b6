//! Fixture configuration

use crate::error::FixtureError;
use crate::variant::ContextVariant;
use mockcms_builder::DUMMY_TEMPLATE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings shared by every context a manager creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureConfig {
    /// Variant used when nothing more specific is requested or declared
    pub default_variant: ContextVariant,
    /// Directory named payload resources are resolved against
    pub resource_root: PathBuf,
    /// Template for pages created without one
    pub default_page_template: String,
    /// Nodes created during one-time setup
    pub bootstrap_paths: Vec<String>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            default_variant: ContextVariant::default(),
            resource_root: PathBuf::from("."),
            default_page_template: DUMMY_TEMPLATE.to_string(),
            bootstrap_paths: Vec::new(),
        }
    }
}

impl FixtureConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns [`FixtureError::Config`] on malformed TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, FixtureError> {
        Ok(toml::from_str(text)?)
    }

    /// With default variant
    #[inline]
    #[must_use]
    pub fn with_default_variant(mut self, variant: ContextVariant) -> Self {
        self.default_variant = variant;
        self
    }

    /// With resource root
    #[inline]
    #[must_use]
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    /// With default page template
    #[inline]
    #[must_use]
    pub fn with_default_page_template(mut self, template: impl Into<String>) -> Self {
        self.default_page_template = template.into();
        self
    }

    /// Add a node to create during setup
    #[inline]
    #[must_use]
    pub fn with_bootstrap_path(mut self, path: impl Into<String>) -> Self {
        self.bootstrap_paths.push(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FixtureConfig::new();
        assert_eq!(config.default_variant, ContextVariant::ResourceResolverMock);
        assert_eq!(config.default_page_template, "/apps/sample/templates/template1");
        assert!(config.bootstrap_paths.is_empty());
    }

    #[test]
    fn builder_methods() {
        let config = FixtureConfig::new()
            .with_default_variant(ContextVariant::JcrMock)
            .with_resource_root("fixtures")
            .with_default_page_template("/apps/t")
            .with_bootstrap_path("/content")
            .with_bootstrap_path("/content/dam");
        assert_eq!(config.default_variant, ContextVariant::JcrMock);
        assert_eq!(config.resource_root, PathBuf::from("fixtures"));
        assert_eq!(config.default_page_template, "/apps/t");
        assert_eq!(config.bootstrap_paths, vec!["/content", "/content/dam"]);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = FixtureConfig::from_toml_str("default_variant = \"jcr_mock\"\n").unwrap();
        assert_eq!(config.default_variant, ContextVariant::JcrMock);
        assert_eq!(config.default_page_template, DUMMY_TEMPLATE);
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            FixtureConfig::from_toml_str("default_variant = \"osgi\""),
            Err(FixtureError::Config(_))
        ));
        assert!(matches!(
            FixtureConfig::from_toml_str("unknown_key = 1"),
            Err(FixtureError::Config(_))
        ));
    }
}
