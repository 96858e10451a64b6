//! Asset-manager view over the content builder

use crate::builder::ContentBuilder;
use crate::error::ContentError;
use crate::source::PayloadSource;
use mockcms_store::{Asset, ContentPath, ResourceStore};
use std::io::Read;

/// Creates and looks up assets, leaving the commit decision to the caller
#[derive(Debug, Clone)]
pub struct AssetManager<'s> {
    builder: ContentBuilder<'s>,
}

impl<'s> AssetManager<'s> {
    /// Wrap a builder
    #[must_use]
    pub fn new(builder: ContentBuilder<'s>) -> Self {
        Self { builder }
    }

    /// Create an asset from a stream
    ///
    /// With `auto_save` unset the asset stays in the working tree until the
    /// store is committed.
    ///
    /// # Errors
    /// Returns [`ContentError::AssetCreation`] if the stream fails or the
    /// store rejects a node
    pub fn create_asset<'a>(
        &self,
        path: &str,
        reader: impl Read + 'a,
        mime_type: &str,
        auto_save: bool,
    ) -> Result<Asset<'s>, ContentError> {
        self.builder
            .create_asset(path, PayloadSource::reader(reader), mime_type, None, auto_save)
    }

    /// Asset at `path`, if one exists
    ///
    /// # Errors
    /// Returns error if the path is malformed or the store fails
    pub fn asset(&self, path: &str) -> Result<Option<Asset<'s>>, ContentError> {
        let path: ContentPath = path.parse()?;
        let store: &'s dyn ResourceStore = self.builder.store();
        match store.get(&path)? {
            Some(_) => Ok(Asset::load(store, &path).ok()),
            None => Ok(None),
        }
    }
}
