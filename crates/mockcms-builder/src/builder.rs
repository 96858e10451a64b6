//! Content builder
//!
//! Creates nodes, pages, assets and renditions with as little boilerplate as
//! possible. Missing ancestors are created as `nt:unstructured` nodes.

use crate::error::{AssetFailure, ContentError};
use crate::image::read_dimensions;
use crate::source::PayloadSource;
use mockcms_store::{
    kind_properties, Asset, ContentPath, Node, NodeKind, Page, PathError, Properties, Rendition,
    ResourceStore, StoreError, JCR_CONTENT, METADATA_FOLDER, ORIGINAL_FILE, PN_TITLE,
    RENDITIONS_FOLDER, TIFF_IMAGELENGTH, TIFF_IMAGEWIDTH,
};
use std::path::{Path, PathBuf};

/// Template used when a page is created without one
pub const DUMMY_TEMPLATE: &str = "/apps/sample/templates/template1";

/// Node paths of one asset
#[derive(Debug)]
struct AssetLayout {
    root: ContentPath,
    content: ContentPath,
    renditions: ContentPath,
    metadata: ContentPath,
    original: ContentPath,
}

impl AssetLayout {
    fn new(root: ContentPath) -> Result<Self, PathError> {
        let content = root.child(JCR_CONTENT)?;
        let renditions = content.child(RENDITIONS_FOLDER)?;
        Ok(Self {
            metadata: content.child(METADATA_FOLDER)?,
            original: renditions.child(ORIGINAL_FILE)?,
            root,
            content,
            renditions,
        })
    }
}

/// Builds test content in a [`ResourceStore`]
#[derive(Debug, Clone)]
pub struct ContentBuilder<'s> {
    store: &'s dyn ResourceStore,
    resource_root: PathBuf,
    default_template: String,
}

impl<'s> ContentBuilder<'s> {
    /// Create a builder writing to `store`
    #[must_use]
    pub fn new(store: &'s dyn ResourceStore) -> Self {
        Self {
            store,
            resource_root: PathBuf::from("."),
            default_template: DUMMY_TEMPLATE.to_string(),
        }
    }

    /// Directory that [`PayloadSource::Resource`] paths are resolved against
    #[inline]
    #[must_use]
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    /// Template used by [`ContentBuilder::page`]
    #[inline]
    #[must_use]
    pub fn with_default_template(mut self, template: impl Into<String>) -> Self {
        self.default_template = template.into();
        self
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &'s dyn ResourceStore {
        self.store
    }

    /// Resource root for named payloads
    #[inline]
    #[must_use]
    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    /// Persist pending changes
    ///
    /// # Errors
    /// Returns error if the store cannot commit
    pub fn commit(&self) -> Result<(), ContentError> {
        Ok(self.store.commit()?)
    }

    /// Create every missing ancestor of `path` as an unstructured node
    ///
    /// Existing ancestors are left untouched; the node itself is not created.
    ///
    /// # Errors
    /// Returns error if the path is malformed or the store rejects a node
    pub fn ensure_ancestors(&self, path: &str) -> Result<(), ContentError> {
        let target: ContentPath = path.parse()?;
        self.create_ancestors(&target).map_err(|source| ContentError::Resource {
            path: path.to_string(),
            source,
        })
    }

    /// Make sure the node at `path` exists, creating it and its ancestors
    /// as unstructured nodes where missing
    ///
    /// # Errors
    /// Returns error if the path is malformed or the store rejects a node
    pub fn ensure_resource(&self, path: &str) -> Result<Node, ContentError> {
        let target: ContentPath = path.parse()?;
        self.ensure_node(&target).map_err(|source| ContentError::Resource {
            path: path.to_string(),
            source,
        })
    }

    /// Create the node at `path` or merge `properties` into it
    ///
    /// Ancestors are created as needed. Does not commit.
    ///
    /// # Errors
    /// Returns error if the path is malformed or the store rejects a node
    pub fn resource(&self, path: &str, properties: Properties) -> Result<Node, ContentError> {
        let target: ContentPath = path.parse()?;
        self.upsert(&target, properties).map_err(|source| ContentError::Resource {
            path: path.to_string(),
            source,
        })
    }

    /// Create a page with the default template
    ///
    /// # Errors
    /// See [`ContentBuilder::page_with_properties`]
    pub fn page(&self, path: &str) -> Result<Page, ContentError> {
        self.page_with_properties(path, &self.default_template, Properties::new())
    }

    /// Create a page with the given template
    ///
    /// # Errors
    /// See [`ContentBuilder::page_with_properties`]
    pub fn page_with_template(&self, path: &str, template: &str) -> Result<Page, ContentError> {
        self.page_with_properties(path, template, Properties::new())
    }

    /// Create a page with the given template and title
    ///
    /// # Errors
    /// See [`ContentBuilder::page_with_properties`]
    pub fn page_with_title(&self, path: &str, template: &str, title: &str) -> Result<Page, ContentError> {
        let mut props = Properties::new();
        props.insert(PN_TITLE.to_string(), title.into());
        self.page_with_properties(path, template, props)
    }

    /// Create a page and merge `content_properties` into its `jcr:content` node
    ///
    /// The parent is created if missing. Commits when properties are given.
    /// Creating a page where one already exists returns that page.
    ///
    /// # Errors
    /// Returns [`ContentError::PageCreation`] if the store rejects the path or
    /// template
    pub fn page_with_properties(
        &self,
        path: &str,
        template: &str,
        content_properties: Properties,
    ) -> Result<Page, ContentError> {
        let page_path: ContentPath = path.parse()?;
        let wrap = |source: StoreError| ContentError::PageCreation {
            path: path.to_string(),
            source,
        };

        let parent = page_path.parent().ok_or_else(|| wrap(StoreError::RootReadOnly))?;
        self.ensure_node(&parent).map_err(wrap)?;
        let name = page_path.name();
        let page = self
            .store
            .create_page(&parent, name, template, name, true)
            .map_err(wrap)?;
        tracing::debug!(path, template, "created page");

        if content_properties.is_empty() {
            return Ok(page);
        }
        self.store
            .update(page.content().path(), content_properties)
            .map_err(wrap)?;
        self.store.commit().map_err(wrap)?;
        Page::load(self.store, &page_path).map_err(wrap)
    }

    /// Create an asset and commit
    ///
    /// # Errors
    /// See [`ContentBuilder::create_asset`]
    pub fn asset<'a>(
        &self,
        path: &str,
        source: impl Into<PayloadSource<'a>>,
        mime_type: &str,
    ) -> Result<Asset<'s>, ContentError> {
        self.create_asset(path, source, mime_type, None, true)
    }

    /// Create an asset with caller-supplied metadata and commit
    ///
    /// # Errors
    /// See [`ContentBuilder::create_asset`]
    pub fn asset_with_metadata<'a>(
        &self,
        path: &str,
        source: impl Into<PayloadSource<'a>>,
        mime_type: &str,
        metadata: &Properties,
    ) -> Result<Asset<'s>, ContentError> {
        self.create_asset(path, source, mime_type, Some(metadata), true)
    }

    /// Create an asset: root, content and renditions nodes, a metadata node
    /// and the `original` rendition
    ///
    /// The payload is buffered in memory once. If it decodes as an image its
    /// width and height are added to the metadata; otherwise they are
    /// omitted. Commits only when `auto_commit` is set.
    ///
    /// # Errors
    /// Returns [`ContentError::AssetCreation`] if the payload cannot be read
    /// or the store rejects a node. Nothing is committed in that case.
    pub fn create_asset<'a>(
        &self,
        path: &str,
        source: impl Into<PayloadSource<'a>>,
        mime_type: &str,
        metadata: Option<&Properties>,
        auto_commit: bool,
    ) -> Result<Asset<'s>, ContentError> {
        let layout = AssetLayout::new(path.parse()?)?;
        self.build_asset(&layout, source.into(), mime_type, metadata, auto_commit)
            .map_err(|source| {
                tracing::warn!(path, error = %source, "asset creation failed");
                ContentError::AssetCreation {
                    path: path.to_string(),
                    source,
                }
            })
    }

    /// Add a rendition to an existing asset
    ///
    /// # Errors
    /// Returns [`ContentError::AssetCreation`] if the payload cannot be read
    /// or the asset rejects the rendition
    pub fn asset_rendition<'a>(
        &self,
        asset: &Asset<'_>,
        name: &str,
        source: impl Into<PayloadSource<'a>>,
        mime_type: &str,
    ) -> Result<Rendition, ContentError> {
        let wrap = |source: AssetFailure| ContentError::AssetCreation {
            path: asset.path().to_string(),
            source,
        };
        let data = source
            .into()
            .read_all(mime_type, &self.resource_root)
            .map_err(wrap)?;
        asset
            .add_rendition(name, &data, mime_type)
            .map_err(|err| wrap(AssetFailure::Store(err)))
    }

    fn build_asset(
        &self,
        layout: &AssetLayout,
        source: PayloadSource<'_>,
        mime_type: &str,
        metadata: Option<&Properties>,
        auto_commit: bool,
    ) -> Result<Asset<'s>, AssetFailure> {
        let fresh = self.missing_subtrees(layout)?;
        let bytes = match self.write_asset(layout, source, mime_type, metadata) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.discard(&fresh);
                return Err(err);
            }
        };

        if auto_commit {
            self.store.commit()?;
        }
        tracing::debug!(
            path = %layout.root,
            bytes,
            mime_type,
            committed = auto_commit,
            "created asset"
        );
        Ok(Asset::load(self.store, &layout.root)?)
    }

    /// Steps up to, but excluding, the commit; returns the payload size
    fn write_asset(
        &self,
        layout: &AssetLayout,
        source: PayloadSource<'_>,
        mime_type: &str,
        metadata: Option<&Properties>,
    ) -> Result<usize, AssetFailure> {
        self.upsert(&layout.root, kind_properties(NodeKind::AssetRoot))?;
        self.upsert(&layout.content, kind_properties(NodeKind::AssetContent))?;
        self.upsert(&layout.renditions, kind_properties(NodeKind::Folder))?;

        let data = source.read_all(mime_type, &self.resource_root)?;

        let mut metadata_props = metadata.cloned().unwrap_or_default();
        if let Some(dims) = read_dimensions(&data) {
            metadata_props.insert(TIFF_IMAGEWIDTH.to_string(), dims.width.into());
            metadata_props.insert(TIFF_IMAGELENGTH.to_string(), dims.height.into());
        }
        self.upsert(&layout.metadata, metadata_props)?;

        self.store.write_binary(&layout.original, &data, mime_type)?;
        Ok(data.len())
    }

    /// Topmost paths of the asset layout (ancestors included) not yet present
    fn missing_subtrees(&self, layout: &AssetLayout) -> Result<Vec<ContentPath>, StoreError> {
        let own = [
            &layout.root,
            &layout.content,
            &layout.renditions,
            &layout.metadata,
            &layout.original,
        ];
        let mut missing: Vec<ContentPath> = Vec::new();
        for path in layout.root.ancestors().chain(own.into_iter().cloned()) {
            if missing.iter().any(|m| m.is_ancestor_of(&path)) {
                continue;
            }
            if !self.store.exists(&path)? {
                missing.push(path);
            }
        }
        Ok(missing)
    }

    /// Remove what a failed asset build created so a later commit cannot
    /// publish it
    fn discard(&self, fresh: &[ContentPath]) {
        for path in fresh.iter().rev() {
            if !self.store.exists(path).unwrap_or(false) {
                continue;
            }
            if let Err(err) = self.store.remove(path) {
                tracing::warn!(%path, error = %err, "could not discard partial asset node");
            }
        }
    }

    fn create_ancestors(&self, path: &ContentPath) -> Result<(), StoreError> {
        for ancestor in path.ancestors() {
            if !self.store.exists(&ancestor)? {
                self.store.create(&ancestor, Properties::new())?;
            }
        }
        Ok(())
    }

    fn ensure_node(&self, path: &ContentPath) -> Result<Node, StoreError> {
        self.create_ancestors(path)?;
        match self.store.get(path)? {
            Some(node) => Ok(node),
            None if path.is_root() => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            None => self.store.create(path, Properties::new()),
        }
    }

    fn upsert(&self, path: &ContentPath, properties: Properties) -> Result<Node, StoreError> {
        self.create_ancestors(path)?;
        self.store.put(path, properties)
    }
}
