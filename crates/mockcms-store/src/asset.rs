//! Asset and rendition handles
//!
//! An asset at `P` is laid out as:
//!
//! ```text
//! P                              dam:Asset
//! └── jcr:content                dam:AssetContent
//!     ├── renditions             nt:folder
//!     │   ├── original           nt:file (+ jcr:content with data and MIME type)
//!     │   └── <name> ...         nt:file
//!     └── metadata               nt:unstructured
//! ```

use crate::error::StoreError;
use crate::node::{
    NodeKind, JCR_CONTENT, METADATA_FOLDER, ORIGINAL_FILE, PN_DATA, PN_MIME_TYPE, RENDITIONS_FOLDER,
};
use crate::path::ContentPath;
use crate::store::ResourceStore;
use crate::value::{BinaryValue, Properties, PropertyValue};

/// Asset handle bound to the store it lives in
///
/// Reads go to the store on every call, so the handle always reflects the
/// current working tree.
#[derive(Debug, Clone)]
pub struct Asset<'s> {
    store: &'s dyn ResourceStore,
    path: ContentPath,
}

impl<'s> Asset<'s> {
    /// Resolve the asset at `path`
    ///
    /// # Errors
    /// Returns error if there is no node at `path` or it is not an asset root
    pub fn load(store: &'s dyn ResourceStore, path: &ContentPath) -> Result<Self, StoreError> {
        let node = store.get(path)?.ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        if node.kind() != NodeKind::AssetRoot {
            return Err(StoreError::KindMismatch {
                path: path.to_string(),
                expected: NodeKind::AssetRoot,
                actual: node.kind(),
            });
        }
        Ok(Self {
            store,
            path: path.clone(),
        })
    }

    /// Asset path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &ContentPath {
        &self.path
    }

    /// Asset name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Path of the renditions container
    ///
    /// # Errors
    /// Never fails for a valid asset path; kept fallible for path validation
    pub fn renditions_path(&self) -> Result<ContentPath, StoreError> {
        Ok(self.path.child(JCR_CONTENT)?.child(RENDITIONS_FOLDER)?)
    }

    /// Path of the metadata container
    ///
    /// # Errors
    /// Never fails for a valid asset path; kept fallible for path validation
    pub fn metadata_path(&self) -> Result<ContentPath, StoreError> {
        Ok(self.path.child(JCR_CONTENT)?.child(METADATA_FOLDER)?)
    }

    /// Metadata properties (empty if the container is missing)
    ///
    /// # Errors
    /// Returns error if the store fails
    pub fn metadata(&self) -> Result<Properties, StoreError> {
        Ok(self
            .store
            .get(&self.metadata_path()?)?
            .map(|node| node.properties().clone())
            .unwrap_or_default())
    }

    /// Single metadata value
    ///
    /// # Errors
    /// Returns error if the store fails
    pub fn metadata_value(&self, name: &str) -> Result<Option<PropertyValue>, StoreError> {
        Ok(self.metadata()?.remove(name))
    }

    /// All renditions
    ///
    /// # Errors
    /// Returns error if the renditions container is missing or malformed
    pub fn renditions(&self) -> Result<Vec<Rendition>, StoreError> {
        self.store
            .children(&self.renditions_path()?)?
            .into_iter()
            .filter(|node| node.kind() == NodeKind::File)
            .map(|node| Rendition::load(self.store, node.path()))
            .collect()
    }

    /// Rendition by name
    ///
    /// # Errors
    /// Returns error if the rendition exists but is malformed
    pub fn rendition(&self, name: &str) -> Result<Option<Rendition>, StoreError> {
        let path = self.renditions_path()?.child(name)?;
        if self.store.exists(&path)? {
            Rendition::load(self.store, &path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// The original rendition
    ///
    /// # Errors
    /// Returns error if the rendition exists but is malformed
    pub fn original(&self) -> Result<Option<Rendition>, StoreError> {
        self.rendition(ORIGINAL_FILE)
    }

    /// MIME type of the original rendition
    ///
    /// # Errors
    /// Returns error if the original rendition is malformed
    pub fn mime_type(&self) -> Result<Option<String>, StoreError> {
        Ok(self.original()?.map(|r| r.mime_type().to_string()))
    }

    /// Store `data` as rendition `name` and commit
    ///
    /// An existing rendition of the same name is replaced.
    ///
    /// # Errors
    /// Returns error if the renditions container is missing or the store
    /// rejects the write
    pub fn add_rendition(&self, name: &str, data: &[u8], mime_type: &str) -> Result<Rendition, StoreError> {
        let path = self.renditions_path()?.child(name)?;
        self.store.write_binary(&path, data, mime_type)?;
        self.store.commit()?;
        Rendition::load(self.store, &path)
    }
}

/// Snapshot of one rendition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    path: ContentPath,
    mime_type: String,
    data: BinaryValue,
}

impl Rendition {
    /// Read the rendition file at `path`
    ///
    /// # Errors
    /// Returns error if `path` is not a file with data and a MIME type
    pub fn load<S: ResourceStore + ?Sized>(store: &S, path: &ContentPath) -> Result<Self, StoreError> {
        let content_path = path.child(JCR_CONTENT)?;
        let content = store.get(&content_path)?.ok_or_else(|| StoreError::NotFound {
            path: content_path.to_string(),
        })?;
        let data = content
            .get_binary(PN_DATA)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: format!("{content_path}/{PN_DATA}"),
            })?;
        let mime_type = content.get_str(PN_MIME_TYPE).unwrap_or_default().to_string();
        Ok(Self {
            path: path.clone(),
            mime_type,
            data,
        })
    }

    /// Rendition path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &ContentPath {
        &self.path
    }

    /// Rendition name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// MIME type
    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Binary payload
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Payload size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{kind_properties, MemoryStore};
    use crate::value::properties;

    fn p(s: &str) -> ContentPath {
        s.parse().unwrap()
    }

    fn seed_asset(store: &MemoryStore) {
        store.create(&p("/a.png"), kind_properties(NodeKind::AssetRoot)).unwrap();
        store.create(&p("/a.png/jcr:content"), kind_properties(NodeKind::AssetContent)).unwrap();
        store.create(&p("/a.png/jcr:content/renditions"), kind_properties(NodeKind::Folder)).unwrap();
        store
            .create(&p("/a.png/jcr:content/metadata"), properties([("dc:title", "A".into())]))
            .unwrap();
        store
            .write_binary(&p("/a.png/jcr:content/renditions/original"), b"orig", "image/png")
            .unwrap();
    }

    #[test]
    fn asset_load_checks_kind() {
        let store = MemoryStore::default();
        store.create(&p("/plain"), Properties::new()).unwrap();
        assert!(matches!(Asset::load(&store, &p("/plain")), Err(StoreError::KindMismatch { .. })));
        assert!(matches!(Asset::load(&store, &p("/none")), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn asset_reads_original_and_metadata() {
        let store = MemoryStore::default();
        seed_asset(&store);
        let asset = Asset::load(&store, &p("/a.png")).unwrap();
        assert_eq!(asset.name(), "a.png");

        let original = asset.original().unwrap().unwrap();
        assert_eq!(original.data(), b"orig");
        assert_eq!(original.mime_type(), "image/png");
        assert_eq!(asset.mime_type().unwrap().as_deref(), Some("image/png"));
        assert_eq!(asset.metadata_value("dc:title").unwrap(), Some("A".into()));
        assert!(asset.rendition("missing").unwrap().is_none());
    }

    #[test]
    fn add_rendition_commits() {
        let store = MemoryStore::default();
        seed_asset(&store);
        let asset = Asset::load(&store, &p("/a.png")).unwrap();
        let thumb = asset.add_rendition("thumb", b"small", "image/jpeg").unwrap();
        assert_eq!(thumb.name(), "thumb");
        assert_eq!(thumb.size(), 5);

        let names: Vec<_> = asset.renditions().unwrap().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["original", "thumb"]);
        assert!(!store.has_changes().unwrap());
    }
}
