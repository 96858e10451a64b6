//! Node kinds and node snapshots

use crate::path::ContentPath;
use crate::value::{BinaryValue, Properties, PropertyValue};
use std::fmt;
use std::str::FromStr;

/// Property holding the node kind's primary type name
pub const PN_PRIMARY_TYPE: &str = "jcr:primaryType";
/// Name of the content child of pages, assets and files
pub const JCR_CONTENT: &str = "jcr:content";
/// Binary data property of a file's content node
pub const PN_DATA: &str = "jcr:data";
/// MIME type property of a file's content node
pub const PN_MIME_TYPE: &str = "jcr:mimeType";
/// Page title property
pub const PN_TITLE: &str = "jcr:title";
/// Page template property
pub const PN_TEMPLATE: &str = "cq:template";
/// Renditions container below an asset's content node
pub const RENDITIONS_FOLDER: &str = "renditions";
/// Metadata container below an asset's content node
pub const METADATA_FOLDER: &str = "metadata";
/// Name of the original rendition
pub const ORIGINAL_FILE: &str = "original";
/// Image width metadata property
pub const TIFF_IMAGEWIDTH: &str = "tiff:ImageWidth";
/// Image height metadata property
pub const TIFF_IMAGELENGTH: &str = "tiff:ImageLength";

/// Node kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Generic unordered container
    #[default]
    Unstructured,

    /// Container with ordered children
    OrderedFolder,

    /// Plain folder (renditions container)
    Folder,

    /// Binary file node
    File,

    /// Content node of a file, carries data and MIME type
    Resource,

    /// Asset root
    AssetRoot,

    /// Content node of an asset
    AssetContent,

    /// Page
    Page,

    /// Content node of a page
    PageContent,
}

impl NodeKind {
    /// All known kinds
    pub const ALL: [NodeKind; 9] = [
        Self::Unstructured,
        Self::OrderedFolder,
        Self::Folder,
        Self::File,
        Self::Resource,
        Self::AssetRoot,
        Self::AssetContent,
        Self::Page,
        Self::PageContent,
    ];

    /// Primary type name
    #[must_use]
    pub const fn primary_type(self) -> &'static str {
        match self {
            Self::Unstructured => "nt:unstructured",
            Self::OrderedFolder => "sling:OrderedFolder",
            Self::Folder => "nt:folder",
            Self::File => "nt:file",
            Self::Resource => "nt:resource",
            Self::AssetRoot => "dam:Asset",
            Self::AssetContent => "dam:AssetContent",
            Self::Page => "cq:Page",
            Self::PageContent => "cq:PageContent",
        }
    }

    /// Whether this kind keeps its children in insertion order
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::OrderedFolder | Self::Page)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary_type())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.primary_type() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Snapshot of a node read from a store
///
/// Detached from the store: later writes are not reflected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    path: ContentPath,
    kind: NodeKind,
    properties: Properties,
}

impl Node {
    pub(crate) fn new(path: ContentPath, kind: NodeKind, properties: Properties) -> Self {
        Self {
            path,
            kind,
            properties,
        }
    }

    /// Node path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &ContentPath {
        &self.path
    }

    /// Node name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// All properties (excluding the primary type, see [`Node::kind`])
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Raw property lookup
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// String property
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    /// Integer property
    #[must_use]
    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropertyValue::as_long)
    }

    /// Boolean property
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropertyValue::as_bool)
    }

    /// Binary property
    #[must_use]
    pub fn get_binary(&self, name: &str) -> Option<&BinaryValue> {
        self.get(name).and_then(PropertyValue::as_binary)
    }
}
