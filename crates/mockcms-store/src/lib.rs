//! Hierarchical content store for test fixtures
//!
//! Typed nodes addressed by slash-separated paths, with a working tree that
//! becomes durable on commit.
//!
//! # Core Concepts
//!
//! - [`ContentPath`]: absolute node address (`/content/dam/a.png`)
//! - [`PropertyValue`]: string, integer, boolean or binary property
//! - [`NodeKind`]: node classification, selected through `jcr:primaryType`
//! - [`ResourceStore`]: the store seam; [`MemoryStore`] implements it in memory
//! - [`Page`], [`Asset`], [`Rendition`]: views over page and asset subtrees
//!
//! # Example
//!
//! ```rust,ignore
//! use mockcms_store::{MemoryStore, ResourceStore, properties};
//!
//! let store = MemoryStore::default();
//! store.create(&"/content".parse()?, properties([("jcr:title", "Root".into())]))?;
//! store.commit()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod asset;
mod error;
mod node;
mod page;
mod path;
mod store;
mod value;

pub use asset::{Asset, Rendition};
pub use error::StoreError;
pub use node::{
    Node, NodeKind, JCR_CONTENT, METADATA_FOLDER, ORIGINAL_FILE, PN_DATA, PN_MIME_TYPE,
    PN_PRIMARY_TYPE, PN_TEMPLATE, PN_TITLE, RENDITIONS_FOLDER, TIFF_IMAGELENGTH, TIFF_IMAGEWIDTH,
};
pub use page::Page;
pub use path::{ContentPath, PathError};
pub use store::{kind_properties, MemoryStore, ResourceStore, StoreFlavor};
pub use value::{properties, BinaryValue, Properties, PropertyValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
