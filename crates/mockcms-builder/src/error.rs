//! Error types for content building

use crate::image::SynthesisError;
use mockcms_store::{PathError, StoreError};
use std::path::PathBuf;

/// Errors surfaced by [`ContentBuilder`](crate::ContentBuilder)
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Building an asset or rendition failed; nothing was committed
    #[error("unable to create asset at {path}")]
    AssetCreation {
        path: String,
        #[source]
        source: AssetFailure,
    },

    /// The store rejected a page
    #[error("unable to create page at {path}")]
    PageCreation {
        path: String,
        #[source]
        source: StoreError,
    },

    /// The store rejected a plain node
    #[error("unable to write resource at {path}")]
    Resource {
        path: String,
        #[source]
        source: StoreError,
    },

    /// Malformed path argument
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// Store failure outside a specific node (e.g. commit)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ContentError {
    /// Path the failed operation targeted, if any
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::AssetCreation { path, .. }
            | Self::PageCreation { path, .. }
            | Self::Resource { path, .. } => Some(path),
            Self::InvalidPath(_) | Self::Store(_) => None,
        }
    }
}

/// Underlying cause of an asset creation failure
#[derive(Debug, thiserror::Error)]
pub enum AssetFailure {
    /// Reading the payload failed
    #[error("failed to read payload: {0}")]
    Io(#[from] std::io::Error),

    /// Named resource file does not exist
    #[error("resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// Dummy payload could not be generated
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// The store rejected a node
    #[error(transparent)]
    Store(#[from] StoreError),
}
