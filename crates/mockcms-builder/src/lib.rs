//! Content builder for fixture stores
//!
//! Creates pages, assets and renditions in a [`ResourceStore`], creating
//! missing ancestors on the way. Image payloads are inspected for their
//! dimensions and placeholder images can be synthesized on demand.
//!
//! [`ResourceStore`]: mockcms_store::ResourceStore

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod asset_manager;
mod builder;
mod error;
mod image;
mod source;

pub use asset_manager::AssetManager;
pub use builder::{ContentBuilder, DUMMY_TEMPLATE};
pub use error::{AssetFailure, ContentError};
pub use image::{dummy_image, read_dimensions, Dimensions, SynthesisError};
pub use source::PayloadSource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
