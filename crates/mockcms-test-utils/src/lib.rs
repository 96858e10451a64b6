//! Testing utilities for the mockcms workspace
//!
//! Shared test helpers, payloads, and assertions.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use image::{ImageFormat, RgbaImage};
use mockcms_store::{ContentPath, Node, ResourceStore};
use std::io::Cursor;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber filtered by `RUST_LOG` (once per process)
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_test_writer()
            .try_init();
    });
}

/// Parse an absolute content path
pub fn path(s: &str) -> ContentPath {
    s.parse().unwrap()
}

/// Encoded blank image in the given format
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut out, format)
        .unwrap();
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

/// Temporary resource root holding the given files
pub fn resource_dir(files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, data) in files {
        write_file(dir.path(), name, data);
    }
    dir
}

fn write_file(root: &Path, name: &str, data: &[u8]) {
    let target = root.join(name);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(target, data).unwrap();
}

/// Node at `path` in the working tree, panicking if absent
pub fn node(store: &dyn ResourceStore, p: &str) -> Node {
    store
        .get(&path(p))
        .unwrap()
        .unwrap_or_else(|| panic!("no node at {p}"))
}

/// Assert that nothing at `p` made it into the committed view
pub fn assert_not_committed(store: &dyn ResourceStore, p: &str) {
    assert!(
        store.committed_node(&path(p)).unwrap().is_none(),
        "{p} should not be committed"
    );
}
