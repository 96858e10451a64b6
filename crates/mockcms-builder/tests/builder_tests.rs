//! Integration tests for content building

use mockcms_builder::{
    dummy_image, read_dimensions, AssetFailure, AssetManager, ContentBuilder, ContentError,
    Dimensions, PayloadSource, DUMMY_TEMPLATE,
};
use mockcms_store::{
    properties, MemoryStore, NodeKind, Properties, PropertyValue, ResourceStore, StoreError,
    StoreFlavor, TIFF_IMAGELENGTH, TIFF_IMAGEWIDTH,
};
use mockcms_test_utils::{assert_not_committed, init_test_tracing, node, path, png_bytes, resource_dir};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::{self, Read};

#[test]
fn png_asset_gets_dimensions() {
    init_test_tracing();
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    let asset = builder
        .create_asset("/content/dam/sample.png", png_bytes(10, 5), "image/png", None, true)
        .unwrap();

    assert_eq!(asset.metadata_value(TIFF_IMAGEWIDTH).unwrap(), Some(PropertyValue::Long(10)));
    assert_eq!(asset.metadata_value(TIFF_IMAGELENGTH).unwrap(), Some(PropertyValue::Long(5)));
    assert!(!store.has_changes().unwrap());
}

#[test]
fn non_image_asset_has_no_dimensions() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    let asset = builder
        .create_asset("/content/dam/blob.bin", vec![0_u8, 1, 2], "image/png", None, true)
        .unwrap();

    let metadata = asset.metadata().unwrap();
    assert!(!metadata.contains_key(TIFF_IMAGEWIDTH));
    assert!(!metadata.contains_key(TIFF_IMAGELENGTH));
    assert_eq!(asset.original().unwrap().unwrap().data(), &[0, 1, 2]);
}

#[test]
fn asset_has_exactly_one_original() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);
    let payload = png_bytes(3, 3);

    let asset = builder.asset("/content/dam/a.png", payload.clone(), "image/x-custom").unwrap();

    let renditions = asset.renditions().unwrap();
    assert_eq!(renditions.len(), 1);
    assert_eq!(renditions[0].name(), "original");
    assert_eq!(renditions[0].mime_type(), "image/x-custom");
    assert_eq!(renditions[0].data(), payload.as_slice());
}

#[test]
fn asset_layout_uses_typed_nodes() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);
    builder.asset("/content/dam/a.png", png_bytes(2, 2), "image/png").unwrap();

    assert_eq!(node(&store, "/content").kind(), NodeKind::Unstructured);
    assert_eq!(node(&store, "/content/dam/a.png").kind(), NodeKind::AssetRoot);
    assert_eq!(node(&store, "/content/dam/a.png/jcr:content").kind(), NodeKind::AssetContent);
    assert_eq!(
        node(&store, "/content/dam/a.png/jcr:content/renditions").kind(),
        NodeKind::Folder
    );
    assert_eq!(
        node(&store, "/content/dam/a.png/jcr:content/renditions/original").kind(),
        NodeKind::File
    );
}

#[test]
fn caller_metadata_is_merged_and_detected_size_wins() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);
    let metadata = properties([
        ("dc:title", "Sample".into()),
        (TIFF_IMAGEWIDTH, 999_i64.into()),
    ]);

    let asset = builder
        .asset_with_metadata("/content/dam/m.png", png_bytes(7, 2), "image/png", &metadata)
        .unwrap();

    assert_eq!(asset.metadata_value("dc:title").unwrap(), Some(PropertyValue::from("Sample")));
    assert_eq!(asset.metadata_value(TIFF_IMAGEWIDTH).unwrap(), Some(PropertyValue::Long(7)));
}

#[test]
fn deferred_commit_leaves_working_tree_only() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    let asset = builder
        .create_asset("/content/dam/later.png", png_bytes(1, 1), "image/png", None, false)
        .unwrap();

    assert!(asset.original().unwrap().is_some());
    assert!(store.has_changes().unwrap());
    assert_not_committed(&store, "/content/dam/later.png");
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
    }
}

#[test]
fn failed_read_commits_nothing() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    let err = builder
        .create_asset(
            "/content/dam/broken.png",
            PayloadSource::reader(FailingReader),
            "image/png",
            None,
            true,
        )
        .unwrap_err();

    assert!(matches!(
        &err,
        ContentError::AssetCreation { source: AssetFailure::Io(_), .. }
    ));
    assert_eq!(err.path(), Some("/content/dam/broken.png"));
    assert_not_committed(&store, "/content/dam/broken.png");
    assert_not_committed(&store, "/content/dam/broken.png/jcr:content/renditions/original");
}

#[test]
fn failed_asset_is_not_published_by_later_commit() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);
    builder.ensure_resource("/content").unwrap();
    builder.commit().unwrap();

    builder
        .create_asset(
            "/content/dam/broken.png",
            PayloadSource::reader(FailingReader),
            "image/png",
            None,
            true,
        )
        .unwrap_err();
    builder
        .page_with_title("/content/site", "/apps/t", "Site")
        .unwrap();

    assert_not_committed(&store, "/content/dam/broken.png");
    assert_not_committed(&store, "/content/dam");
    assert!(!store.exists(&path("/content/dam")).unwrap());
    assert!(store.committed_node(&path("/content")).unwrap().is_some());
}

#[test]
fn failed_rebuild_keeps_existing_asset() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);
    builder.asset("/content/dam/keep.png", png_bytes(2, 2), "image/png").unwrap();

    builder
        .asset("/content/dam/keep.png", PayloadSource::reader(FailingReader), "image/png")
        .unwrap_err();

    let asset = mockcms_store::Asset::load(&store, &path("/content/dam/keep.png")).unwrap();
    assert_eq!(asset.original().unwrap().unwrap().data(), png_bytes(2, 2).as_slice());
}

#[test]
fn resource_payload_is_read_from_root() {
    let store = MemoryStore::default();
    let dir = resource_dir(&[("images/logo.png", &png_bytes(6, 4))]);
    let builder = ContentBuilder::new(&store).with_resource_root(dir.path());

    let asset = builder
        .asset("/content/dam/logo.png", PayloadSource::resource("images/logo.png"), "image/png")
        .unwrap();
    assert_eq!(asset.metadata_value(TIFF_IMAGEWIDTH).unwrap(), Some(PropertyValue::Long(6)));

    let missing = builder
        .asset("/content/dam/none.png", PayloadSource::resource("images/none.png"), "image/png")
        .unwrap_err();
    assert!(matches!(
        missing,
        ContentError::AssetCreation { source: AssetFailure::ResourceNotFound(_), .. }
    ));
}

#[test]
fn dummy_payload_follows_mime_type() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    let asset = builder
        .asset("/content/dam/dummy.gif", PayloadSource::dummy(4, 4), "image/gif")
        .unwrap();
    assert_eq!(asset.metadata_value(TIFF_IMAGEWIDTH).unwrap(), Some(PropertyValue::Long(4)));
    assert_eq!(asset.metadata_value(TIFF_IMAGELENGTH).unwrap(), Some(PropertyValue::Long(4)));

    let err = builder
        .asset("/content/dam/dummy.txt", PayloadSource::dummy(4, 4), "text/plain")
        .unwrap_err();
    assert!(matches!(
        err,
        ContentError::AssetCreation { source: AssetFailure::Synthesis(_), .. }
    ));
}

#[test]
fn dummy_gif_reads_back() {
    let gif = dummy_image(4, 4, "image/gif").unwrap();
    assert_eq!(read_dimensions(&gif), Some(Dimensions { width: 4, height: 4 }));
}

#[test]
fn rendition_is_added_and_committed() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);
    let asset = builder.asset("/content/dam/r.png", png_bytes(8, 8), "image/png").unwrap();

    let thumb = builder
        .asset_rendition(&asset, "thumbnail.48.48.png", PayloadSource::dummy(48, 48), "image/png")
        .unwrap();

    assert_eq!(thumb.mime_type(), "image/png");
    assert_eq!(read_dimensions(thumb.data()), Some(Dimensions { width: 48, height: 48 }));
    assert_eq!(asset.renditions().unwrap().len(), 2);
    assert!(!store.has_changes().unwrap());
}

#[test]
fn page_with_title_sets_title_and_template() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    let page = builder
        .page_with_title("/content/site/en", "/apps/site/templates/home", "Hello")
        .unwrap();

    assert_eq!(page.title(), "Hello");
    assert_eq!(page.template(), Some("/apps/site/templates/home"));
    assert!(store.committed_node(page.content().path()).unwrap().is_some());
}

#[test]
fn repeated_page_creation_does_not_duplicate() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    builder.page_with_title("/content/p", "/apps/t", "Hello").unwrap();
    let again = builder.page_with_title("/content/p", "/apps/t", "Hello").unwrap();

    assert_eq!(again.title(), "Hello");
    assert_eq!(store.children(&path("/content")).unwrap().len(), 1);
}

#[test]
fn page_defaults_and_properties() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);

    let page = builder.page("/content/plain").unwrap();
    assert_eq!(page.template(), Some(DUMMY_TEMPLATE));
    assert_eq!(page.title(), "plain");

    let custom = ContentBuilder::new(&store).with_default_template("/apps/other");
    assert_eq!(custom.page("/content/other").unwrap().template(), Some("/apps/other"));

    let page = builder
        .page_with_properties(
            "/content/props",
            "/apps/t",
            properties([("sling:resourceType", "site/page".into())]),
        )
        .unwrap();
    assert_eq!(page.property("sling:resourceType"), Some(&PropertyValue::from("site/page")));
}

#[test]
fn page_over_plain_node_is_rejected() {
    let store = MemoryStore::default();
    let builder = ContentBuilder::new(&store);
    builder.ensure_resource("/content/taken").unwrap();

    let err = builder.page("/content/taken").unwrap_err();
    assert!(matches!(
        err,
        ContentError::PageCreation { source: StoreError::KindMismatch { .. }, .. }
    ));

    let err = builder.page_with_template("/content/blank", "").unwrap_err();
    assert!(matches!(
        err,
        ContentError::PageCreation { source: StoreError::InvalidPage(_), .. }
    ));
}

#[test]
fn structured_store_rejects_stray_rendition_children() {
    let store = MemoryStore::new(StoreFlavor::Structured);
    let builder = ContentBuilder::new(&store);
    builder.asset("/content/dam/s.png", png_bytes(2, 2), "image/png").unwrap();

    let err = builder
        .resource("/content/dam/s.png/jcr:content/renditions/notes", Properties::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ContentError::Resource { source: StoreError::ConstraintViolation { .. }, .. }
    ));
}

#[test]
fn asset_manager_defers_save() {
    let store = MemoryStore::default();
    let manager = AssetManager::new(ContentBuilder::new(&store));

    manager
        .create_asset("/content/dam/m.png", png_bytes(2, 3).as_slice(), "image/png", false)
        .unwrap();
    assert_not_committed(&store, "/content/dam/m.png");

    let asset = manager.asset("/content/dam/m.png").unwrap().unwrap();
    assert_eq!(asset.metadata_value(TIFF_IMAGELENGTH).unwrap(), Some(PropertyValue::Long(3)));
}

proptest! {
    #[test]
    fn prop_upsert_creates_bare_ancestors(segs in prop::collection::vec("[a-z]{1,6}", 1..6)) {
        let store = MemoryStore::default();
        let builder = ContentBuilder::new(&store);
        let target = format!("/{}", segs.join("/"));

        builder.resource(&target, properties([("marker", true.into())])).unwrap();

        let target_path = path(&target);
        for ancestor in target_path.ancestors() {
            let n = store.get(&ancestor).unwrap().unwrap();
            prop_assert!(n.properties().is_empty());
        }
        prop_assert_eq!(node(&store, &target).get_bool("marker"), Some(true));
    }
}
