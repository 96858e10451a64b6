//! Page handles and page creation

use crate::error::StoreError;
use crate::node::{Node, NodeKind, JCR_CONTENT, PN_TEMPLATE, PN_TITLE};
use crate::path::ContentPath;
use crate::store::{kind_properties, ResourceStore};
use crate::value::PropertyValue;

/// A page: a `cq:Page` node plus its `jcr:content` node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    path: ContentPath,
    content: Node,
}

impl Page {
    /// Read the page at `path`
    ///
    /// # Errors
    /// Returns error if there is no page at `path` or it lacks a content node
    pub fn load<S: ResourceStore + ?Sized>(store: &S, path: &ContentPath) -> Result<Self, StoreError> {
        let node = store.get(path)?.ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        if node.kind() != NodeKind::Page {
            return Err(StoreError::KindMismatch {
                path: path.to_string(),
                expected: NodeKind::Page,
                actual: node.kind(),
            });
        }
        let content_path = path.child(JCR_CONTENT)?;
        let content = store.get(&content_path)?.ok_or_else(|| StoreError::NotFound {
            path: content_path.to_string(),
        })?;
        Ok(Self {
            path: path.clone(),
            content,
        })
    }

    /// Page path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &ContentPath {
        &self.path
    }

    /// Page name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Page title, falling back to the page name
    #[must_use]
    pub fn title(&self) -> &str {
        self.content.get_str(PN_TITLE).unwrap_or_else(|| self.name())
    }

    /// Template the page was created from
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.content.get_str(PN_TEMPLATE)
    }

    /// Snapshot of the `jcr:content` node
    #[inline]
    #[must_use]
    pub fn content(&self) -> &Node {
        &self.content
    }

    /// Property of the `jcr:content` node
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.content.get(name)
    }
}

pub(crate) fn create_page<S: ResourceStore + ?Sized>(
    store: &S,
    parent: &ContentPath,
    name: &str,
    template: &str,
    title: &str,
    auto_commit: bool,
) -> Result<Page, StoreError> {
    if template.is_empty() {
        return Err(StoreError::InvalidPage("template must not be empty".to_string()));
    }
    if !store.exists(parent)? {
        return Err(StoreError::ParentMissing {
            path: format!("{parent}/{name}"),
        });
    }
    let path = parent.child(name)?;

    match store.get(&path)? {
        Some(existing) if existing.kind() != NodeKind::Page => {
            return Err(StoreError::KindMismatch {
                path: path.to_string(),
                expected: NodeKind::Page,
                actual: existing.kind(),
            });
        }
        Some(_) => {}
        None => {
            store.create(&path, kind_properties(NodeKind::Page))?;
        }
    }

    let mut content = kind_properties(NodeKind::PageContent);
    content.insert(PN_TEMPLATE.to_string(), template.into());
    content.insert(PN_TITLE.to_string(), title.into());
    store.put(&path.child(JCR_CONTENT)?, content)?;

    if auto_commit {
        store.commit()?;
    }
    Page::load(store, &path)
}
