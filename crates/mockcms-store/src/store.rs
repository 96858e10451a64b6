//! Resource store abstraction and the in-memory implementation
//!
//! [`ResourceStore`] is the seam the content builder writes through.
//! [`MemoryStore`] keeps a working tree and a committed tree: writes land in
//! the working tree and become durable only on [`ResourceStore::commit`].

use crate::error::StoreError;
use crate::node::{Node, NodeKind, JCR_CONTENT, PN_DATA, PN_MIME_TYPE, PN_PRIMARY_TYPE};
use crate::page::{self, Page};
use crate::path::ContentPath;
use crate::value::{BinaryValue, Properties, PropertyValue};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt::Debug;

/// Hierarchical content store
///
/// All methods take `&self`; implementations synchronize internally so a
/// store can be shared behind an `Arc`.
///
/// A `jcr:primaryType` string in a property map selects the node kind; it is
/// never kept as an ordinary property.
pub trait ResourceStore: Send + Sync + Debug {
    /// Read a node from the working tree
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the store is closed
    fn get(&self, path: &ContentPath) -> Result<Option<Node>, StoreError>;

    /// Create a node; its parent must already exist
    ///
    /// # Errors
    /// Returns error if the node exists, the parent is missing or a node type
    /// constraint rejects it
    fn create(&self, path: &ContentPath, properties: Properties) -> Result<Node, StoreError>;

    /// Merge properties into an existing node
    ///
    /// # Errors
    /// Returns error if the node does not exist
    fn update(&self, path: &ContentPath, properties: Properties) -> Result<Node, StoreError>;

    /// Delete a node and its whole subtree from the working tree
    ///
    /// # Errors
    /// Returns error for the root or a missing node
    fn remove(&self, path: &ContentPath) -> Result<(), StoreError>;

    /// Direct children of a node
    ///
    /// Ordered kinds list children in insertion order, others by name.
    ///
    /// # Errors
    /// Returns error if the node does not exist
    fn children(&self, path: &ContentPath) -> Result<Vec<Node>, StoreError>;

    /// Persist the working tree
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the store is closed
    fn commit(&self) -> Result<(), StoreError>;

    /// Discard uncommitted changes
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the store is closed
    fn revert(&self) -> Result<(), StoreError>;

    /// Whether the working tree differs from the committed tree
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the store is closed
    fn has_changes(&self) -> Result<bool, StoreError>;

    /// Read a node from the committed tree
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the store is closed
    fn committed_node(&self, path: &ContentPath) -> Result<Option<Node>, StoreError>;

    /// Check if a node exists in the working tree
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the store is closed
    fn exists(&self, path: &ContentPath) -> Result<bool, StoreError> {
        Ok(self.get(path)?.is_some())
    }

    /// Create the node if absent, otherwise merge `properties` into it
    ///
    /// # Errors
    /// See [`ResourceStore::create`] and [`ResourceStore::update`]
    fn put(&self, path: &ContentPath, properties: Properties) -> Result<Node, StoreError> {
        if self.exists(path)? {
            self.update(path, properties)
        } else {
            self.create(path, properties)
        }
    }

    /// Store a binary file: an `nt:file` node at `path` with a `jcr:content`
    /// child holding the data and MIME type
    ///
    /// The parent of `path` must exist. An existing file is overwritten.
    ///
    /// # Errors
    /// Returns error if the parent is missing or the store rejects a node
    fn write_binary(
        &self,
        path: &ContentPath,
        data: &[u8],
        mime_type: &str,
    ) -> Result<Node, StoreError> {
        let file = self.put(path, kind_properties(NodeKind::File))?;
        let mut content = kind_properties(NodeKind::Resource);
        content.insert(PN_DATA.to_string(), BinaryValue::from(data).into());
        content.insert(PN_MIME_TYPE.to_string(), mime_type.into());
        self.put(&path.child(JCR_CONTENT)?, content)?;
        Ok(file)
    }

    /// Create a page below `parent`, or refresh the existing page of that name
    ///
    /// # Errors
    /// Returns error if the template is empty, the parent is missing or a
    /// non-page node occupies the path
    fn create_page(
        &self,
        parent: &ContentPath,
        name: &str,
        template: &str,
        title: &str,
        auto_commit: bool,
    ) -> Result<Page, StoreError> {
        page::create_page(self, parent, name, template, title, auto_commit)
    }
}

/// Property map holding only a primary type
#[must_use]
pub fn kind_properties(kind: NodeKind) -> Properties {
    let mut props = Properties::new();
    props.insert(PN_PRIMARY_TYPE.to_string(), kind.primary_type().into());
    props
}

/// Structural rules a [`MemoryStore`] enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFlavor {
    /// Any node may hold any child
    #[default]
    Permissive,

    /// Folders hold only files and folders, files hold only `jcr:content`,
    /// and node kinds cannot change once created
    Structured,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    properties: Properties,
}

#[derive(Debug)]
struct StoreState {
    working: IndexMap<ContentPath, NodeData>,
    committed: IndexMap<ContentPath, NodeData>,
    dirty: bool,
    closed: bool,
}

impl StoreState {
    fn open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

fn root_tree() -> IndexMap<ContentPath, NodeData> {
    let mut tree = IndexMap::new();
    tree.insert(
        ContentPath::root(),
        NodeData {
            kind: NodeKind::Unstructured,
            properties: Properties::new(),
        },
    );
    tree
}

fn snapshot(path: &ContentPath, data: &NodeData) -> Node {
    Node::new(path.clone(), data.kind, data.properties.clone())
}

/// Extract the node kind selected by a `jcr:primaryType` entry
fn take_kind(path: &ContentPath, properties: &mut Properties) -> Result<Option<NodeKind>, StoreError> {
    match properties.remove(PN_PRIMARY_TYPE) {
        None => Ok(None),
        Some(PropertyValue::String(name)) => name.parse().map(Some).map_err(|primary_type| {
            StoreError::UnknownPrimaryType {
                path: path.to_string(),
                primary_type,
            }
        }),
        Some(other) => Err(StoreError::PrimaryTypeNotString {
            path: path.to_string(),
            actual: other.type_name(),
        }),
    }
}

/// In-memory content store
///
/// Reads see uncommitted writes; [`ResourceStore::committed_node`] sees only
/// what the last commit persisted.
#[derive(Debug)]
pub struct MemoryStore {
    flavor: StoreFlavor,
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// Create an empty store holding only the root node
    #[must_use]
    pub fn new(flavor: StoreFlavor) -> Self {
        Self {
            flavor,
            state: RwLock::new(StoreState {
                working: root_tree(),
                committed: root_tree(),
                dirty: false,
                closed: false,
            }),
        }
    }

    /// Structural rules of this store
    #[inline]
    #[must_use]
    pub fn flavor(&self) -> StoreFlavor {
        self.flavor
    }

    /// Number of nodes in the working tree, root included
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.read().working.len()
    }

    /// Drop all content; every later operation fails with [`StoreError::Closed`]
    pub fn close(&self) {
        let mut state = self.state.write();
        state.working.clear();
        state.committed.clear();
        state.dirty = false;
        state.closed = true;
    }

    /// Check if the store has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    fn check_child(
        &self,
        parent: &ContentPath,
        parent_kind: NodeKind,
        child: &ContentPath,
        child_kind: NodeKind,
    ) -> Result<(), StoreError> {
        if self.flavor == StoreFlavor::Permissive {
            return Ok(());
        }
        let allowed = match parent_kind {
            NodeKind::Folder => matches!(child_kind, NodeKind::File | NodeKind::Folder),
            NodeKind::File => child.name() == JCR_CONTENT,
            _ => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(StoreError::ConstraintViolation {
                parent: parent.to_string(),
                parent_kind,
                child: child.name().to_string(),
                child_kind,
            })
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreFlavor::default())
    }
}

impl ResourceStore for MemoryStore {
    fn get(&self, path: &ContentPath) -> Result<Option<Node>, StoreError> {
        let state = self.state.read();
        state.open()?;
        Ok(state.working.get(path).map(|data| snapshot(path, data)))
    }

    fn create(&self, path: &ContentPath, mut properties: Properties) -> Result<Node, StoreError> {
        let parent = path.parent().ok_or(StoreError::RootReadOnly)?;
        let kind = take_kind(path, &mut properties)?.unwrap_or_default();

        let mut state = self.state.write();
        state.open()?;
        if state.working.contains_key(path) {
            return Err(StoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        let parent_kind = state
            .working
            .get(&parent)
            .map(|data| data.kind)
            .ok_or_else(|| StoreError::ParentMissing {
                path: path.to_string(),
            })?;
        self.check_child(&parent, parent_kind, path, kind)?;

        let data = NodeData { kind, properties };
        let node = snapshot(path, &data);
        state.working.insert(path.clone(), data);
        state.dirty = true;
        Ok(node)
    }

    fn update(&self, path: &ContentPath, mut properties: Properties) -> Result<Node, StoreError> {
        if path.is_root() {
            return Err(StoreError::RootReadOnly);
        }
        let kind = take_kind(path, &mut properties)?;

        let mut state = self.state.write();
        state.open()?;
        let current = state
            .working
            .get(path)
            .map(|data| data.kind)
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })?;
        if let Some(kind) = kind.filter(|k| *k != current) {
            if self.flavor == StoreFlavor::Structured {
                return Err(StoreError::KindMismatch {
                    path: path.to_string(),
                    expected: current,
                    actual: kind,
                });
            }
        }

        let data = state
            .working
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })?;
        if let Some(kind) = kind {
            data.kind = kind;
        }
        data.properties.extend(properties);
        let node = snapshot(path, data);
        state.dirty = true;
        Ok(node)
    }

    fn remove(&self, path: &ContentPath) -> Result<(), StoreError> {
        if path.is_root() {
            return Err(StoreError::RootReadOnly);
        }
        let mut state = self.state.write();
        state.open()?;
        if !state.working.contains_key(path) {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        state
            .working
            .retain(|p, _| p != path && !path.is_ancestor_of(p));
        state.dirty = true;
        Ok(())
    }

    fn children(&self, path: &ContentPath) -> Result<Vec<Node>, StoreError> {
        let state = self.state.read();
        state.open()?;
        let parent = state.working.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        let mut children: Vec<Node> = state
            .working
            .iter()
            .filter(|(p, _)| p.parent().as_ref() == Some(path))
            .map(|(p, data)| snapshot(p, data))
            .collect();
        if !parent.kind.is_ordered() {
            children.sort_by(|a, b| a.name().cmp(b.name()));
        }
        Ok(children)
    }

    fn commit(&self) -> Result<(), StoreError> {
        let mut state = self.state.write();
        state.open()?;
        state.committed = state.working.clone();
        state.dirty = false;
        tracing::trace!(nodes = state.committed.len(), "committed working tree");
        Ok(())
    }

    fn revert(&self) -> Result<(), StoreError> {
        let mut state = self.state.write();
        state.open()?;
        state.working = state.committed.clone();
        state.dirty = false;
        Ok(())
    }

    fn has_changes(&self) -> Result<bool, StoreError> {
        let state = self.state.read();
        state.open()?;
        Ok(state.dirty)
    }

    fn committed_node(&self, path: &ContentPath) -> Result<Option<Node>, StoreError> {
        let state = self.state.read();
        state.open()?;
        Ok(state.committed.get(path).map(|data| snapshot(path, data)))
    }
}
