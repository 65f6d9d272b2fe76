use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use jobfs_core::{JobfsError, Result};

/// Directory flag, kept in the high bit of the mode word.
pub const DMDIR: u32 = 0x8000_0000;

/// The read/write capability pair backing a file node.
///
/// Readers render the node's bytes from live daemon state; writers
/// interpret the payload and mutate that state. Writers run under the
/// parent directory's mutex (see [`crate::Tree::write`]) and may await.
#[async_trait]
pub trait FileContent: Send + Sync {
    async fn read(&self) -> Vec<u8>;
    async fn write(&self, data: &[u8]) -> Result<usize>;
}

/// Node metadata as returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub mode: u32,
    pub owner: String,
    pub length: u64,
}

/// One node in the synthetic tree.
///
/// The tree exclusively owns every node: parents hold strong references
/// to children, children hold a weak back-reference to their parent.
pub struct Node {
    name: String,
    mode: u32,
    owner: String,
    parent: Weak<Node>,
    /// Insertion-ordered; empty for files.
    children: Mutex<Vec<Arc<Node>>>,
    /// Taken by writes to this node's children (the parent-mutex
    /// discipline). Held across the writer's await points.
    pub(crate) write_lock: tokio::sync::Mutex<()>,
    content: Option<Arc<dyn FileContent>>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl Node {
    pub(crate) fn new_root(owner: &str) -> Arc<Self> {
        Arc::new(Self {
            name: "/".to_string(),
            mode: DMDIR | 0o555,
            owner: owner.to_string(),
            parent: Weak::new(),
            children: Mutex::new(Vec::new()),
            write_lock: tokio::sync::Mutex::new(()),
            content: None,
        })
    }

    /// Add a directory child (mode `DMDIR|0555`) under `parent`.
    pub fn add_dir(parent: &Arc<Node>, name: &str, owner: &str) -> Result<Arc<Node>> {
        let child = Arc::new(Self {
            name: name.to_string(),
            mode: DMDIR | 0o555,
            owner: owner.to_string(),
            parent: Arc::downgrade(parent),
            children: Mutex::new(Vec::new()),
            write_lock: tokio::sync::Mutex::new(()),
            content: None,
        });
        Self::attach_child(parent, child)
    }

    /// Add a file child with the given permission bits and content.
    pub fn add_file(
        parent: &Arc<Node>,
        name: &str,
        owner: &str,
        perm: u32,
        content: Arc<dyn FileContent>,
    ) -> Result<Arc<Node>> {
        let child = Arc::new(Self {
            name: name.to_string(),
            mode: perm & 0o777,
            owner: owner.to_string(),
            parent: Arc::downgrade(parent),
            children: Mutex::new(Vec::new()),
            write_lock: tokio::sync::Mutex::new(()),
            content: Some(content),
        });
        Self::attach_child(parent, child)
    }

    fn attach_child(parent: &Arc<Node>, child: Arc<Node>) -> Result<Arc<Node>> {
        if !parent.is_dir() {
            return Err(JobfsError::Protocol(format!(
                "cannot add {:?} under file {:?}",
                child.name, parent.name
            )));
        }
        let mut children = parent.children.lock().unwrap();
        if children.iter().any(|c| c.name == child.name) {
            return Err(JobfsError::DuplicateName {
                name: child.name.clone(),
            });
        }
        children.push(Arc::clone(&child));
        Ok(child)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_dir(&self) -> bool {
        self.mode & DMDIR != 0
    }

    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.upgrade()
    }

    pub fn child(&self, name: &str) -> Option<Arc<Node>> {
        self.children
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// Child names in insertion order.
    pub fn child_names(&self) -> Vec<String> {
        self.children
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub(crate) fn content(&self) -> Option<Arc<dyn FileContent>> {
        self.content.clone()
    }

    /// Render the node's current bytes. Directories yield nothing here;
    /// the protocol handler materialises listings from `child_names`.
    pub async fn read_content(&self) -> Vec<u8> {
        match &self.content {
            Some(content) => content.read().await,
            None => Vec::new(),
        }
    }
}
