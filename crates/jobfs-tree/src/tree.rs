use std::sync::Arc;

use jobfs_core::{JobfsError, Result};

use crate::node::{Node, Stat};

/// Access mode requested on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    ReadWrite,
}

/// The served namespace. Owns the root; every other node hangs off it.
pub struct Tree {
    root: Arc<Node>,
}

impl Tree {
    pub fn new(owner: &str) -> Self {
        Self {
            root: Node::new_root(owner),
        }
    }

    /// Return the root handle for a freshly attached client.
    pub fn attach(&self) -> Arc<Node> {
        Arc::clone(&self.root)
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Resolve `names` child-by-child from `from`; fails `not-found` on
    /// the first miss. An empty path yields `from` itself.
    pub fn walk(&self, from: &Arc<Node>, names: &[String]) -> Result<Arc<Node>> {
        let mut node = Arc::clone(from);
        for name in names {
            node = node
                .child(name)
                .ok_or_else(|| JobfsError::NotFound { path: name.clone() })?;
        }
        Ok(node)
    }

    /// Check the requested access mode against the node's permission bits.
    pub fn open(&self, node: &Node, mode: OpenMode) -> Result<()> {
        let perm = node.mode() & 0o777;
        let allowed = match mode {
            OpenMode::Read => perm & 0o444 != 0,
            OpenMode::Write => perm & 0o222 != 0,
            OpenMode::ReadWrite => perm & 0o444 != 0 && perm & 0o222 != 0,
        };
        if allowed {
            Ok(())
        } else {
            Err(JobfsError::PermissionDenied)
        }
    }

    /// Copy up to `count` bytes of the node's rendered contents starting
    /// at `offset`. An offset at or past the end yields an empty slice.
    pub async fn read(&self, node: &Node, offset: u64, count: u32) -> Vec<u8> {
        let data = node.read_content().await;
        read_slice(&data, offset, count)
    }

    /// Pass `data` to the node's writer, holding the parent directory's
    /// mutex for the whole call. Writes are message-oriented; there is no
    /// offset. Directories reject writes.
    pub async fn write(&self, node: &Arc<Node>, data: &[u8]) -> Result<usize> {
        let Some(content) = node.content() else {
            return Err(JobfsError::PermissionDenied);
        };
        // Every file has a live parent (the tree owns both); the root is
        // a directory and was rejected above.
        match node.parent() {
            Some(parent) => {
                let _guard = parent.write_lock.lock().await;
                content.write(data).await
            }
            None => content.write(data).await,
        }
    }

    /// Node metadata; length is the current rendered size.
    pub async fn stat(&self, node: &Node) -> Stat {
        Stat {
            name: node.name().to_string(),
            mode: node.mode(),
            owner: node.owner().to_string(),
            length: node.read_content().await.len() as u64,
        }
    }

    /// Accept-and-ignore. Exists only to satisfy clients issuing
    /// stat-update operations.
    pub fn wstat(&self, _node: &Node) {}
}

/// Slice `data` at `(offset, count)`, clamped to its length.
pub fn read_slice(data: &[u8], offset: u64, count: u32) -> Vec<u8> {
    let start = offset as usize;
    if start >= data.len() {
        return Vec::new();
    }
    let end = start.saturating_add(count as usize).min(data.len());
    data[start..end].to_vec()
}
