//! `jobfs-tree` — the synthetic file tree the daemon serves.
//!
//! Nodes are filesystem-shaped objects whose contents are computed on
//! demand from in-memory state. A file node carries an [`FileContent`]
//! implementation — its read/write capability pair; a directory node
//! carries insertion-ordered children. The [`Tree`] exposes the semantic
//! operations the protocol handler consumes: attach, walk, open, read,
//! write, stat, wstat.
//!
//! Mutation discipline: a write through a node takes the **parent's**
//! mutex for the entire writer call, so sibling writes under one
//! directory serialise. Reads take no parent lock and may observe a
//! stale-but-valid value.

pub mod node;
pub mod tree;

pub use node::{FileContent, Node, Stat, DMDIR};
pub use tree::{read_slice, OpenMode, Tree};
