use std::sync::Arc;

use jobfs_core::config::JobfsConfig;
use jobfs_core::Result;
use jobfs_tree::{Node, Tree};

use crate::clone::CloneFile;
use crate::defs::DefinitionsLog;
use crate::registry::{JobRegistry, DAEMON_USER};

/// Central shared state — passed as `Arc<AppState>` to every connection
/// task. Built once at startup; torn down only by process exit.
pub struct AppState {
    pub config: JobfsConfig,
    pub tree: Tree,
    pub registry: Arc<JobRegistry>,
    pub definitions: Arc<DefinitionsLog>,
}

impl AppState {
    /// Assemble the served namespace: `/clone` and `/jobs`.
    pub fn new(config: JobfsConfig, definitions: DefinitionsLog) -> Result<Self> {
        let tree = Tree::new(DAEMON_USER);
        let definitions = Arc::new(definitions);
        let registry = Arc::new(JobRegistry::new(&tree)?);

        let clone = CloneFile::new(Arc::clone(&registry), Arc::clone(&definitions));
        Node::add_file(tree.root(), "clone", DAEMON_USER, 0o666, Arc::new(clone))?;

        Ok(Self {
            config,
            tree,
            registry,
            definitions,
        })
    }
}
