use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use jobfs_core::{JobDefinition, JobfsError, Result};
use jobfs_scheduler::Job;
use jobfs_tree::{Node, Tree};

use crate::jobfiles::{CmdFile, CtlFile, LogFile, ScheduleFile};

/// Owner recorded on every node the daemon creates.
pub const DAEMON_USER: &str = "jobfs";

/// The `/jobs` directory: maps job names to live jobs and owns their
/// subtrees. Iteration order of the map is not observable.
pub struct JobRegistry {
    dir: Arc<Node>,
    jobs: Mutex<HashMap<String, Arc<Job>>>,
}

impl JobRegistry {
    /// Create the `/jobs` directory at the root of the namespace.
    pub fn new(tree: &Tree) -> Result<Self> {
        let dir = Node::add_dir(tree.root(), "jobs", DAEMON_USER)?;
        Ok(Self {
            dir,
            jobs: Mutex::new(HashMap::new()),
        })
    }

    /// Materialise `/jobs/<name>` with its four control files and
    /// register the job, in stopped state. Either wholly succeeds or
    /// leaves the registry unchanged.
    pub fn add_job(&self, definition: JobDefinition) -> Result<Arc<Job>> {
        let name = definition.name.clone();
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.contains_key(&name) {
            return Err(JobfsError::DuplicateName { name });
        }

        let job = Arc::new(Job::new(definition)?);
        let dir = Node::add_dir(&self.dir, &name, DAEMON_USER)?;
        Node::add_file(&dir, "ctl", DAEMON_USER, 0o666, Arc::new(CtlFile::new(&job)))?;
        Node::add_file(
            &dir,
            "schedule",
            DAEMON_USER,
            0o444,
            Arc::new(ScheduleFile::new(&job)),
        )?;
        Node::add_file(&dir, "cmd", DAEMON_USER, 0o444, Arc::new(CmdFile::new(&job)))?;
        Node::add_file(&dir, "log", DAEMON_USER, 0o444, Arc::new(LogFile::new(&job)))?;

        jobs.insert(name.clone(), Arc::clone(&job));
        info!(job = %name, "job registered");
        Ok(job)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.lock().unwrap().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Job>> {
        self.jobs.lock().unwrap().get(name).cloned()
    }

    /// Snapshot of every registered job.
    pub fn jobs(&self) -> Vec<Arc<Job>> {
        self.jobs.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().unwrap().is_empty()
    }
}
