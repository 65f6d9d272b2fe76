/// Slots kept per job.
pub const HISTORY_CAPACITY: usize = 32;

/// Fixed-capacity, overwrite-oldest sequence of log entries.
///
/// `push` overwrites the oldest slot and advances the cursor; `snapshot`
/// returns the current contents in insertion order, oldest first,
/// skipping empty slots.
#[derive(Debug)]
pub struct History {
    slots: Vec<Option<String>>,
    cursor: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            cursor: 0,
        }
    }

    pub fn push(&mut self, entry: String) {
        self.slots[self.cursor] = Some(entry);
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    pub fn snapshot(&self) -> Vec<String> {
        let capacity = self.slots.len();
        (0..capacity)
            .filter_map(|i| self.slots[(self.cursor + i) % capacity].clone())
            .collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
