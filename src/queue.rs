//! Work queue of domain names awaiting submission.
//!
//! Plain ordered storage, mutated only by the resolver. Sorting and
//! deduplication are separate passes so callers may skip either one;
//! both must happen before the first name is popped.

/// Ordered collection of pending domain names.
pub struct WorkQueue {
    names: Vec<String>,
    draining: bool,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            draining: false,
        }
    }

    /// Append a name. Empty strings are dropped, never enqueued.
    pub fn push(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.names.push(name.to_string());
    }

    /// Order the queue by byte-wise comparison. Case is significant.
    ///
    /// # Panics
    ///
    /// Panics if any name has already been popped: reordering a queue
    /// that is being drained would silently skip or repeat names.
    pub fn sort(&mut self) {
        assert!(!self.draining, "cannot sort a draining work queue");
        self.names.sort();
    }

    /// Collapse adjacent runs of equal names. Meaningful after [`sort`];
    /// on an unsorted queue only neighboring duplicates are removed.
    ///
    /// # Panics
    ///
    /// Panics if any name has already been popped.
    ///
    /// [`sort`]: WorkQueue::sort
    pub fn dedup(&mut self) {
        assert!(!self.draining, "cannot deduplicate a draining work queue");
        self.names.dedup();
    }

    /// Remove and return one name, or `None` when the queue is empty.
    ///
    /// Pops from the end. No particular order is promised to callers:
    /// completion order is non-deterministic under concurrency anyway.
    pub fn pop_next(&mut self) -> Option<String> {
        let popped = self.names.pop();
        if popped.is_some() {
            self.draining = true;
        }
        popped
    }

    /// Remove the first queued occurrence of `name`. Returns whether
    /// anything was removed.
    pub fn cancel(&mut self, name: &str) -> bool {
        match self.names.iter().position(|queued| queued == name) {
            Some(index) => {
                self.names.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
