//! Watch lists and the assignment trail used by the pre-check search.

/// A watched literal entry.
#[derive(Debug, Clone, Copy)]
pub struct Watch {
    /// The clause being watched.
    pub clause_id: usize,
    /// A literal of the clause whose truth makes the visit unnecessary.
    pub blocker: i64,
}

/// Watched literal data structure.
pub struct WatchedLiterals {
    /// For each literal, list of clauses watching it.
    watches: Vec<Vec<Watch>>,
}

impl WatchedLiterals {
    /// Creates a new watched literals structure.
    pub fn new(num_vars: usize) -> Self {
        // 2 * num_vars for positive and negative literals
        Self {
            watches: vec![Vec::new(); num_vars * 2],
        }
    }

    /// Converts a literal to an index.
    fn lit_to_index(lit: i64) -> usize {
        if lit > 0 {
            (lit as usize - 1) * 2
        } else {
            ((-lit) as usize - 1) * 2 + 1
        }
    }

    /// Adds a watch for a literal.
    pub fn add_watch(&mut self, lit: i64, clause_id: usize, blocker: i64) {
        let idx = Self::lit_to_index(lit);
        self.watches[idx].push(Watch { clause_id, blocker });
    }

    /// Gets mutable watches for a literal.
    pub fn get_watches_mut(&mut self, lit: i64) -> &mut Vec<Watch> {
        let idx = Self::lit_to_index(lit);
        &mut self.watches[idx]
    }
}

/// Assignment trail doubling as the propagation queue.
///
/// Literals before `head` have been propagated; the rest are pending.
pub struct PropagationQueue {
    queue: Vec<i64>,
    head: usize,
}

impl PropagationQueue {
    /// Creates a new propagation queue.
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            head: 0,
        }
    }

    /// Enqueues a literal for propagation.
    pub fn enqueue(&mut self, lit: i64) {
        self.queue.push(lit);
    }

    /// Dequeues the next literal.
    pub fn dequeue(&mut self) -> Option<i64> {
        if self.head < self.queue.len() {
            let lit = self.queue[self.head];
            self.head += 1;
            Some(lit)
        } else {
            None
        }
    }

    /// Number of literals on the trail.
    pub fn trail_len(&self) -> usize {
        self.queue.len()
    }

    /// Literals assigned at or after trail position `pos`.
    pub fn since(&self, pos: usize) -> &[i64] {
        &self.queue[pos.min(self.queue.len())..]
    }

    /// Drops every literal from trail position `len` on.
    pub fn truncate(&mut self, len: usize) {
        self.queue.truncate(len);
        self.head = self.head.min(len);
    }
}

impl Default for PropagationQueue {
    fn default() -> Self {
        Self::new()
    }
}
