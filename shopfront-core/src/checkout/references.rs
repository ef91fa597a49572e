use compact_str::CompactString;
use smallvec::SmallVec;

/// Bounded set of payment references.
///
/// Once full, the oldest reference is forgotten first.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    capacity: usize,
    seen: SmallVec<[CompactString; 8]>,
}

impl ReferenceSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            seen: SmallVec::new(),
        }
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.seen.iter().any(|r| r.as_str() == reference)
    }

    /// Record `reference`. Returns `false` if it was already recorded.
    pub fn insert(&mut self, reference: &str) -> bool {
        if self.contains(reference) {
            return false;
        }
        if self.seen.len() == self.capacity {
            self.seen.remove(0);
        }
        self.seen.push(CompactString::from(reference));
        true
    }

    pub fn remove(&mut self, reference: &str) {
        self.seen.retain(|r| r.as_str() != reference);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
