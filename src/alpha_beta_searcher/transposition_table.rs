//! Fixed-capacity transposition table for caching search results.
//!
//! Positions map to buckets by `hash % capacity`. Each bucket holds at most one entry,
//! which remembers the full hash it was created for. Touching a bucket with a different
//! full hash resets it, so the most recent position to reach a bucket owns it. Within the
//! same position, a stored record is only replaced by one searched at least as deep.

use log::trace;

use super::error::SearchError;
use super::traits::Score;

pub const DEFAULT_TABLE_CAPACITY: usize = 1 << 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeType {
    /// Exact value: the score landed inside the search window.
    Pv,
    /// Upper bound: no move beat alpha.
    All,
    /// Lower bound: a move reached beta.
    Cut,
}

impl NodeType {
    /// Classifies `score` against the window the node was searched with.
    ///
    /// A score equal to alpha is only an upper bound: every move may have failed low.
    pub fn classify(score: Score, alpha: Score, beta: Score) -> Self {
        if score <= alpha {
            NodeType::All
        } else if score >= beta {
            NodeType::Cut
        } else {
            NodeType::Pv
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TableRecord {
    pub depth: u8,
    pub score: Score,
    pub node_type: NodeType,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TableEntry {
    hash: u64,
    record: Option<TableRecord>,
}

impl TableEntry {
    fn empty(hash: u64) -> Self {
        Self { hash, record: None }
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn record(&self) -> Option<&TableRecord> {
        self.record.as_ref()
    }
    /// Depth of the stored record, `-1` when nothing has been stored yet.
    pub fn depth(&self) -> i16 {
        self.record.map_or(-1, |record| i16::from(record.depth))
    }

    /// Returns the record if it was searched at least `depth` deep.
    pub fn usable_at(&self, depth: u8) -> Option<&TableRecord> {
        self.record.as_ref().filter(|record| record.depth >= depth)
    }

    /// Writes the record unless the resident one was searched deeper.
    /// Returns whether the write happened.
    pub fn store(&mut self, depth: u8, score: Score, node_type: NodeType) -> bool {
        if i16::from(depth) < self.depth() {
            return false;
        }
        self.record = Some(TableRecord {
            depth,
            score,
            node_type,
        });
        true
    }
}

pub struct TranspositionTable {
    buckets: Vec<Option<TableEntry>>,
    lookups: usize,
    resets: usize,
    stores: usize,
    depth_rejected: usize,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TABLE_CAPACITY)
    }
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Result<Self, SearchError> {
        if capacity == 0 {
            return Err(SearchError::InvalidTableCapacity);
        }
        Ok(Self::with_capacity(capacity))
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: vec![None; capacity],
            lookups: 0,
            resets: 0,
            stores: 0,
            depth_rejected: 0,
        }
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Returns the entry for `hash`, creating it if the bucket is empty or was owned by a
    /// different position.
    pub fn entry(&mut self, hash: u64) -> &mut TableEntry {
        self.lookups += 1;
        let index = self.bucket_index(hash);

        let resident = self.buckets[index].as_ref().map(|entry| entry.hash);
        match resident {
            Some(resident) if resident == hash => {}
            Some(resident) => {
                trace!(
                    "bucket {} reset: {:#018x} replaced by {:#018x}",
                    index,
                    resident,
                    hash
                );
                self.resets += 1;
                self.buckets[index] = Some(TableEntry::empty(hash));
            }
            None => self.buckets[index] = Some(TableEntry::empty(hash)),
        }

        self.buckets[index].get_or_insert_with(|| TableEntry::empty(hash))
    }

    /// Peeks at the entry for `hash` without creating or resetting anything.
    pub fn get(&self, hash: u64) -> Option<&TableEntry> {
        self.buckets[self.bucket_index(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash)
    }

    /// Stores a search result, keeping a deeper resident record for the same position.
    /// Returns whether the write happened.
    pub fn store(&mut self, hash: u64, depth: u8, score: Score, node_type: NodeType) -> bool {
        let stored = self.entry(hash).store(depth, score, node_type);
        if stored {
            self.stores += 1;
        } else {
            self.depth_rejected += 1;
            trace!("store rejected for {:#018x} at depth {}", hash, depth);
        }
        stored
    }

    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|bucket| *bucket = None);
        self.lookups = 0;
        self.resets = 0;
        self.stores = 0;
        self.depth_rejected = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Number of occupied buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().filter(|bucket| bucket.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn stores(&self) -> usize {
        self.stores
    }

    pub fn depth_rejected(&self) -> usize {
        self.depth_rejected
    }
}
