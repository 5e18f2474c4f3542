//! Entry building and the shared result cache
//!
//! Each worker owns an `EntryBuilder`. It turns raw matches into pending
//! entries (dedup key, positions, group labels) and flushes them into the
//! `ResultCache` once per sentence. The cache is the only structure workers
//! share for writing; a single mutex serializes commits and label interning.

use crate::cursor::{Cursor, CursorError};
use crate::matcher::{MatchSink, RawMatch};
use crate::options::SearchMode;
use crate::pattern::{GroupOwner, ValidatedPattern};
use crate::result::{ResultEntry, SearchResult, sort_entries};
use crate::search::Counters;
use crate::tree::WordId;
use lasso::{Key, Rodeo};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::ops::ControlFlow;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What makes two matches duplicates of each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep every match
    #[default]
    None,
    /// At most one entry per sentence; positions are not kept
    Sentence,
    /// One entry per (sentence, first word, last word)
    Span,
    /// One entry per (sentence, exact positions)
    Positions,
}

impl DedupPolicy {
    fn key(&self, sentence: usize, raw: RawMatch<'_>) -> Option<DedupKey> {
        match self {
            DedupPolicy::None => None,
            DedupPolicy::Sentence => Some(DedupKey::Sentence(sentence)),
            DedupPolicy::Span => {
                let (first, last) = raw.span();
                Some(DedupKey::Span(sentence, first, last))
            }
            DedupPolicy::Positions => Some(DedupKey::Positions(sentence, raw.positions.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Sentence(usize),
    Span(usize, WordId, WordId),
    Positions(usize, Box<[WordId]>),
}

/// A match waiting for its sentence to be flushed
#[derive(Debug, Clone)]
pub struct PendingEntry {
    key: Option<DedupKey>,
    positions: Option<Box<[WordId]>>,
    labels: Vec<String>,
}

/// Outcome of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// More entries are welcome
    Open,
    /// The result limit was reached
    Full,
    /// The cache was closed; nothing was stored
    Closed,
}

#[derive(Debug)]
enum Store {
    /// Counts only
    Null { count: usize },
    /// No group dimensions
    Flat { entries: Vec<ResultEntry> },
    /// One interner per group dimension
    Grouped {
        interners: Vec<Rodeo>,
        entries: Vec<ResultEntry>,
    },
}

#[derive(Debug)]
struct CacheInner {
    store: Store,
    seen: FxHashSet<DedupKey>,
    committed: usize,
    closed: bool,
    finished: bool,
}

#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    dimension_names: Vec<String>,
    limit: Option<usize>,
}

impl ResultCache {
    pub fn new(dimension_names: Vec<String>, collect_entries: bool, limit: Option<usize>) -> Self {
        let store = if !collect_entries {
            Store::Null { count: 0 }
        } else if dimension_names.is_empty() {
            Store::Flat {
                entries: Vec::new(),
            }
        } else {
            Store::Grouped {
                interners: dimension_names.iter().map(|_| Rodeo::default()).collect(),
                entries: Vec::new(),
            }
        };
        Self {
            inner: Mutex::new(CacheInner {
                store,
                seen: FxHashSet::default(),
                committed: 0,
                closed: false,
                finished: false,
            }),
            dimension_names,
            limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether entries (and so group labels) are kept
    pub fn collects_entries(&self) -> bool {
        !matches!(self.lock().store, Store::Null { .. })
    }

    pub fn dimension_count(&self) -> usize {
        self.dimension_names.len()
    }

    /// Store a sentence's pending entries
    ///
    /// Duplicates (by dedup key) are dropped silently. Nothing is stored once
    /// the cache is closed or the result limit is reached.
    pub fn commit(
        &self,
        sentence: usize,
        batch: impl IntoIterator<Item = PendingEntry>,
        counters: &mut Counters,
    ) -> CommitStatus {
        let mut inner = self.lock();
        if inner.closed {
            return CommitStatus::Closed;
        }

        for pending in batch {
            if self.limit.is_some_and(|limit| inner.committed >= limit) {
                break;
            }
            if let Some(key) = pending.key
                && !inner.seen.insert(key)
            {
                continue;
            }

            match &mut inner.store {
                Store::Null { count } => *count += 1,
                Store::Flat { entries } => entries.push(ResultEntry {
                    sentence,
                    positions: pending.positions,
                    coordinate: Box::default(),
                }),
                Store::Grouped { interners, entries } => {
                    let coordinate = interners
                        .iter_mut()
                        .zip(&pending.labels)
                        .map(|(interner, label)| interner.get_or_intern(label).into_usize() as u32)
                        .collect();
                    entries.push(ResultEntry {
                        sentence,
                        positions: pending.positions,
                        coordinate,
                    });
                }
            }
            inner.committed += 1;
            counters.returned_items += 1;
        }

        if self.limit.is_some_and(|limit| inner.committed >= limit) {
            CommitStatus::Full
        } else {
            CommitStatus::Open
        }
    }

    /// Refuse all further commits
    pub fn close(&self) {
        self.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.lock().committed
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the cache and build the result; only the first call gets one
    pub fn finish(&self) -> Option<SearchResult> {
        let mut inner = self.lock();
        if inner.finished {
            return None;
        }
        inner.finished = true;
        inner.closed = true;
        inner.seen = FxHashSet::default();

        let store = std::mem::replace(&mut inner.store, Store::Null { count: 0 });
        let names = self.dimension_names.iter().cloned();
        Some(match store {
            Store::Null { count } => SearchResult::new(names.map(|n| (n, Vec::new())).collect(), Vec::new(), count),
            Store::Flat { entries } => {
                let total = entries.len();
                SearchResult::new(Vec::new(), entries, total)
            }
            Store::Grouped { interners, mut entries } => {
                sort_entries(&mut entries);
                let labels = renumber(&interners, &mut entries);
                let dimensions = names.zip(labels).collect();
                let total = entries.len();
                SearchResult::new(dimensions, entries, total)
            }
        })
    }
}

/// Reassign instance ids by first appearance over sorted entries
///
/// Interning order follows commit order, which depends on worker timing.
fn renumber(interners: &[Rodeo], entries: &mut [ResultEntry]) -> Vec<Vec<String>> {
    let interned: Vec<Vec<&str>> = interners.iter().map(|i| i.strings().collect()).collect();
    let mut remap: Vec<Vec<Option<u32>>> = interned.iter().map(|l| vec![None; l.len()]).collect();
    let mut labels: Vec<Vec<String>> = vec![Vec::new(); interned.len()];
    for entry in entries {
        for (d, id) in entry.coordinate.iter_mut().enumerate() {
            let old = *id as usize;
            *id = *remap[d][old].get_or_insert_with(|| {
                labels[d].push(interned[d][old].to_string());
                (labels[d].len() - 1) as u32
            });
        }
    }
    labels
}

/// Per-worker `MatchSink` feeding a `ResultCache`
pub struct EntryBuilder<'s> {
    pattern: &'s ValidatedPattern,
    cache: &'s ResultCache,
    policy: DedupPolicy,
    mode: SearchMode,
    project: bool,
    sentence: usize,
    pending: Vec<PendingEntry>,
}

impl<'s> EntryBuilder<'s> {
    pub fn new(
        pattern: &'s ValidatedPattern,
        cache: &'s ResultCache,
        policy: DedupPolicy,
        mode: SearchMode,
    ) -> Self {
        Self {
            pattern,
            cache,
            policy,
            mode,
            project: cache.collects_entries() && cache.dimension_count() > 0,
            sentence: 0,
            pending: Vec::new(),
        }
    }

    /// Start collecting matches for a sentence, discarding anything unflushed
    pub fn begin(&mut self, sentence: usize) {
        self.sentence = sentence;
        self.pending.clear();
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Commit the current sentence's matches
    pub fn flush(&mut self, counters: &mut Counters) -> CommitStatus {
        if self.pending.is_empty() {
            return if self.cache.is_closed() {
                CommitStatus::Closed
            } else {
                CommitStatus::Open
            };
        }
        self.cache
            .commit(self.sentence, self.pending.drain(..), counters)
    }

    fn labels(&self, cursor: &mut Cursor<'_>, raw: RawMatch<'_>) -> Result<Vec<String>, CursorError> {
        if !self.project {
            return Ok(Vec::new());
        }
        let mut labels = Vec::with_capacity(self.pattern.dimensions().len());
        for dimension in self.pattern.dimensions() {
            match dimension.owner {
                GroupOwner::Node(n) => cursor.move_to(raw.positions[n])?,
                GroupOwner::Edge(e) => {
                    let edge = &self.pattern.edges()[e];
                    cursor.move_to_edge(raw.positions[edge.source], raw.positions[edge.target])?;
                }
            }
            labels.push(self.pattern.dimension_constraint(dimension).project(cursor)?);
        }
        Ok(labels)
    }
}

impl MatchSink for EntryBuilder<'_> {
    fn accept(
        &mut self,
        cursor: &mut Cursor<'_>,
        raw: RawMatch<'_>,
        _counters: &mut Counters,
    ) -> Result<ControlFlow<()>, CursorError> {
        let key = self.policy.key(self.sentence, raw);
        let duplicate = key
            .as_ref()
            .is_some_and(|k| self.pending.iter().any(|p| p.key.as_ref() == Some(k)));

        if !duplicate {
            let labels = self.labels(cursor, raw)?;
            let positions = match self.policy {
                DedupPolicy::Sentence => None,
                _ => Some(raw.positions.into()),
            };
            self.pending.push(PendingEntry {
                key,
                positions,
                labels,
            });
        }

        Ok(match self.mode {
            SearchMode::FirstPerSentence => ControlFlow::Break(()),
            SearchMode::Exhaustive => ControlFlow::Continue(()),
        })
    }
}
