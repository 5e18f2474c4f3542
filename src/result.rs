//! Search results
//!
//! A `SearchResult` is built once, when a search finishes, and is read-only
//! afterwards. Entries are bucketed by their group coordinate: one interned
//! instance id per group dimension.

use crate::corpus::{ContentType, Corpus, CorpusError};
use crate::tree::WordId;
use rustc_hash::FxHashMap;

/// One committed match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub sentence: usize,
    /// Word bound to each pattern node; absent when only sentences are kept
    pub positions: Option<Box<[WordId]>>,
    /// Instance id per group dimension
    pub coordinate: Box<[u32]>,
}

/// An entry resolved against its corpus
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedEntry {
    pub sentence: usize,
    pub text: String,
    /// (position, form) per pattern node; mention text for coreference
    pub words: Vec<(WordId, String)>,
    /// Group label per dimension
    pub labels: Vec<String>,
}

#[derive(Debug, Clone)]
struct Dimension {
    name: String,
    labels: Vec<String>,
    index: FxHashMap<String, u32>,
}

impl Dimension {
    fn new(name: String, labels: Vec<String>) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as u32))
            .collect();
        Self { name, labels, index }
    }
}

/// Sentence order, then positions
pub(crate) fn sort_entries(entries: &mut [ResultEntry]) {
    entries.sort_by(|a, b| {
        a.sentence
            .cmp(&b.sentence)
            .then_with(|| a.positions.cmp(&b.positions))
    });
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    dimensions: Vec<Dimension>,
    entries: Vec<ResultEntry>,
    groups: FxHashMap<Box<[u32]>, Vec<usize>>,
    total: usize,
    content_type: ContentType,
}

impl SearchResult {
    /// `total` counts matches even when entries were not kept
    pub(crate) fn new(
        dimensions: Vec<(String, Vec<String>)>,
        mut entries: Vec<ResultEntry>,
        total: usize,
    ) -> Self {
        sort_entries(&mut entries);
        let mut groups: FxHashMap<Box<[u32]>, Vec<usize>> = FxHashMap::default();
        for (i, entry) in entries.iter().enumerate() {
            groups.entry(entry.coordinate.clone()).or_default().push(i);
        }
        Self {
            dimensions: dimensions
                .into_iter()
                .map(|(name, labels)| Dimension::new(name, labels))
                .collect(),
            total: total.max(entries.len()),
            entries,
            groups,
            content_type: ContentType::default(),
        }
    }

    /// What entry positions index: words, or mentions for coreference
    pub(crate) fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimension_name(&self, dimension: usize) -> Option<&str> {
        self.dimensions.get(dimension).map(|d| d.name.as_str())
    }

    /// Number of distinct labels seen on a dimension
    pub fn instance_count(&self, dimension: usize) -> usize {
        self.dimensions.get(dimension).map_or(0, |d| d.labels.len())
    }

    pub fn instance_label(&self, dimension: usize, instance: u32) -> Option<&str> {
        self.dimensions
            .get(dimension)?
            .labels
            .get(instance as usize)
            .map(String::as_str)
    }

    pub fn instance_index(&self, dimension: usize, label: &str) -> Option<u32> {
        self.dimensions.get(dimension)?.index.get(label).copied()
    }

    pub fn total_match_count(&self) -> usize {
        self.total
    }

    /// Entries in one group
    pub fn match_count(&self, coordinate: &[u32]) -> usize {
        self.groups.get(coordinate).map_or(0, Vec::len)
    }

    /// `index`-th entry of a group, in sentence order
    pub fn entry(&self, coordinate: &[u32], index: usize) -> Option<&ResultEntry> {
        let &i = self.groups.get(coordinate)?.get(index)?;
        self.entries.get(i)
    }

    /// All entries, in sentence order
    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    /// Coordinates of the non-empty groups, sorted
    pub fn group_coordinates(&self) -> Vec<&[u32]> {
        let mut coordinates: Vec<&[u32]> = self.groups.keys().map(|c| &**c).collect();
        coordinates.sort();
        coordinates
    }

    /// Sentence index of every entry (one per entry, sorted)
    pub fn sentence_indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.sentence).collect()
    }

    /// Resolve an entry's positions and labels against the corpus
    pub fn annotate<C: Corpus + ?Sized>(
        &self,
        entry: &ResultEntry,
        corpus: &C,
    ) -> Result<AnnotatedEntry, CorpusError> {
        let tree = corpus.sentence(entry.sentence)?;
        let words = entry
            .positions
            .iter()
            .flat_map(|positions| positions.iter())
            .filter_map(|&p| match self.content_type {
                ContentType::Coreference => tree.mention_text(p).map(|text| (p, text)),
                _ => tree.word(p).map(|w| (p, w.form.clone())),
            })
            .collect();
        let labels = entry
            .coordinate
            .iter()
            .enumerate()
            .map(|(d, &i)| self.instance_label(d, i).unwrap_or_default().to_string())
            .collect();
        Ok(AnnotatedEntry {
            sentence: entry.sentence,
            text: tree.text(),
            words,
            labels,
        })
    }

    /// Sub-result keeping only the given dimensions, in the given order
    ///
    /// Groups that differ only on dropped dimensions are merged. Returns
    /// `None` if a dimension index is out of range.
    pub fn project(&self, dimensions: &[usize]) -> Option<SearchResult> {
        if dimensions.iter().any(|&d| d >= self.dimensions.len()) {
            return None;
        }
        let kept = dimensions
            .iter()
            .map(|&d| {
                let dim = &self.dimensions[d];
                (dim.name.clone(), dim.labels.clone())
            })
            .collect();
        let entries = self
            .entries
            .iter()
            .map(|entry| ResultEntry {
                coordinate: dimensions.iter().map(|&d| entry.coordinate[d]).collect(),
                ..entry.clone()
            })
            .collect();
        Some(SearchResult::new(kept, entries, self.total).with_content_type(self.content_type))
    }
}
