//! Corpus access
//!
//! A corpus is an ordered, read-only sentence collection shared by all search
//! workers. `Treebank` is the in-memory implementation loaded from CoNLL-U.

use crate::conllu::{CoNLLUReader, ParseError};
use crate::tree::Tree;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structure kind a corpus offers to the matching engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Dependency trees: head pointers, relations, word features
    #[default]
    Dependency,
    /// Flat token sequences searched as contiguous n-grams
    Ngram,
    /// Coreference mentions: word spans grouped into entities
    Coreference,
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("sentence {index} is out of range (corpus has {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("sentence {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: ParseError,
    },

    #[error("corpus slice {start}..{end} is unavailable: {reason}")]
    Unavailable {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Glob(#[from] glob::PatternError),
}

/// Ordered, read-only sentence collection
///
/// Implementations must be safe to read from many worker threads at once.
pub trait Corpus: Send + Sync {
    /// Number of sentences
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sentence at `index`; errors are per-sentence and never fatal to a search
    fn sentence(&self, index: usize) -> Result<&Tree, CorpusError>;

    /// Whether sentences can be searched as the given content type
    fn supports(&self, content_type: ContentType) -> bool {
        matches!(
            content_type,
            ContentType::Dependency | ContentType::Ngram | ContentType::Coreference
        )
    }

    /// Called once by each worker before it reads its slice
    fn prepare(&self, _range: Range<usize>) -> Result<(), CorpusError> {
        Ok(())
    }
}

/// In-memory treebank
///
/// Malformed sentences keep their slot so sentence indices stay aligned with
/// the source text; reading one yields `CorpusError::Malformed`.
#[derive(Debug, Default)]
pub struct Treebank {
    sentences: Vec<Result<Tree, ParseError>>,
}

impl Treebank {
    pub fn from_trees(trees: Vec<Tree>) -> Self {
        Self {
            sentences: trees.into_iter().map(Ok).collect(),
        }
    }

    /// Load from an in-memory CoNLL-U string
    pub fn from_string(text: &str) -> Self {
        Self {
            sentences: CoNLLUReader::from_string(text).collect(),
        }
    }

    /// Load from a single file (plain or gzipped CoNLL-U)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let reader = CoNLLUReader::from_file(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            sentences: reader.collect(),
        })
    }

    /// Load from explicit file paths, in order
    ///
    /// Files that cannot be opened are logged and skipped.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        let mut sentences = Vec::new();
        for path in paths {
            match CoNLLUReader::from_file(path) {
                Ok(reader) => sentences.extend(reader),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable corpus file"),
            }
        }
        Self { sentences }
    }

    /// Load from a glob pattern; files are read in sorted order
    pub fn from_glob(pattern: &str) -> Result<Self, CorpusError> {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        paths.sort();
        Ok(Self::from_paths(&paths))
    }

    /// Number of sentences that failed to parse
    pub fn malformed_count(&self) -> usize {
        self.sentences.iter().filter(|s| s.is_err()).count()
    }
}

impl Corpus for Treebank {
    fn len(&self) -> usize {
        self.sentences.len()
    }

    fn sentence(&self, index: usize) -> Result<&Tree, CorpusError> {
        match self.sentences.get(index) {
            Some(Ok(tree)) => Ok(tree),
            Some(Err(e)) => Err(CorpusError::Malformed {
                index,
                source: e.clone(),
            }),
            None => Err(CorpusError::OutOfRange {
                index,
                len: self.sentences.len(),
            }),
        }
    }
}
