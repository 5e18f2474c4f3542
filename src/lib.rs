//! Treequest: parallel structural search over dependency treebanks
//!
//! A query is a small graph of constrained nodes and edges. It is validated
//! against the constraint capabilities of a content type, then run over a
//! corpus by a pool of workers. Matches are deduplicated and grouped into a
//! multi-dimensional result.
//!
//! ```no_run
//! use std::sync::Arc;
//! use treequest::{
//!     ConstraintContext, EdgeType, Operator, PatternGraph, PatternNode, Search, SearchOptions,
//!     Treebank,
//! };
//!
//! let context = ConstraintContext::dependency();
//! let mut graph = PatternGraph::new();
//! let head = graph.add_node(
//!     PatternNode::new("head").with_constraint(context.node("pos", Operator::Equals, "VERB")?),
//! );
//! let dep = graph.add_node(PatternNode::new("dep").with_constraint(context.group("lemma")?));
//! graph.connect(head, dep, EdgeType::Dominance);
//! let pattern = graph.validate(&context)?;
//!
//! let corpus = Arc::new(Treebank::from_glob("corpus/*.conllu")?);
//! let search = Search::new(&pattern, corpus, SearchOptions::default())?;
//! search.execute()?;
//! let result = search.result().unwrap();
//! println!("{} matches", result.total_match_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache; // Entry building, dedup, grouped result cache
pub mod conllu; // CoNLL-U file parsing
pub mod constraint; // Constraint factories, constraints, registries
pub mod corpus; // Corpus trait and in-memory treebank
pub mod cursor; // Flyweight sentence navigator
pub mod matcher; // Tree and n-gram matchers
pub mod operator; // Comparison operators
pub mod options; // Search options and TOML loading
pub mod pattern; // Pattern graphs and validation
pub mod result; // Read-only search results
pub mod search; // Parallel search orchestration
pub mod tree; // Sentence data structures
pub mod value; // Constraint values and extracted features

// Re-exports for convenience
pub use cache::{CommitStatus, DedupPolicy, EntryBuilder, ResultCache};
pub use conllu::{CoNLLUReader, ParseError};
pub use constraint::{Constraint, ConstraintContext, ConstraintError, ConstraintFactory, ConstraintType, Extractor};
pub use corpus::{ContentType, Corpus, CorpusError, Treebank};
pub use cursor::{Cursor, CursorError};
pub use matcher::{MatchSink, MatchState, Matcher, NgramMatcher, RawMatch, TreeMatcher};
pub use operator::Operator;
pub use options::{OptionsError, SearchMode, SearchOptions, WindowBounds};
pub use pattern::{
    EdgeType, GroupDimension, GroupOwner, NodeType, PatternEdge, PatternError, PatternGraph, PatternNode,
    ValidatedPattern,
};
pub use result::{AnnotatedEntry, ResultEntry, SearchResult};
pub use search::{Counters, PerformanceStats, Search, SearchError, SearchState};
pub use tree::{Features, Mention, MentionId, TokenId, Tree, Word, WordId};
pub use value::{FeatureValue, Value, ValueKind};
