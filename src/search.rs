//! Parallel search orchestration
//!
//! A `Search` runs one validated pattern over one corpus, once. `execute`
//! splits the corpus into contiguous slices and runs one worker per slice on
//! a rayon pool. Workers own their cursor, match state and entry builder;
//! the only shared writable structure is the result cache.
//!
//! Lifecycle: `Blank -> Running -> {Done, Cancelled}`.

use crate::cache::{CommitStatus, DedupPolicy, EntryBuilder, ResultCache};
use crate::constraint::ConstraintError;
use crate::corpus::{ContentType, Corpus};
use crate::cursor::Cursor;
use crate::matcher::{self, MatchState, Matcher};
use crate::options::{OptionsError, SearchOptions};
use crate::pattern::ValidatedPattern;
use crate::result::SearchResult;
use rayon::prelude::*;
use std::ops::{AddAssign, ControlFlow, Range};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SearchState {
    Blank = 0,
    Running = 1,
    Done = 2,
    Cancelled = 3,
}

impl SearchState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SearchState::Blank,
            1 => SearchState::Running,
            2 => SearchState::Done,
            _ => SearchState::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchState::Done | SearchState::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("cannot {action} a search in state {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SearchState,
    },

    #[error("corpus does not provide {0:?} content")]
    UnsupportedContent(ContentType),

    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("worker {worker} failed: {message}")]
    WorkerFailed { worker: usize, message: String },
}

/// Per-worker work counters, summed when the search ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub visited_nodes: u64,
    pub visited_edges: u64,
    pub checked_constraints: u64,
    /// Sentences looked at
    pub processed_items: u64,
    /// Sentences skipped because they could not be read or evaluated
    pub ignored_items: u64,
    /// Complete assignments found by the matcher
    pub matched_items: u64,
    /// Entries stored in the result
    pub returned_items: u64,
}

impl AddAssign for Counters {
    fn add_assign(&mut self, other: Self) {
        self.visited_nodes += other.visited_nodes;
        self.visited_edges += other.visited_edges;
        self.checked_constraints += other.checked_constraints;
        self.processed_items += other.processed_items;
        self.ignored_items += other.ignored_items;
        self.matched_items += other.matched_items;
        self.returned_items += other.returned_items;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceStats {
    pub counters: Counters,
    pub duration: Duration,
    pub workers: usize,
}

pub struct Search<C: Corpus> {
    pattern: Arc<ValidatedPattern>,
    corpus: Arc<C>,
    options: SearchOptions,
    matcher: Box<dyn Matcher>,
    dedup: DedupPolicy,
    cache: ResultCache,
    state: AtomicU8,
    cancelled: AtomicBool,
    limit_reached: AtomicBool,
    failed: AtomicBool,
    processed: AtomicUsize,
    failure: Mutex<Option<String>>,
    result: OnceLock<Arc<SearchResult>>,
    stats: OnceLock<PerformanceStats>,
}

impl<C: Corpus> Search<C> {
    /// Prepare a search; the pattern's constraints are copied, never shared
    pub fn new(query: &ValidatedPattern, corpus: Arc<C>, options: SearchOptions) -> Result<Self, SearchError> {
        options.validate()?;
        let content_type = query.content_type();
        if !corpus.supports(content_type) {
            return Err(SearchError::UnsupportedContent(content_type));
        }

        let pattern = Arc::new(query.with_case_insensitive(options.case_insensitive)?);
        let matcher = matcher::for_pattern(Arc::clone(&pattern), options.window);
        let dedup = options.dedup.unwrap_or_else(|| matcher.default_dedup());
        let names = pattern.dimensions().iter().map(|d| d.name.clone()).collect();
        let cache = ResultCache::new(names, options.collect_entries, options.result_limit);

        Ok(Self {
            pattern,
            corpus,
            options,
            matcher,
            dedup,
            cache,
            state: AtomicU8::new(SearchState::Blank as u8),
            cancelled: AtomicBool::new(false),
            limit_reached: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            processed: AtomicUsize::new(0),
            failure: Mutex::new(None),
            result: OnceLock::new(),
            stats: OnceLock::new(),
        })
    }

    fn transition(&self, from: SearchState, to: SearchState, action: &'static str) -> Result<(), SearchError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| SearchError::InvalidTransition {
                action,
                state: SearchState::from_u8(actual),
            })
    }

    /// Run the search to completion on the calling thread's behalf
    ///
    /// Blocks until every worker has finished or stopped. Returns the
    /// terminal state; a worker failure cancels the search and is returned
    /// as `SearchError::WorkerFailed`.
    pub fn execute(&self) -> Result<SearchState, SearchError> {
        self.transition(SearchState::Blank, SearchState::Running, "execute")?;
        let start = Instant::now();

        let total = self.corpus.len();
        let slices = split(total, self.options.worker_count());
        let workers = slices.len();
        debug!(sentences = total, workers, dedup = ?self.dedup, "starting search");

        let outcomes = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("treequest-worker-{}", i))
            .build()
        {
            Ok(pool) => pool.install(|| {
                slices
                    .into_par_iter()
                    .enumerate()
                    .map(|(id, range)| Worker::run(self, id, range))
                    .collect::<Vec<_>>()
            }),
            Err(e) => vec![Err(SearchError::Pool(e))],
        };

        let mut counters = Counters::default();
        let mut failure = None;
        for outcome in outcomes {
            match outcome {
                Ok(worker_counters) => counters += worker_counters,
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        let state = if let Some(e) = &failure {
            self.record_failure(e);
            // cancel() may have won the race already
            let _ = self.transition(SearchState::Running, SearchState::Cancelled, "fail");
            SearchState::Cancelled
        } else {
            match self.transition(SearchState::Running, SearchState::Done, "finish") {
                Ok(()) => SearchState::Done,
                Err(_) => SearchState::Cancelled,
            }
        };

        self.cache.close();
        if let Some(result) = self.cache.finish() {
            let result = result.with_content_type(self.pattern.content_type());
            let _ = self.result.set(Arc::new(result));
        }
        let stats = PerformanceStats {
            counters,
            duration: start.elapsed(),
            workers,
        };
        let _ = self.stats.set(stats);

        info!(
            state = ?state,
            entries = counters.returned_items,
            matches = counters.matched_items,
            ignored = counters.ignored_items,
            limit_reached = self.limit_reached.load(Ordering::Relaxed),
            duration_ms = stats.duration.as_millis() as u64,
            "search finished"
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(state),
        }
    }

    /// Stop a running search
    ///
    /// The search is `Cancelled` as soon as this returns and no entry is
    /// committed afterwards; workers stop after their current sentence.
    pub fn cancel(&self) -> Result<(), SearchError> {
        self.transition(SearchState::Running, SearchState::Cancelled, "cancel")?;
        self.cancelled.store(true, Ordering::Release);
        self.cache.close();
        debug!("search cancelled");
        Ok(())
    }

    fn record_failure(&self, e: &SearchError) {
        self.failed.store(true, Ordering::Release);
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if failure.is_none() {
            error!(error = %e, "search failed");
            *failure = Some(e.to_string());
        }
    }

    fn should_stop(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.failed.load(Ordering::Acquire)
            || self.limit_reached.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SearchState {
        SearchState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Approximate share of the corpus processed, 0.0 to 100.0
    pub fn progress(&self) -> f64 {
        if self.state() == SearchState::Done {
            return 100.0;
        }
        let total = self.corpus.len();
        if total == 0 {
            return 0.0;
        }
        let processed = self.processed.load(Ordering::Relaxed).min(total);
        processed as f64 * 100.0 / total as f64
    }

    /// The result, once `execute` has returned
    pub fn result(&self) -> Option<Arc<SearchResult>> {
        self.result.get().cloned()
    }

    pub fn stats(&self) -> Option<PerformanceStats> {
        self.stats.get().copied()
    }

    /// Message of the failure that ended the search, if any
    pub fn failure(&self) -> Option<String> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn pattern(&self) -> &ValidatedPattern {
        &self.pattern
    }

    pub fn corpus(&self) -> &Arc<C> {
        &self.corpus
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        self.dedup
    }
}

/// Contiguous slices covering `0..total`, at most `parts` of them
fn split(total: usize, parts: usize) -> Vec<Range<usize>> {
    let size = total.div_ceil(parts.max(1)).max(1);
    (0..total)
        .step_by(size)
        .map(|start| start..(start + size).min(total))
        .collect()
}

struct Worker<'s, C: Corpus> {
    search: &'s Search<C>,
    id: usize,
    range: Range<usize>,
    cursor: Cursor<'s>,
    state: MatchState,
    builder: EntryBuilder<'s>,
    counters: Counters,
}

impl<'s, C: Corpus> Worker<'s, C> {
    fn run(search: &'s Search<C>, id: usize, range: Range<usize>) -> Result<Counters, SearchError> {
        let mut worker = match Worker::init(search, id, range) {
            Ok(worker) => worker,
            Err(e) => {
                search.record_failure(&e);
                return Err(e);
            }
        };
        for index in worker.range.clone() {
            if search.should_stop() {
                break;
            }
            let flow = worker.process(index);
            search.processed.fetch_add(1, Ordering::Relaxed);
            if flow.is_break() {
                break;
            }
        }
        Ok(worker.cleanup())
    }

    fn init(search: &'s Search<C>, id: usize, range: Range<usize>) -> Result<Self, SearchError> {
        search
            .corpus
            .prepare(range.clone())
            .map_err(|e| SearchError::WorkerFailed {
                worker: id,
                message: e.to_string(),
            })?;
        debug!(worker = id, start = range.start, end = range.end, "worker started");

        Ok(Self {
            search,
            id,
            range,
            cursor: Cursor::new(),
            state: MatchState::new(),
            builder: EntryBuilder::new(&search.pattern, &search.cache, search.dedup, search.options.mode),
            counters: Counters::default(),
        })
    }

    /// Match one sentence; errors skip the sentence and never end the search
    fn process(&mut self, index: usize) -> ControlFlow<()> {
        let search = self.search;
        self.counters.processed_items += 1;

        let tree = match search.corpus.sentence(index) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(worker = self.id, sentence = index, error = %e, "skipping sentence");
                self.counters.ignored_items += 1;
                return ControlFlow::Continue(());
            }
        };

        self.cursor.attach_as(tree, search.pattern.content_type());
        self.builder.begin(index);
        let found = search.matcher.find_matches(
            &mut self.cursor,
            &mut self.state,
            &mut self.builder,
            &mut self.counters,
        );
        if let Err(e) = found {
            warn!(worker = self.id, sentence = index, error = %e, "skipping sentence");
            self.counters.ignored_items += 1;
            self.builder.begin(index);
            return ControlFlow::Continue(());
        }

        match self.builder.flush(&mut self.counters) {
            CommitStatus::Open => ControlFlow::Continue(()),
            CommitStatus::Full => {
                search.limit_reached.store(true, Ordering::Release);
                ControlFlow::Break(())
            }
            CommitStatus::Closed => ControlFlow::Break(()),
        }
    }

    fn cleanup(mut self) -> Counters {
        self.cursor.clear();
        debug!(
            worker = self.id,
            processed = self.counters.processed_items,
            matched = self.counters.matched_items,
            returned = self.counters.returned_items,
            "worker finished"
        );
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintContext;
    use crate::corpus::{CorpusError, Treebank};
    use crate::operator::Operator;
    use crate::options::SearchMode;
    use crate::pattern::{EdgeType, PatternGraph, PatternNode};
    use crate::tree::Tree;
    use std::sync::Barrier;

    /// Three sentences; a NOUN heads an `obj` dependent only in the second
    fn create_test_corpus() -> Treebank {
        Treebank::from_trees(vec![
            Tree::from_rows(&[
                ("Dogs", "NOUN", "nsubj", Some(1)),
                ("bark", "VERB", "root", None),
            ]),
            Tree::from_rows(&[
                ("fear", "NOUN", "root", None),
                ("of", "ADP", "case", Some(2)),
                ("dogs", "NOUN", "obj", Some(0)),
            ]),
            Tree::from_rows(&[
                ("She", "PRON", "nsubj", Some(1)),
                ("reads", "VERB", "root", None),
                ("books", "NOUN", "obj", Some(1)),
            ]),
        ])
    }

    fn noun_dominates_obj() -> ValidatedPattern {
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        let head = graph.add_node(
            PatternNode::new("head").with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap()),
        );
        let dep = graph.add_node(
            PatternNode::new("dep").with_constraint(context.node("relation", Operator::Equals, "obj").unwrap()),
        );
        graph.connect(head, dep, EdgeType::Dominance);
        graph.validate(&context).unwrap()
    }

    fn run(pattern: &ValidatedPattern, corpus: Treebank, options: SearchOptions) -> Search<Treebank> {
        let search = Search::new(pattern, Arc::new(corpus), options).unwrap();
        assert_eq!(search.execute().unwrap(), SearchState::Done);
        search
    }

    #[test]
    fn test_noun_dominates_obj() {
        let search = run(&noun_dominates_obj(), create_test_corpus(), SearchOptions::default());
        let result = search.result().unwrap();

        assert_eq!(result.total_match_count(), 1);
        assert_eq!(result.sentence_indices(), vec![1]);
        assert_eq!(result.entries()[0].positions.as_deref(), Some(&[0, 2][..]));
        assert_eq!(search.progress(), 100.0);

        let stats = search.stats().unwrap();
        assert_eq!(stats.counters.processed_items, 3);
        assert_eq!(stats.counters.returned_items, 1);
    }

    #[test]
    fn test_no_match_gives_empty_result() {
        let corpus = Treebank::from_trees(vec![Tree::from_rows(&[("Hello", "INTJ", "root", None)])]);
        let search = run(&noun_dominates_obj(), corpus, SearchOptions::default());

        assert_eq!(search.result().unwrap().total_match_count(), 0);
    }

    #[test]
    fn test_grouping_by_pos() {
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        graph.add_node(
            PatternNode::new("w")
                .with_constraint(context.node("pos", Operator::Matches, "^(NOUN|VERB)$").unwrap())
                .with_constraint(context.group("pos").unwrap()),
        );
        let pattern = graph.validate(&context).unwrap();
        let search = run(&pattern, create_test_corpus(), SearchOptions::default().with_workers(2));
        let result = search.result().unwrap();

        assert_eq!(result.dimension_count(), 1);
        assert_eq!(result.instance_count(0), 2);
        let noun = result.instance_index(0, "NOUN").unwrap();
        let verb = result.instance_index(0, "VERB").unwrap();
        assert_eq!(result.match_count(&[noun]), 4);
        assert_eq!(result.match_count(&[verb]), 2);
        assert_eq!(result.instance_index(0, "PRON"), None);
        assert_eq!(result.instance_index(0, "ADP"), None);
    }

    #[test]
    fn test_worker_counts_agree() {
        let pattern = noun_dominates_obj();
        let mut single = run(&pattern, create_test_corpus(), SearchOptions::default().with_workers(1))
            .result()
            .unwrap()
            .sentence_indices();
        let mut many = run(&pattern, create_test_corpus(), SearchOptions::default().with_workers(3))
            .result()
            .unwrap()
            .sentence_indices();
        single.sort();
        many.sort();
        assert_eq!(single, many);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let search = Search::new(
            &noun_dominates_obj(),
            Arc::new(create_test_corpus()),
            SearchOptions::default(),
        )
        .unwrap();

        assert_eq!(search.state(), SearchState::Blank);
        assert!(!search.is_done());
        assert!(search.result().is_none());
        assert!(matches!(
            search.cancel(),
            Err(SearchError::InvalidTransition { state: SearchState::Blank, .. })
        ));

        search.execute().unwrap();
        assert!(search.is_done());
        assert!(matches!(
            search.execute(),
            Err(SearchError::InvalidTransition { state: SearchState::Done, .. })
        ));
        assert!(search.cancel().is_err());
    }

    /// Blocks inside the first sentence until the test lets it go
    struct GatedCorpus {
        inner: Treebank,
        entered: Barrier,
        release: Barrier,
    }

    impl Corpus for GatedCorpus {
        fn len(&self) -> usize {
            self.inner.len()
        }

        fn sentence(&self, index: usize) -> Result<&Tree, CorpusError> {
            if index == 0 {
                self.entered.wait();
                self.release.wait();
            }
            self.inner.sentence(index)
        }
    }

    #[test]
    fn test_cancel_stops_commits() {
        let corpus = GatedCorpus {
            inner: Treebank::from_trees(vec![
                Tree::from_rows(&[("books", "NOUN", "root", None)]),
                Tree::from_rows(&[("pens", "NOUN", "root", None)]),
            ]),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        };
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("n").with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap()));
        let pattern = graph.validate(&context).unwrap();

        let search = Arc::new(Search::new(&pattern, Arc::new(corpus), SearchOptions::default().with_workers(1)).unwrap());
        let runner = {
            let search = Arc::clone(&search);
            std::thread::spawn(move || search.execute())
        };

        search.corpus().entered.wait();
        assert_eq!(search.state(), SearchState::Running);
        search.cancel().unwrap();
        assert!(search.is_done());
        search.corpus().release.wait();

        assert_eq!(runner.join().unwrap().unwrap(), SearchState::Cancelled);
        assert_eq!(search.state(), SearchState::Cancelled);
        assert_eq!(search.result().unwrap().total_match_count(), 0);
        assert!(search.progress() < 100.0);
    }

    struct BrokenCorpus;

    impl Corpus for BrokenCorpus {
        fn len(&self) -> usize {
            4
        }

        fn sentence(&self, index: usize) -> Result<&Tree, CorpusError> {
            Err(CorpusError::OutOfRange { index, len: 0 })
        }

        fn prepare(&self, range: Range<usize>) -> Result<(), CorpusError> {
            Err(CorpusError::Unavailable {
                start: range.start,
                end: range.end,
                reason: "storage offline".to_string(),
            })
        }
    }

    #[test]
    fn test_worker_failure_cancels_search() {
        let search = Search::new(
            &noun_dominates_obj(),
            Arc::new(BrokenCorpus),
            SearchOptions::default().with_workers(2),
        )
        .unwrap();

        assert!(matches!(search.execute(), Err(SearchError::WorkerFailed { .. })));
        assert_eq!(search.state(), SearchState::Cancelled);
        assert!(search.failure().unwrap().contains("storage offline"));
        assert_eq!(search.result().unwrap().total_match_count(), 0);
    }

    #[test]
    fn test_malformed_sentences_are_ignored() {
        let conllu = "1\tbooks\tbook\tNOUN\t_\t_\t7\tobj\t_\t_\n\n\
                      1\tfear\tfear\tNOUN\t_\t_\t0\troot\t_\t_\n\
                      2\tdogs\tdog\tNOUN\t_\t_\t1\tobj\t_\t_\n";
        let search = run(&noun_dominates_obj(), Treebank::from_string(conllu), SearchOptions::default());

        let stats = search.stats().unwrap();
        assert_eq!(stats.counters.ignored_items, 1);
        assert_eq!(search.result().unwrap().sentence_indices(), vec![1]);
    }

    #[test]
    fn test_result_limit_ends_done() {
        let trees = (0..20)
            .map(|_| Tree::from_rows(&[("books", "NOUN", "root", None)]))
            .collect();
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("n").with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap()));
        let pattern = graph.validate(&context).unwrap();

        let options = SearchOptions::default().with_workers(1).with_result_limit(5);
        let search = run(&pattern, Treebank::from_trees(trees), options);

        assert_eq!(search.result().unwrap().total_match_count(), 5);
        assert_eq!(search.stats().unwrap().counters.processed_items, 5);
    }

    #[test]
    fn test_case_insensitive_and_first_per_sentence() {
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("n").with_constraint(context.node("pos", Operator::Equals, "noun").unwrap()));
        let pattern = graph.validate(&context).unwrap();

        let sensitive = run(&pattern, create_test_corpus(), SearchOptions::default());
        assert_eq!(sensitive.result().unwrap().total_match_count(), 0);

        let options = SearchOptions::default()
            .with_case_insensitive(true)
            .with_mode(SearchMode::FirstPerSentence);
        let insensitive = run(&pattern, create_test_corpus(), options);
        assert_eq!(insensitive.result().unwrap().sentence_indices(), vec![0, 1, 2]);

        // The query itself is untouched
        assert!(!pattern.nodes()[0].constraints[0].is_case_insensitive());
    }

    #[test]
    fn test_ngram_search() {
        let context = ConstraintContext::ngram();
        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("a").with_constraint(context.node("pos", Operator::Equals, "VERB").unwrap()));
        graph.add_node(PatternNode::new("b").with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap()));
        let pattern = graph.validate(&context).unwrap();

        let search = run(&pattern, create_test_corpus(), SearchOptions::default().with_workers(2));
        assert_eq!(search.dedup_policy(), DedupPolicy::Span);
        assert_eq!(search.result().unwrap().sentence_indices(), vec![2]);
    }

    #[test]
    fn test_stats_report_workers_used() {
        let trees = (0..5)
            .map(|_| Tree::from_rows(&[("books", "NOUN", "root", None)]))
            .collect();
        let search = run(&noun_dominates_obj(), Treebank::from_trees(trees), SearchOptions::default().with_workers(4));

        // Slices of two sentences leave the fourth worker without work
        assert_eq!(search.stats().unwrap().workers, 3);

        let search = run(&noun_dominates_obj(), Treebank::default(), SearchOptions::default().with_workers(4));
        assert_eq!(search.stats().unwrap().workers, 0);
    }

    #[test]
    fn test_coreference_search() {
        let conllu = "# sent_id = 1\n\
                      1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\tEntity=(e1-animal\n\
                      2\tdog\tdog\tNOUN\t_\t_\t3\tnsubj\t_\tEntity=e1)\n\
                      3\tbit\tbite\tVERB\t_\t_\t0\troot\t_\t_\n\
                      4\tits\tits\tPRON\t_\t_\t5\tnmod:poss\t_\tEntity=(e2-body(e1-animal)\n\
                      5\ttail\ttail\tNOUN\t_\t_\t3\tobj\t_\tEntity=e2)\n\
                      \n\
                      # sent_id = 2\n\
                      1\tCats\tcat\tNOUN\t_\t_\t2\tnsubj\t_\t_\n\
                      2\tsleep\tsleep\tVERB\t_\t_\t0\troot\t_\t_\n";
        let context = ConstraintContext::coreference();
        let mut graph = PatternGraph::new();
        let antecedent = graph.add_node(PatternNode::new("antecedent").with_constraint(context.group("entity").unwrap()));
        let anaphor = graph.add_node(
            PatternNode::new("anaphor").with_constraint(context.node("pos", Operator::Equals, "PRON").unwrap()),
        );
        graph.connect(antecedent, anaphor, EdgeType::Coreference);
        let pattern = graph.validate(&context).unwrap();

        let search = run(&pattern, Treebank::from_string(conllu), SearchOptions::default().with_workers(2));
        let result = search.result().unwrap();

        assert_eq!(result.total_match_count(), 1);
        assert_eq!(result.instance_label(0, 0), Some("animal"));
        assert_eq!(result.entries()[0].positions.as_deref(), Some(&[0, 1][..]));

        let corpus = Treebank::from_string(conllu);
        let annotated = result.annotate(&result.entries()[0], &corpus).unwrap();
        assert_eq!(annotated.words, vec![(0, "The dog".to_string()), (1, "its".to_string())]);
    }

    #[test]
    fn test_split() {
        assert_eq!(split(10, 3), vec![0..4, 4..8, 8..10]);
        assert_eq!(split(2, 4), vec![0..1, 1..2]);
        assert!(split(0, 4).is_empty());
    }
}
