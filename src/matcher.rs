//! Matching engine
//!
//! A matcher evaluates a validated pattern against the sentence a cursor is
//! attached to and hands every match to a `MatchSink`. Matchers are shared
//! by all workers; per-worker scratch space lives in `MatchState`.

use crate::cache::DedupPolicy;
use crate::constraint::Constraint;
use crate::corpus::ContentType;
use crate::cursor::{Cursor, CursorError};
use crate::options::WindowBounds;
use crate::pattern::{EdgeType, NodeIndex, NodeType, PatternEdge, PatternNode, ValidatedPattern};
use crate::search::Counters;
use crate::tree::WordId;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;

/// One complete assignment: `positions[i]` is the word bound to pattern node `i`
#[derive(Debug, Clone, Copy)]
pub struct RawMatch<'m> {
    pub positions: &'m [WordId],
}

impl RawMatch<'_> {
    /// First and last matched word
    pub fn span(&self) -> (WordId, WordId) {
        let first = self.positions.iter().copied().min().unwrap_or(0);
        let last = self.positions.iter().copied().max().unwrap_or(0);
        (first, last)
    }
}

/// Receiver of raw matches
///
/// Returning `ControlFlow::Break` stops the current sentence.
pub trait MatchSink {
    fn accept(
        &mut self,
        cursor: &mut Cursor<'_>,
        raw: RawMatch<'_>,
        counters: &mut Counters,
    ) -> Result<ControlFlow<()>, CursorError>;
}

pub trait Matcher: Send + Sync {
    /// Report every match in the cursor's sentence to `sink`
    fn find_matches(
        &self,
        cursor: &mut Cursor<'_>,
        state: &mut MatchState,
        sink: &mut dyn MatchSink,
        counters: &mut Counters,
    ) -> Result<(), CursorError>;

    /// Dedup policy used when the options do not name one
    fn default_dedup(&self) -> DedupPolicy;
}

/// Matcher for the pattern's content type
pub fn for_pattern(pattern: Arc<ValidatedPattern>, window: WindowBounds) -> Box<dyn Matcher> {
    match pattern.content_type() {
        ContentType::Dependency | ContentType::Coreference => Box::new(TreeMatcher::new(pattern)),
        ContentType::Ngram => Box::new(NgramMatcher::new(pattern, window)),
    }
}

/// Per-worker scratch space, reused across sentences
#[derive(Debug, Default)]
pub struct MatchState {
    candidates: Vec<Vec<WordId>>,
    assignment: Vec<WordId>,
    used: Vec<bool>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, nodes: usize, words: usize) {
        self.candidates.resize_with(nodes, Vec::new);
        for list in &mut self.candidates {
            list.clear();
        }
        self.assignment.clear();
        self.assignment.resize(nodes, 0);
        self.used.clear();
        self.used.resize(words, false);
    }
}

/// Node check: structural type, then the constraints (AND, or OR for
/// disjunctions); negation inverts the outcome
fn node_accepts(
    node: &PatternNode,
    cursor: &Cursor<'_>,
    counters: &mut Counters,
) -> Result<bool, CursorError> {
    let mut pass = node.node_type.admits(cursor)?;
    if pass {
        pass = if node.node_type == NodeType::Disjunction {
            any_holds(node.filters(), cursor, counters)?
        } else {
            all_hold(node.filters(), cursor, counters)?
        };
    }
    Ok(pass != node.negated)
}

fn all_hold<'c>(
    constraints: impl Iterator<Item = &'c Constraint>,
    cursor: &Cursor<'_>,
    counters: &mut Counters,
) -> Result<bool, CursorError> {
    for constraint in constraints {
        counters.checked_constraints += 1;
        if !constraint.evaluate(cursor)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_holds<'c>(
    constraints: impl Iterator<Item = &'c Constraint>,
    cursor: &Cursor<'_>,
    counters: &mut Counters,
) -> Result<bool, CursorError> {
    for constraint in constraints {
        counters.checked_constraints += 1;
        if constraint.evaluate(cursor)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Backtracking matcher for dependency trees and coreference mentions
///
/// Positions are whatever the cursor indexes: words, or mentions.
#[derive(Debug)]
pub struct TreeMatcher {
    pattern: Arc<ValidatedPattern>,
    /// Order in which pattern nodes are bound
    order: Vec<NodeIndex>,
    /// Edges to verify once `order[step]` is bound
    checks: Vec<Vec<usize>>,
}

impl TreeMatcher {
    pub fn new(pattern: Arc<ValidatedPattern>) -> Self {
        let order = binding_order(&pattern);
        let mut rank = vec![0; order.len()];
        for (step, &node) in order.iter().enumerate() {
            rank[node] = step;
        }
        let checks = order
            .iter()
            .enumerate()
            .map(|(step, &node)| {
                pattern
                    .edges()
                    .iter()
                    .enumerate()
                    .filter(|(_, edge)| edge.other(node).is_some_and(|other| rank[other] < step))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        Self {
            pattern,
            order,
            checks,
        }
    }

    pub fn order(&self) -> &[NodeIndex] {
        &self.order
    }

    fn extend(
        &self,
        step: usize,
        cursor: &mut Cursor<'_>,
        state: &mut MatchState,
        sink: &mut dyn MatchSink,
        counters: &mut Counters,
    ) -> Result<ControlFlow<()>, CursorError> {
        if step == self.order.len() {
            counters.matched_items += 1;
            let raw = RawMatch {
                positions: &state.assignment,
            };
            return sink.accept(cursor, raw, counters);
        }

        let node = self.order[step];
        for c in 0..state.candidates[node].len() {
            let position = state.candidates[node][c];
            if state.used[position] {
                continue;
            }
            state.assignment[node] = position;

            if self.edges_hold(step, cursor, state, counters)? {
                state.used[position] = true;
                let flow = self.extend(step + 1, cursor, state, sink, counters)?;
                state.used[position] = false;
                if flow.is_break() {
                    return Ok(flow);
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn edges_hold(
        &self,
        step: usize,
        cursor: &mut Cursor<'_>,
        state: &MatchState,
        counters: &mut Counters,
    ) -> Result<bool, CursorError> {
        for &e in &self.checks[step] {
            let edge = &self.pattern.edges()[e];
            let source = state.assignment[edge.source];
            let target = state.assignment[edge.target];
            if !edge_accepts(edge, source, target, cursor, counters)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn edge_accepts(
    edge: &PatternEdge,
    source: WordId,
    target: WordId,
    cursor: &mut Cursor<'_>,
    counters: &mut Counters,
) -> Result<bool, CursorError> {
    counters.visited_edges += 1;
    let mut pass = match edge.edge_type {
        EdgeType::Dominance => cursor.dominates(source, target)?,
        EdgeType::Precedence => source < target,
        EdgeType::Transitive => cursor.reaches(source, target)?,
        EdgeType::Coreference => cursor.coreferent(source, target)?,
    };
    if pass {
        cursor.move_to_edge(source, target)?;
        pass = all_hold(edge.filters(), cursor, counters)?;
    }
    Ok(pass != edge.negated)
}

/// Root-type node first, else the most constrained one; then breadth-first
/// along edges
fn binding_order(pattern: &ValidatedPattern) -> Vec<NodeIndex> {
    let nodes = pattern.nodes();
    let anchor = nodes
        .iter()
        .position(|n| n.node_type == NodeType::Root && !n.negated)
        .unwrap_or_else(|| {
            let mut best = 0;
            for (i, node) in nodes.iter().enumerate() {
                if node.filters().count() > nodes[best].filters().count() {
                    best = i;
                }
            }
            best
        });

    let mut order = Vec::with_capacity(nodes.len());
    let mut seen = vec![false; nodes.len()];
    let mut queue = VecDeque::from([anchor]);
    seen[anchor] = true;
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for next in pattern.edges().iter().filter_map(|e| e.other(node)) {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    // Validation guarantees connectivity for trees; keep any stragglers anyway
    order.extend((0..nodes.len()).filter(|&i| !seen[i]));
    order
}

impl Matcher for TreeMatcher {
    fn find_matches(
        &self,
        cursor: &mut Cursor<'_>,
        state: &mut MatchState,
        sink: &mut dyn MatchSink,
        counters: &mut Counters,
    ) -> Result<(), CursorError> {
        cursor.tree()?;
        let words = cursor.len();
        let nodes = self.pattern.nodes();
        state.reset(nodes.len(), words);

        // Candidate lists; an empty one rules out the whole sentence
        for &n in &self.order {
            for position in 0..words {
                cursor.move_to(position)?;
                counters.visited_nodes += 1;
                if node_accepts(&nodes[n], cursor, counters)? {
                    state.candidates[n].push(position);
                }
            }
            if state.candidates[n].is_empty() {
                return Ok(());
            }
        }

        // A break only ends this sentence
        let _ = self.extend(0, cursor, state, sink, counters)?;
        Ok(())
    }

    fn default_dedup(&self) -> DedupPolicy {
        DedupPolicy::None
    }
}

/// Contiguous window matcher for flat token sequences
///
/// Pattern nodes are compared, in declaration order, against each window of
/// the same length inside the configured bounds.
#[derive(Debug)]
pub struct NgramMatcher {
    pattern: Arc<ValidatedPattern>,
    window: WindowBounds,
}

impl NgramMatcher {
    pub fn new(pattern: Arc<ValidatedPattern>, window: WindowBounds) -> Self {
        Self { pattern, window }
    }
}

impl Matcher for NgramMatcher {
    fn find_matches(
        &self,
        cursor: &mut Cursor<'_>,
        state: &mut MatchState,
        sink: &mut dyn MatchSink,
        counters: &mut Counters,
    ) -> Result<(), CursorError> {
        let nodes = self.pattern.nodes();
        let words = cursor.tree()?.len();
        let range = self.window.range(words);
        if range.len() < nodes.len() {
            return Ok(());
        }
        state.reset(nodes.len(), words);

        for start in range.start..=range.end - nodes.len() {
            let mut matched = true;
            for (offset, node) in nodes.iter().enumerate() {
                cursor.move_to(start + offset)?;
                counters.visited_nodes += 1;
                if !node_accepts(node, cursor, counters)? {
                    matched = false;
                    break;
                }
                state.assignment[offset] = start + offset;
            }
            if matched {
                counters.matched_items += 1;
                let raw = RawMatch {
                    positions: &state.assignment,
                };
                if sink.accept(cursor, raw, counters)?.is_break() {
                    break;
                }
            }
        }
        Ok(())
    }

    fn default_dedup(&self) -> DedupPolicy {
        DedupPolicy::Span
    }
}
