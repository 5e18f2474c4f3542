//! Property tests for parallel search.
//!
//! Verifies that worker count never changes results, and that single-node
//! searches count exactly what a naive scan counts.

use proptest::prelude::*;
use std::sync::Arc;
use treequest::{
    ConstraintContext, EdgeType, FeatureValue, Operator, PatternGraph, PatternNode, Search, SearchOptions,
    SearchState, Tree, Treebank, ValidatedPattern, Value,
};

const FORMS: &[&str] = &["dog", "Cat", "runs", "saw", "the", "big", "Dog"];
const TAGS: &[&str] = &["NOUN", "VERB", "DET", "ADJ"];
const RELATIONS: &[&str] = &["nsubj", "obj", "det", "amod"];

// ============================================================================
// Corpus Generators
// ============================================================================

/// (form, tag, relation, head offset) per word; word 0 is the root
type Row = (usize, usize, usize, usize);

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        (0..FORMS.len(), 0..TAGS.len(), 0..RELATIONS.len(), 0..8usize),
        1..8,
    )
}

fn build_tree(rows: &[Row]) -> Tree {
    let rows: Vec<_> = rows
        .iter()
        .enumerate()
        .map(|(i, &(form, tag, relation, head))| {
            let head = if i == 0 { None } else { Some(head % i) };
            let relation = if i == 0 { "root" } else { RELATIONS[relation] };
            (FORMS[form], TAGS[tag], relation, head)
        })
        .collect();
    Tree::from_rows(&rows)
}

fn arb_treebank() -> impl Strategy<Value = Vec<Vec<Row>>> {
    prop::collection::vec(arb_rows(), 0..12)
}

// ============================================================================
// Patterns
// ============================================================================

/// VERB dominating anything, grouped by the dependent's tag
fn verb_with_dependent() -> ValidatedPattern {
    let context = ConstraintContext::dependency();
    let mut graph = PatternGraph::new();
    let head = graph.add_node(
        PatternNode::new("head").with_constraint(context.node("pos", Operator::Equals, "VERB").unwrap()),
    );
    let dep = graph.add_node(PatternNode::new("dep").with_constraint(context.group("pos").unwrap()));
    graph.connect(head, dep, EdgeType::Dominance);
    graph.validate(&context).unwrap()
}

fn single_noun() -> ValidatedPattern {
    let context = ConstraintContext::dependency();
    let mut graph = PatternGraph::new();
    graph.add_node(PatternNode::new("n").with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap()));
    graph.validate(&context).unwrap()
}

fn run(pattern: &ValidatedPattern, corpus: Arc<Treebank>, workers: usize) -> Search<Treebank> {
    let search = Search::new(pattern, corpus, SearchOptions::default().with_workers(workers)).unwrap();
    assert_eq!(search.execute().unwrap(), SearchState::Done);
    search
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn worker_count_does_not_change_results(
        sentences in arb_treebank(),
        workers in 2..6usize,
    ) {
        let corpus = Arc::new(Treebank::from_trees(sentences.iter().map(|rows| build_tree(rows)).collect()));
        let pattern = verb_with_dependent();

        let serial = run(&pattern, Arc::clone(&corpus), 1).result().unwrap();
        let parallel = run(&pattern, corpus, workers).result().unwrap();

        prop_assert_eq!(serial.total_match_count(), parallel.total_match_count());
        prop_assert_eq!(serial.sentence_indices(), parallel.sentence_indices());
        prop_assert_eq!(serial.entries(), parallel.entries());
        for tag in TAGS {
            let serial_count = serial.instance_index(0, tag).map_or(0, |i| serial.match_count(&[i]));
            let parallel_count = parallel.instance_index(0, tag).map_or(0, |i| parallel.match_count(&[i]));
            prop_assert_eq!(serial_count, parallel_count, "group {}", tag);
        }
    }

    #[test]
    fn single_node_search_counts_every_word(sentences in arb_treebank()) {
        let expected = sentences
            .iter()
            .flatten()
            .filter(|&&(_, tag, _, _)| TAGS[tag] == "NOUN")
            .count();
        let corpus = Arc::new(Treebank::from_trees(sentences.iter().map(|rows| build_tree(rows)).collect()));

        let search = run(&single_noun(), corpus, 3);
        let result = search.result().unwrap();

        prop_assert_eq!(result.total_match_count(), expected);
        prop_assert_eq!(search.stats().unwrap().counters.processed_items, sentences.len() as u64);
    }

    #[test]
    fn negated_text_operators_complement(target in "[a-zA-Z]{0,6}", value in "[a-zA-Z]{0,3}") {
        let value = Value::text(value);
        for (positive, negative) in [
            (Operator::Equals, Operator::EqualsNot),
            (Operator::Contains, Operator::ContainsNot),
            (Operator::Matches, Operator::MatchesNot),
        ] {
            prop_assert_ne!(
                positive.apply(FeatureValue::Text(&target), &value),
                negative.apply(FeatureValue::Text(&target), &value)
            );
        }
    }
}
