//! Pattern graphs
//!
//! A query is a small graph: nodes stand for words (or mentions, for
//! coreference content), edges for structural relations between them, and
//! both carry constraints. A `PatternGraph` is
//! assembled freely; `validate` checks it against a `ConstraintContext` and
//! yields a `ValidatedPattern`, which is the only form a search accepts.

use crate::constraint::{Constraint, ConstraintContext, ConstraintError, ConstraintType};
use crate::corpus::ContentType;
use crate::cursor::{Cursor, CursorError};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Index of a node within its pattern
pub type NodeIndex = usize;

/// Structural role a pattern node demands of its word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Any word
    General,
    /// A word without a head
    Root,
    /// A word without dependents
    Leaf,
    /// A word with both a head and dependents
    Intermediate,
    /// Any word satisfying at least one of the node's constraints
    Disjunction,
}

impl NodeType {
    /// Structural check at the cursor position (constraints aside)
    pub fn admits(&self, cursor: &Cursor<'_>) -> Result<bool, CursorError> {
        Ok(match self {
            NodeType::General | NodeType::Disjunction => true,
            NodeType::Root => cursor.is_root()?,
            NodeType::Leaf => cursor.child_count()? == 0,
            NodeType::Intermediate => !cursor.is_root()? && cursor.child_count()? > 0,
        })
    }

    fn is_structural(&self) -> bool {
        matches!(self, NodeType::Root | NodeType::Leaf | NodeType::Intermediate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    /// Source is the head of target
    Dominance,
    /// Source comes before target
    Precedence,
    /// Target is reachable from source through dominance steps
    Transitive,
    /// Source and target mentions refer to the same entity
    Coreference,
}

impl EdgeType {
    /// Whether the relation is defined for the content type
    pub fn applies_to(&self, content_type: ContentType) -> bool {
        match self {
            EdgeType::Dominance | EdgeType::Transitive => content_type == ContentType::Dependency,
            EdgeType::Precedence => content_type != ContentType::Ngram,
            EdgeType::Coreference => content_type == ContentType::Coreference,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternNode {
    pub id: String,
    pub node_type: NodeType,
    pub negated: bool,
    pub constraints: Vec<Constraint>,
}

impl PatternNode {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            node_type: NodeType::General,
            negated: false,
            constraints: Vec::new(),
        }
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Active constraints that filter (grouping constraints only project)
    pub fn filters(&self) -> impl Iterator<Item = &Constraint> {
        active_filters(&self.constraints)
    }
}

#[derive(Debug, Clone)]
pub struct PatternEdge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub edge_type: EdgeType,
    pub negated: bool,
    pub constraints: Vec<Constraint>,
}

impl PatternEdge {
    pub fn new(source: NodeIndex, target: NodeIndex, edge_type: EdgeType) -> Self {
        Self {
            source,
            target,
            edge_type,
            negated: false,
            constraints: Vec::new(),
        }
    }

    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn filters(&self) -> impl Iterator<Item = &Constraint> {
        active_filters(&self.constraints)
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint
    pub fn other(&self, node: NodeIndex) -> Option<NodeIndex> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

fn active_filters(constraints: &[Constraint]) -> impl Iterator<Item = &Constraint> {
    constraints
        .iter()
        .filter(|c| c.is_active() && !c.is_grouping())
}

/// Which pattern element a group dimension projects from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOwner {
    Node(NodeIndex),
    Edge(usize),
}

/// One result dimension, defined by an active grouping constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDimension {
    pub owner: GroupOwner,
    /// Index of the grouping constraint in its owner's constraint list
    pub constraint: usize,
    pub name: String,
}

#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("pattern has no nodes")]
    Empty,

    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    #[error("edge {edge} references missing node {index}")]
    MissingNode { edge: usize, index: NodeIndex },

    #[error("edge {edge} connects a node to itself")]
    SelfLoop { edge: usize },

    #[error("node {node} cannot be both root and leaf")]
    ContradictoryTypes { node: String },

    #[error("disjunction node {node} has {alternatives} alternatives (needs at least 2)")]
    Disjunction { node: String, alternatives: usize },

    #[error("node {node} is not connected to the rest of the pattern")]
    Unreachable { node: String },

    #[error("{owner}: {source}")]
    Constraint {
        owner: String,
        #[source]
        source: ConstraintError,
    },

    #[error("{owner}: {count} active {token} constraints (allowed {min}..={max})")]
    Cardinality {
        owner: String,
        token: &'static str,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("{content_type:?} patterns cannot have edges")]
    EdgesNotSupported { content_type: ContentType },

    #[error("edge {edge}: {edge_type:?} is not supported for {content_type:?} patterns")]
    EdgeTypeNotSupported {
        edge: usize,
        edge_type: EdgeType,
        content_type: ContentType,
    },

    #[error("node {node}: {node_type:?} is not supported for {content_type:?} patterns")]
    NodeTypeNotSupported {
        node: String,
        node_type: NodeType,
        content_type: ContentType,
    },
}

/// Pattern under construction
#[derive(Debug, Clone, Default)]
pub struct PatternGraph {
    nodes: Vec<PatternNode>,
    edges: Vec<PatternEdge>,
}

impl PatternGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: PatternNode) -> NodeIndex {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, edge: PatternEdge) -> usize {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    /// Add a plain edge between two existing nodes
    pub fn connect(&mut self, source: NodeIndex, target: NodeIndex, edge_type: EdgeType) -> usize {
        self.add_edge(PatternEdge::new(source, target, edge_type))
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[PatternNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PatternEdge] {
        &self.edges
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut PatternNode> {
        self.nodes.get_mut(index)
    }

    pub fn edge_mut(&mut self, index: usize) -> Option<&mut PatternEdge> {
        self.edges.get_mut(index)
    }

    /// Check the graph against the context's capabilities
    pub fn validate(&self, context: &ConstraintContext) -> Result<ValidatedPattern, PatternError> {
        let content_type = context.content_type();

        if self.nodes.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut seen = FxHashSet::default();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(PatternError::DuplicateId(node.id.clone()));
            }
        }

        for (i, edge) in self.edges.iter().enumerate() {
            for index in [edge.source, edge.target] {
                if index >= self.nodes.len() {
                    return Err(PatternError::MissingNode { edge: i, index });
                }
            }
            if edge.source == edge.target {
                return Err(PatternError::SelfLoop { edge: i });
            }
        }

        if content_type == ContentType::Ngram && !self.edges.is_empty() {
            return Err(PatternError::EdgesNotSupported { content_type });
        }
        if let Some((i, edge)) = self
            .edges
            .iter()
            .enumerate()
            .find(|(_, e)| !e.edge_type.applies_to(content_type))
        {
            return Err(PatternError::EdgeTypeNotSupported {
                edge: i,
                edge_type: edge.edge_type,
                content_type,
            });
        }
        // Root, leaf and intermediate only make sense on dependency trees
        if content_type != ContentType::Dependency
            && let Some(node) = self.nodes.iter().find(|n| n.node_type.is_structural())
        {
            return Err(PatternError::NodeTypeNotSupported {
                node: node.id.clone(),
                node_type: node.node_type,
                content_type,
            });
        }

        self.check_node_types()?;

        for node in &self.nodes {
            if node.node_type == NodeType::Disjunction {
                let alternatives = node.filters().count();
                if alternatives < 2 {
                    return Err(PatternError::Disjunction {
                        node: node.id.clone(),
                        alternatives,
                    });
                }
            }
        }

        if content_type != ContentType::Ngram {
            self.check_connected()?;
        }

        for node in &self.nodes {
            check_constraints(
                context,
                &node.id,
                &node.constraints,
                ConstraintType::Node,
                node.node_type != NodeType::Disjunction,
            )?;
        }
        for edge in &self.edges {
            check_constraints(
                context,
                &self.edge_name(edge),
                &edge.constraints,
                ConstraintType::Edge,
                true,
            )?;
        }

        Ok(ValidatedPattern {
            dimensions: self.group_dimensions(),
            graph: self.clone(),
            content_type,
        })
    }

    fn edge_name(&self, edge: &PatternEdge) -> String {
        format!("{}->{}", self.nodes[edge.source].id, self.nodes[edge.target].id)
    }

    /// A non-negated root cannot sit below another word, nor a leaf above one
    fn check_node_types(&self) -> Result<(), PatternError> {
        for edge in self.edges.iter().filter(|e| !e.negated) {
            if !matches!(edge.edge_type, EdgeType::Dominance | EdgeType::Transitive) {
                continue;
            }
            let source = &self.nodes[edge.source];
            let target = &self.nodes[edge.target];
            if target.node_type == NodeType::Root && !target.negated {
                return Err(PatternError::ContradictoryTypes {
                    node: target.id.clone(),
                });
            }
            if source.node_type == NodeType::Leaf && !source.negated {
                return Err(PatternError::ContradictoryTypes {
                    node: source.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Undirected reachability from the first node
    fn check_connected(&self) -> Result<(), PatternError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([0]);
        visited[0] = true;
        while let Some(current) = queue.pop_front() {
            for neighbor in self.edges.iter().filter_map(|e| e.other(current)) {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        match visited.iter().position(|v| !v) {
            Some(index) => Err(PatternError::Unreachable {
                node: self.nodes[index].id.clone(),
            }),
            None => Ok(()),
        }
    }

    fn group_dimensions(&self) -> Vec<GroupDimension> {
        let node_groups = self.nodes.iter().enumerate().flat_map(|(i, node)| {
            grouping_constraints(&node.constraints).map(move |(c, constraint)| GroupDimension {
                owner: GroupOwner::Node(i),
                constraint: c,
                name: dimension_name(&node.id, constraint),
            })
        });
        let edge_groups = self.edges.iter().enumerate().flat_map(|(i, edge)| {
            let owner = self.edge_name(edge);
            grouping_constraints(&edge.constraints)
                .map(move |(c, constraint)| GroupDimension {
                    owner: GroupOwner::Edge(i),
                    constraint: c,
                    name: dimension_name(&owner, constraint),
                })
                .collect::<Vec<_>>()
        });
        node_groups.chain(edge_groups).collect()
    }
}

fn grouping_constraints(constraints: &[Constraint]) -> impl Iterator<Item = (usize, &Constraint)> {
    constraints
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_active() && c.is_grouping())
}

fn dimension_name(owner: &str, constraint: &Constraint) -> String {
    match constraint.specifier() {
        Some(spec) => format!("{}.{}.{}", owner, constraint.token(), spec),
        None => format!("{}.{}", owner, constraint.token()),
    }
}

fn check_constraints(
    context: &ConstraintContext,
    owner: &str,
    constraints: &[Constraint],
    constraint_type: ConstraintType,
    check_cardinality: bool,
) -> Result<(), PatternError> {
    for constraint in constraints {
        if constraint.constraint_type() != constraint_type || !context.recognizes(constraint) {
            return Err(PatternError::Constraint {
                owner: owner.to_string(),
                source: ConstraintError::UnknownToken {
                    token: constraint.token().to_string(),
                    constraint_type,
                },
            });
        }
    }

    if !check_cardinality {
        return Ok(());
    }

    let mut counts: FxHashMap<&'static str, usize> = FxHashMap::default();
    for constraint in active_filters(constraints) {
        *counts.entry(constraint.token()).or_default() += 1;
    }
    for factory in context.factories(constraint_type) {
        let count = counts.get(factory.token).copied().unwrap_or(0);
        if count < factory.min_instances || count > factory.max_instances {
            return Err(PatternError::Cardinality {
                owner: owner.to_string(),
                token: factory.token,
                count,
                min: factory.min_instances,
                max: factory.max_instances,
            });
        }
    }
    Ok(())
}

/// A pattern that passed validation
///
/// Immutable; a search clones the constraints it needs.
#[derive(Debug, Clone)]
pub struct ValidatedPattern {
    graph: PatternGraph,
    content_type: ContentType,
    dimensions: Vec<GroupDimension>,
}

impl ValidatedPattern {
    pub fn nodes(&self) -> &[PatternNode] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[PatternEdge] {
        self.graph.edges()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Group dimensions: grouping constraints in node order, then edge order
    pub fn dimensions(&self) -> &[GroupDimension] {
        &self.dimensions
    }

    /// The grouping constraint behind a dimension
    pub fn dimension_constraint(&self, dimension: &GroupDimension) -> &Constraint {
        match dimension.owner {
            GroupOwner::Node(i) => &self.graph.nodes[i].constraints[dimension.constraint],
            GroupOwner::Edge(i) => &self.graph.edges[i].constraints[dimension.constraint],
        }
    }

    /// Copy with every constraint switched to the given case sensitivity
    pub(crate) fn with_case_insensitive(&self, case_insensitive: bool) -> Result<Self, ConstraintError> {
        let mut copy = self.clone();
        let nodes = copy.graph.nodes.iter_mut().map(|n| &mut n.constraints);
        let edges = copy.graph.edges.iter_mut().map(|e| &mut e.constraints);
        for constraints in nodes.chain(edges) {
            for constraint in constraints.iter_mut() {
                constraint.set_case_insensitive(case_insensitive)?;
            }
        }
        Ok(copy)
    }
}

impl fmt::Display for ValidatedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes().iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            if node.negated {
                f.write_str("!")?;
            }
            write!(f, "{}:{:?}[", node.id, node.node_type)?;
            for (j, constraint) in node.constraints.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", constraint)?;
            }
            f.write_str("]")?;
        }
        for edge in self.edges() {
            let sign = if edge.negated { "!" } else { "" };
            write!(
                f,
                "; {} {}{:?} {}",
                self.graph.nodes[edge.source].id, sign, edge.edge_type, self.graph.nodes[edge.target].id
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;

    fn noun_dominates_obj(context: &ConstraintContext) -> PatternGraph {
        let mut graph = PatternGraph::new();
        let head = graph.add_node(
            PatternNode::new("head").with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap()),
        );
        let dep = graph.add_node(
            PatternNode::new("dep").with_constraint(context.node("relation", Operator::Equals, "obj").unwrap()),
        );
        graph.connect(head, dep, EdgeType::Dominance);
        graph
    }

    #[test]
    fn test_valid_pattern() {
        let context = ConstraintContext::dependency();
        let pattern = noun_dominates_obj(&context).validate(&context).unwrap();

        assert_eq!(pattern.nodes().len(), 2);
        assert_eq!(pattern.edges().len(), 1);
        assert!(pattern.dimensions().is_empty());
        assert_eq!(pattern.content_type(), ContentType::Dependency);
    }

    #[test]
    fn test_structural_errors() {
        let context = ConstraintContext::dependency();

        assert!(matches!(PatternGraph::new().validate(&context), Err(PatternError::Empty)));

        let mut duplicate = PatternGraph::new();
        duplicate.add_node(PatternNode::new("a"));
        duplicate.add_node(PatternNode::new("a"));
        assert!(matches!(duplicate.validate(&context), Err(PatternError::DuplicateId(_))));

        let mut missing = PatternGraph::new();
        missing.add_node(PatternNode::new("a"));
        missing.connect(0, 3, EdgeType::Dominance);
        assert!(matches!(
            missing.validate(&context),
            Err(PatternError::MissingNode { edge: 0, index: 3 })
        ));

        let mut looped = PatternGraph::new();
        looped.add_node(PatternNode::new("a"));
        looped.connect(0, 0, EdgeType::Precedence);
        assert!(matches!(looped.validate(&context), Err(PatternError::SelfLoop { edge: 0 })));

        let mut disconnected = PatternGraph::new();
        disconnected.add_node(PatternNode::new("a"));
        disconnected.add_node(PatternNode::new("b"));
        assert!(matches!(
            disconnected.validate(&context),
            Err(PatternError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_root_and_leaf_contradiction() {
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        let a = graph.add_node(PatternNode::new("a"));
        let b = graph.add_node(PatternNode::new("b").with_type(NodeType::Root));
        graph.connect(a, b, EdgeType::Dominance);
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::ContradictoryTypes { .. })
        ));

        // Negating the edge removes the contradiction
        graph.edge_mut(0).unwrap().negated = true;
        assert!(graph.validate(&context).is_ok());

        let mut graph = PatternGraph::new();
        let a = graph.add_node(PatternNode::new("a").with_type(NodeType::Leaf));
        let b = graph.add_node(PatternNode::new("b"));
        graph.connect(a, b, EdgeType::Transitive);
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::ContradictoryTypes { .. })
        ));
    }

    #[test]
    fn test_disjunction_needs_two_alternatives() {
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        graph.add_node(
            PatternNode::new("a")
                .with_type(NodeType::Disjunction)
                .with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap()),
        );
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::Disjunction { alternatives: 1, .. })
        ));

        // Alternatives may share a token
        graph
            .node_mut(0)
            .unwrap()
            .constraints
            .push(context.node("pos", Operator::Equals, "PROPN").unwrap());
        assert!(graph.validate(&context).is_ok());
    }

    #[test]
    fn test_cardinality() {
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        graph.add_node(
            PatternNode::new("a")
                .with_constraint(context.node("pos", Operator::Equals, "NOUN").unwrap())
                .with_constraint(context.node("pos", Operator::EqualsNot, "VERB").unwrap()),
        );
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::Cardinality { token: "pos", count: 2, .. })
        ));

        // Inactive constraints do not count
        graph.node_mut(0).unwrap().constraints[1].set_active(false);
        assert!(graph.validate(&context).is_ok());
    }

    #[test]
    fn test_constraints_must_fit_the_context() {
        let dependency = ConstraintContext::dependency();
        let ngram = ConstraintContext::ngram();

        let mut graph = PatternGraph::new();
        graph.add_node(
            PatternNode::new("a").with_constraint(dependency.node("relation", Operator::Equals, "obj").unwrap()),
        );
        assert!(graph.validate(&dependency).is_ok());
        assert!(matches!(
            graph.validate(&ngram),
            Err(PatternError::Constraint { .. })
        ));

        // Edge constraint placed on a node
        let mut graph = PatternGraph::new();
        graph.add_node(
            PatternNode::new("a").with_constraint(dependency.edge("relation", Operator::Equals, "obj").unwrap()),
        );
        assert!(matches!(
            graph.validate(&dependency),
            Err(PatternError::Constraint { .. })
        ));
    }

    #[test]
    fn test_ngram_restrictions() {
        let context = ConstraintContext::ngram();

        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("a"));
        graph.add_node(PatternNode::new("b"));
        assert!(graph.validate(&context).is_ok());

        graph.connect(0, 1, EdgeType::Precedence);
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::EdgesNotSupported { .. })
        ));

        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("a").with_type(NodeType::Root));
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::NodeTypeNotSupported { .. })
        ));
    }

    #[test]
    fn test_coreference_restrictions() {
        let context = ConstraintContext::coreference();

        let mut graph = PatternGraph::new();
        let a = graph.add_node(PatternNode::new("a"));
        let b = graph.add_node(PatternNode::new("b"));
        graph.connect(a, b, EdgeType::Coreference);
        graph.connect(a, b, EdgeType::Precedence);
        assert!(graph.validate(&context).is_ok());

        graph.connect(a, b, EdgeType::Dominance);
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::EdgeTypeNotSupported {
                edge: 2,
                edge_type: EdgeType::Dominance,
                ..
            })
        ));

        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("a"));
        graph.add_node(PatternNode::new("b"));
        assert!(matches!(graph.validate(&context), Err(PatternError::Unreachable { .. })));

        let mut graph = PatternGraph::new();
        graph.add_node(PatternNode::new("a").with_type(NodeType::Leaf));
        assert!(matches!(
            graph.validate(&context),
            Err(PatternError::NodeTypeNotSupported { .. })
        ));

        // Coreference edges need mention content
        let dependency = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        let a = graph.add_node(PatternNode::new("a"));
        let b = graph.add_node(PatternNode::new("b"));
        graph.connect(a, b, EdgeType::Coreference);
        assert!(matches!(
            graph.validate(&dependency),
            Err(PatternError::EdgeTypeNotSupported { .. })
        ));
    }

    #[test]
    fn test_group_dimensions_in_node_then_edge_order() {
        let context = ConstraintContext::dependency();
        let mut graph = PatternGraph::new();
        let head = graph.add_node(PatternNode::new("head").with_constraint(context.group("pos").unwrap()));
        let dep = graph.add_node(PatternNode::new("dep").with_constraint(context.group("lemma").unwrap()));
        graph.add_edge(
            PatternEdge::new(head, dep, EdgeType::Dominance).with_constraint(
                context
                    .create("relation", ConstraintType::Edge, Operator::Grouping, "", None)
                    .unwrap(),
            ),
        );

        let pattern = graph.validate(&context).unwrap();
        let names: Vec<_> = pattern.dimensions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["head.pos", "dep.lemma", "head->dep.relation"]);
        assert_eq!(pattern.dimensions()[2].owner, GroupOwner::Edge(0));
        assert_eq!(pattern.dimension_constraint(&pattern.dimensions()[1]).token(), "lemma");
    }

    #[test]
    fn test_case_insensitive_copy_is_independent() {
        let context = ConstraintContext::dependency();
        let pattern = noun_dominates_obj(&context).validate(&context).unwrap();
        let copy = pattern.with_case_insensitive(true).unwrap();

        assert!(copy.nodes()[0].constraints[0].is_case_insensitive());
        assert!(!pattern.nodes()[0].constraints[0].is_case_insensitive());
    }
}
