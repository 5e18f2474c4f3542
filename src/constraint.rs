//! Constraint model
//!
//! A `ConstraintFactory` describes one kind of check (a feature token): which
//! operators it supports, what values it accepts, and how to read the feature
//! from a cursor. A `Constraint` is one configured instance of a factory,
//! owned by a pattern node or edge. Factories are grouped per content type in
//! a `ConstraintContext`.

use crate::corpus::ContentType;
use crate::cursor::{Cursor, CursorError, DIRECTIONS};
use crate::operator::Operator;
use crate::value::{FeatureValue, Value, ValueKind};
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Whether a constraint applies to pattern nodes or pattern edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    Node,
    Edge,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::Node => f.write_str("node"),
            ConstraintType::Edge => f.write_str("edge"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ConstraintError {
    #[error("unknown {constraint_type} constraint: {token}")]
    UnknownToken {
        token: String,
        constraint_type: ConstraintType,
    },

    #[error("operator {operator} is not supported by {token}")]
    UnsupportedOperator { token: String, operator: Operator },

    #[error("invalid value {value:?} for {token}: expected {expected}")]
    InvalidValue {
        token: String,
        value: String,
        expected: &'static str,
    },

    #[error("{token} needs a specifier")]
    MissingSpecifier { token: String },

    #[error("invalid regular expression for {token}: {source}")]
    InvalidPattern {
        token: String,
        #[source]
        source: regex::Error,
    },

    #[error("{constraint_type} constraint {token} is already registered")]
    Duplicate {
        token: String,
        constraint_type: ConstraintType,
    },

    #[error("extractor of {token} does not produce {expected} values")]
    KindMismatch {
        token: String,
        expected: &'static str,
    },
}

type TextFn = for<'a> fn(&Cursor<'a>, Option<&str>) -> Result<Option<&'a str>, CursorError>;
type IntegerFn = fn(&Cursor<'_>, Option<&str>) -> Result<Option<i64>, CursorError>;
type FloatFn = fn(&Cursor<'_>, Option<&str>) -> Result<Option<f64>, CursorError>;
type BooleanFn = fn(&Cursor<'_>, Option<&str>) -> Result<Option<bool>, CursorError>;
type LabelFn = fn(&Cursor<'_>, Option<&str>) -> Result<Option<&'static str>, CursorError>;

/// Typed feature extraction
///
/// The second argument is the constraint's specifier (e.g. a feature key).
/// `Ok(None)` means the feature is absent at the inspected position.
#[derive(Clone, Copy)]
pub enum Extractor {
    Text(TextFn),
    Integer(IntegerFn),
    Float(FloatFn),
    Boolean(BooleanFn),
    Label(LabelFn),
}

impl Extractor {
    pub fn extract<'a>(
        &self,
        cursor: &Cursor<'a>,
        specifier: Option<&str>,
    ) -> Result<FeatureValue<'a>, CursorError> {
        Ok(match self {
            Extractor::Text(f) => f(cursor, specifier)?.map_or(FeatureValue::Absent, FeatureValue::Text),
            Extractor::Integer(f) => f(cursor, specifier)?.map_or(FeatureValue::Absent, FeatureValue::Integer),
            Extractor::Float(f) => f(cursor, specifier)?.map_or(FeatureValue::Absent, FeatureValue::Float),
            Extractor::Boolean(f) => f(cursor, specifier)?.map_or(FeatureValue::Absent, FeatureValue::Boolean),
            Extractor::Label(f) => f(cursor, specifier)?.map_or(FeatureValue::Absent, FeatureValue::Text),
        })
    }

    fn produces(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (Extractor::Text(_), ValueKind::Text)
                | (Extractor::Integer(_), ValueKind::Integer)
                | (Extractor::Float(_), ValueKind::Float)
                | (Extractor::Boolean(_), ValueKind::Boolean)
                | (Extractor::Label(_), ValueKind::Label(_))
        )
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Extractor::Text(_) => "Text",
            Extractor::Integer(_) => "Integer",
            Extractor::Float(_) => "Float",
            Extractor::Boolean(_) => "Boolean",
            Extractor::Label(_) => "Label",
        };
        write!(f, "Extractor::{}", kind)
    }
}

/// Stateless descriptor for one constraint kind
#[derive(Debug, Clone)]
pub struct ConstraintFactory {
    pub token: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub constraint_type: ConstraintType,
    pub operators: &'static [Operator],
    pub value_kind: ValueKind,
    pub default_value: Value,
    /// Minimum number of active instances on one node or edge
    pub min_instances: usize,
    /// Maximum number of active instances on one node or edge
    pub max_instances: usize,
    pub needs_specifier: bool,
    pub extractor: Extractor,
}

impl ConstraintFactory {
    pub fn supports(&self, operator: Operator) -> bool {
        self.operators.contains(&operator)
    }

    /// Turn a user-facing label into a typed value
    pub fn parse_value(&self, label: &str) -> Result<Value, ConstraintError> {
        let invalid = || ConstraintError::InvalidValue {
            token: self.token.to_string(),
            value: label.to_string(),
            expected: self.value_kind.name(),
        };
        let label = label.trim();
        let value = match self.value_kind {
            ValueKind::Text => Value::text(label),
            ValueKind::Integer => Value::Integer(label.parse().map_err(|_| invalid())?),
            ValueKind::Float => Value::Float(label.parse().map_err(|_| invalid())?),
            ValueKind::Boolean => match label.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Value::Boolean(true),
                "false" | "no" | "0" => Value::Boolean(false),
                _ => return Err(invalid()),
            },
            ValueKind::Label(_) => Value::text(label),
        };
        if self.value_kind.admits(&value) {
            Ok(value)
        } else {
            Err(invalid())
        }
    }

    /// Inverse of `parse_value`
    pub fn format_value(&self, value: &Value) -> String {
        value.to_string()
    }

    /// Read this factory's feature at the cursor position
    pub fn extract<'a>(
        &self,
        cursor: &Cursor<'a>,
        specifier: Option<&str>,
    ) -> Result<FeatureValue<'a>, CursorError> {
        self.extractor.extract(cursor, specifier)
    }

    /// Build a constraint from a typed value
    ///
    /// Grouping constraints ignore `value` and keep the factory default.
    pub fn create(
        self: &Arc<Self>,
        operator: Operator,
        value: Value,
        specifier: Option<&str>,
    ) -> Result<Constraint, ConstraintError> {
        if !self.supports(operator) {
            return Err(ConstraintError::UnsupportedOperator {
                token: self.token.to_string(),
                operator,
            });
        }
        if self.needs_specifier && specifier.is_none_or(str::is_empty) {
            return Err(ConstraintError::MissingSpecifier {
                token: self.token.to_string(),
            });
        }

        let value = if operator.is_grouping() {
            self.default_value.clone()
        } else {
            self.coerce(value, operator)?
        };

        let mut constraint = Constraint {
            factory: Arc::clone(self),
            value,
            operator,
            specifier: specifier.map(str::to_string),
            active: true,
            case_insensitive: false,
            regex: None,
            folded: None,
        };
        constraint.refresh()?;
        Ok(constraint)
    }

    /// Build a constraint from a user-facing label
    pub fn create_from_label(
        self: &Arc<Self>,
        operator: Operator,
        label: &str,
        specifier: Option<&str>,
    ) -> Result<Constraint, ConstraintError> {
        let value = if operator.is_regex() || operator.is_grouping() {
            Value::text(label)
        } else {
            self.parse_value(label)?
        };
        self.create(operator, value, specifier)
    }

    fn coerce(&self, value: Value, operator: Operator) -> Result<Value, ConstraintError> {
        // Regular expressions are always text, whatever the feature kind
        if operator.is_regex() {
            return match value {
                Value::Text(_) => Ok(value),
                other => Err(ConstraintError::InvalidValue {
                    token: self.token.to_string(),
                    value: other.to_string(),
                    expected: "regular expression",
                }),
            };
        }
        let value = match (self.value_kind, value) {
            (ValueKind::Float, Value::Integer(i)) => Value::Float(i as f64),
            (_, value) => value,
        };
        if self.value_kind.admits(&value) {
            Ok(value)
        } else {
            Err(ConstraintError::InvalidValue {
                token: self.token.to_string(),
                value: value.to_string(),
                expected: self.value_kind.name(),
            })
        }
    }
}

/// One configured feature check on a pattern node or edge
///
/// Cloning yields an independent constraint; searches always work on clones.
#[derive(Debug, Clone)]
pub struct Constraint {
    factory: Arc<ConstraintFactory>,
    value: Value,
    operator: Operator,
    specifier: Option<String>,
    active: bool,
    case_insensitive: bool,
    regex: Option<Regex>,
    /// Lowercased text value for case-insensitive equality
    folded: Option<String>,
}

impl Constraint {
    pub fn token(&self) -> &'static str {
        self.factory.token
    }

    pub fn factory(&self) -> &Arc<ConstraintFactory> {
        &self.factory
    }

    pub fn constraint_type(&self) -> ConstraintType {
        self.factory.constraint_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn specifier(&self) -> Option<&str> {
        self.specifier.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_grouping(&self) -> bool {
        self.operator.is_grouping()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_value(&mut self, value: Value) -> Result<(), ConstraintError> {
        self.value = self.factory.coerce(value, self.operator)?;
        self.refresh()
    }

    pub fn set_operator(&mut self, operator: Operator) -> Result<(), ConstraintError> {
        if !self.factory.supports(operator) {
            return Err(ConstraintError::UnsupportedOperator {
                token: self.token().to_string(),
                operator,
            });
        }
        let previous = std::mem::replace(&mut self.operator, operator);
        if let Err(e) = self.factory.coerce(self.value.clone(), operator).and_then(|value| {
            self.value = value;
            self.refresh()
        }) {
            self.operator = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn set_case_insensitive(&mut self, case_insensitive: bool) -> Result<(), ConstraintError> {
        self.case_insensitive = case_insensitive;
        self.refresh()
    }

    /// Recompute the cached regex and case-folded value
    ///
    /// Case-insensitive substring checks compile to an escaped regex, so
    /// evaluation never lowercases into a fresh string.
    fn refresh(&mut self) -> Result<(), ConstraintError> {
        self.regex = None;
        self.folded = None;

        let Value::Text(text) = &self.value else {
            return Ok(());
        };
        let pattern = match self.operator {
            Operator::Matches | Operator::MatchesNot => text.clone(),
            Operator::Contains | Operator::ContainsNot if self.case_insensitive => regex::escape(text),
            _ => {
                if self.case_insensitive {
                    self.folded = Some(text.to_lowercase());
                }
                return Ok(());
            }
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|source| ConstraintError::InvalidPattern {
                token: self.token().to_string(),
                source,
            })?;
        self.regex = Some(regex);
        Ok(())
    }

    /// Check the feature at the cursor position
    ///
    /// Inactive and grouping constraints always pass.
    pub fn evaluate(&self, cursor: &Cursor<'_>) -> Result<bool, CursorError> {
        if !self.active || self.operator.is_grouping() {
            return Ok(true);
        }
        let target = self.factory.extract(cursor, self.specifier())?;
        Ok(self.compare(target))
    }

    fn compare(&self, target: FeatureValue<'_>) -> bool {
        if let Some(regex) = &self.regex {
            return self.operator.apply_regex(target, regex);
        }
        if let (Some(folded), FeatureValue::Text(text)) = (&self.folded, target) {
            let equal = text.chars().flat_map(char::to_lowercase).eq(folded.chars());
            return match self.operator {
                Operator::EqualsNot => !equal,
                _ => equal,
            };
        }
        self.operator.apply(target, &self.value)
    }

    /// Group label of the feature at the cursor position
    pub fn project(&self, cursor: &Cursor<'_>) -> Result<String, CursorError> {
        let target = self.factory.extract(cursor, self.specifier())?;
        Ok(target.to_label().into_owned())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.specifier {
            Some(spec) => write!(f, "{}.{}", self.token(), spec)?,
            None => write!(f, "{}", self.token())?,
        }
        if self.is_grouping() {
            write!(f, "{}", self.operator)
        } else {
            write!(f, "{}{:?}", self.operator, self.factory.format_value(&self.value))
        }
    }
}

/// Constraint factories available for one content type
#[derive(Debug, Clone)]
pub struct ConstraintContext {
    content_type: ContentType,
    factories: Vec<Arc<ConstraintFactory>>,
    index: FxHashMap<(&'static str, ConstraintType), usize>,
}

impl ConstraintContext {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            factories: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Built-in factories for the content type
    pub fn for_content_type(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Dependency => Self::dependency(),
            ContentType::Ngram => Self::ngram(),
            ContentType::Coreference => Self::coreference(),
        }
    }

    /// Dependency trees: word features, head-derived features, edge features
    pub fn dependency() -> Self {
        let mut context = Self::new(ContentType::Dependency);
        let builtins = [
            text_factory("form", "Form", "Surface form", extract_form),
            text_factory("lemma", "Lemma", "Lemma", extract_lemma),
            text_factory("pos", "Part of speech", "Universal part-of-speech tag", extract_upos),
            text_factory("xpos", "Tag", "Language-specific part-of-speech tag", extract_xpos),
            text_factory("relation", "Relation", "Relation to the head", extract_relation),
            keyed_factory("feature", "Feature", "Morphological feature (specifier: key)", extract_feature),
            keyed_factory("misc", "Misc", "MISC annotation (specifier: key)", extract_misc),
            ConstraintFactory {
                token: "distance",
                name: "Distance",
                description: "Linear distance to the head",
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_distance))
            },
            ConstraintFactory {
                token: "children",
                name: "Children",
                description: "Number of dependents",
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_children))
            },
            ConstraintFactory {
                token: "depth",
                name: "Depth",
                description: "Dominance steps to the root",
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_depth))
            },
            ConstraintFactory {
                token: "position",
                name: "Position",
                description: "Relative position in the sentence (0 to 1)",
                value_kind: ValueKind::Float,
                default_value: Value::Float(0.0),
                max_instances: 2,
                ..numeric_factory(Extractor::Float(extract_position))
            },
            ConstraintFactory {
                token: "direction",
                name: "Direction",
                description: "Side of the head the word is on",
                ..label_factory(DIRECTIONS, extract_direction)
            },
            ConstraintFactory {
                token: "root",
                name: "Root",
                description: "Word has no head",
                operators: Operator::COMPARING,
                value_kind: ValueKind::Boolean,
                default_value: Value::Boolean(true),
                ..numeric_factory(Extractor::Boolean(extract_root))
            },
            ConstraintFactory {
                constraint_type: ConstraintType::Edge,
                ..text_factory("relation", "Relation", "Relation carried by the edge", extract_edge_relation)
            },
            ConstraintFactory {
                token: "distance",
                name: "Distance",
                description: "Linear distance between the edge ends",
                constraint_type: ConstraintType::Edge,
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_edge_distance))
            },
            ConstraintFactory {
                token: "direction",
                name: "Direction",
                description: "Side of the source the target is on",
                constraint_type: ConstraintType::Edge,
                ..label_factory(DIRECTIONS, extract_edge_direction)
            },
        ];
        for factory in builtins {
            context.insert(factory);
        }
        context
    }

    /// Token sequences: word features only
    pub fn ngram() -> Self {
        let mut context = Self::new(ContentType::Ngram);
        let builtins = [
            text_factory("form", "Form", "Surface form", extract_form),
            text_factory("lemma", "Lemma", "Lemma", extract_lemma),
            text_factory("pos", "Part of speech", "Universal part-of-speech tag", extract_upos),
            text_factory("xpos", "Tag", "Language-specific part-of-speech tag", extract_xpos),
            keyed_factory("feature", "Feature", "Morphological feature (specifier: key)", extract_feature),
        ];
        for factory in builtins {
            context.insert(factory);
        }
        context
    }

    /// Coreference mentions: head-word features, mention and entity features
    pub fn coreference() -> Self {
        let mut context = Self::new(ContentType::Coreference);
        let builtins = [
            text_factory("form", "Form", "Surface form of the mention head", extract_form),
            text_factory("lemma", "Lemma", "Lemma of the mention head", extract_lemma),
            text_factory("pos", "Part of speech", "Universal part-of-speech tag of the mention head", extract_upos),
            keyed_factory("feature", "Feature", "Morphological feature of the mention head (specifier: key)", extract_feature),
            text_factory("entity", "Entity type", "Type of the entity the mention refers to", extract_entity_kind),
            ConstraintFactory {
                token: "length",
                name: "Length",
                description: "Words in the mention",
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_mention_length))
            },
            ConstraintFactory {
                token: "cluster",
                name: "Cluster size",
                description: "Mentions of the same entity in the sentence",
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_cluster_size))
            },
            ConstraintFactory {
                token: "first",
                name: "First mention",
                description: "No earlier mention of the same entity",
                operators: Operator::COMPARING,
                value_kind: ValueKind::Boolean,
                default_value: Value::Boolean(true),
                ..numeric_factory(Extractor::Boolean(extract_first_mention))
            },
            ConstraintFactory {
                token: "distance",
                name: "Distance",
                description: "Mentions between the edge ends",
                constraint_type: ConstraintType::Edge,
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_edge_distance))
            },
            ConstraintFactory {
                token: "gap",
                name: "Gap",
                description: "Words between the two mentions",
                constraint_type: ConstraintType::Edge,
                max_instances: 2,
                ..numeric_factory(Extractor::Integer(extract_edge_gap))
            },
            ConstraintFactory {
                token: "direction",
                name: "Direction",
                description: "Side of the source the target mention is on",
                constraint_type: ConstraintType::Edge,
                ..label_factory(DIRECTIONS, extract_edge_direction)
            },
        ];
        for factory in builtins {
            context.insert(factory);
        }
        context
    }

    fn insert(&mut self, factory: ConstraintFactory) -> Arc<ConstraintFactory> {
        let factory = Arc::new(factory);
        self.index.insert(
            (factory.token, factory.constraint_type),
            self.factories.len(),
        );
        self.factories.push(Arc::clone(&factory));
        factory
    }

    /// Add a factory; tokens are unique per constraint type
    pub fn register(
        &mut self,
        factory: ConstraintFactory,
    ) -> Result<Arc<ConstraintFactory>, ConstraintError> {
        if self.index.contains_key(&(factory.token, factory.constraint_type)) {
            return Err(ConstraintError::Duplicate {
                token: factory.token.to_string(),
                constraint_type: factory.constraint_type,
            });
        }
        if !factory.extractor.produces(factory.value_kind)
            || !factory.value_kind.admits(&factory.default_value)
        {
            return Err(ConstraintError::KindMismatch {
                token: factory.token.to_string(),
                expected: factory.value_kind.name(),
            });
        }
        Ok(self.insert(factory))
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn factory(
        &self,
        token: &str,
        constraint_type: ConstraintType,
    ) -> Result<&Arc<ConstraintFactory>, ConstraintError> {
        let index: &FxHashMap<(&str, ConstraintType), usize> = &self.index;
        index
            .get(&(token, constraint_type))
            .map(|&i| &self.factories[i])
            .ok_or_else(|| ConstraintError::UnknownToken {
                token: token.to_string(),
                constraint_type,
            })
    }

    pub fn factories(&self, constraint_type: ConstraintType) -> impl Iterator<Item = &Arc<ConstraintFactory>> {
        self.factories
            .iter()
            .filter(move |f| f.constraint_type == constraint_type)
    }

    /// Whether a factory for the constraint's token and type is registered here
    pub fn recognizes(&self, constraint: &Constraint) -> bool {
        self.index
            .contains_key(&(constraint.token(), constraint.constraint_type()))
    }

    /// Look up a factory and build a constraint from a label
    pub fn create(
        &self,
        token: &str,
        constraint_type: ConstraintType,
        operator: Operator,
        label: &str,
        specifier: Option<&str>,
    ) -> Result<Constraint, ConstraintError> {
        self.factory(token, constraint_type)?
            .create_from_label(operator, label, specifier)
    }

    /// Shorthand for a node constraint
    pub fn node(&self, token: &str, operator: Operator, label: &str) -> Result<Constraint, ConstraintError> {
        self.create(token, ConstraintType::Node, operator, label, None)
    }

    /// Shorthand for an edge constraint
    pub fn edge(&self, token: &str, operator: Operator, label: &str) -> Result<Constraint, ConstraintError> {
        self.create(token, ConstraintType::Edge, operator, label, None)
    }

    /// Shorthand for a grouping constraint on a node feature
    pub fn group(&self, token: &str) -> Result<Constraint, ConstraintError> {
        self.create(token, ConstraintType::Node, Operator::Grouping, "", None)
    }
}

fn text_factory(
    token: &'static str,
    name: &'static str,
    description: &'static str,
    extract: TextFn,
) -> ConstraintFactory {
    ConstraintFactory {
        token,
        name,
        description,
        constraint_type: ConstraintType::Node,
        operators: Operator::TEXT,
        value_kind: ValueKind::Text,
        default_value: Value::text(""),
        min_instances: 0,
        max_instances: 1,
        needs_specifier: false,
        extractor: Extractor::Text(extract),
    }
}

fn keyed_factory(
    token: &'static str,
    name: &'static str,
    description: &'static str,
    extract: TextFn,
) -> ConstraintFactory {
    ConstraintFactory {
        max_instances: 4,
        needs_specifier: true,
        ..text_factory(token, name, description, extract)
    }
}

fn numeric_factory(extractor: Extractor) -> ConstraintFactory {
    ConstraintFactory {
        token: "",
        name: "",
        description: "",
        constraint_type: ConstraintType::Node,
        operators: Operator::NUMERICAL,
        value_kind: ValueKind::Integer,
        default_value: Value::Integer(0),
        min_instances: 0,
        max_instances: 1,
        needs_specifier: false,
        extractor,
    }
}

fn label_factory(labels: &'static [&'static str], extract: LabelFn) -> ConstraintFactory {
    ConstraintFactory {
        operators: Operator::COMPARING,
        value_kind: ValueKind::Label(labels),
        default_value: Value::text(labels[0]),
        ..numeric_factory(Extractor::Label(extract))
    }
}

fn extract_form<'a>(c: &Cursor<'a>, _: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    c.form().map(Some)
}

fn extract_lemma<'a>(c: &Cursor<'a>, _: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    c.lemma().map(Some)
}

fn extract_upos<'a>(c: &Cursor<'a>, _: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    c.upos().map(Some)
}

fn extract_xpos<'a>(c: &Cursor<'a>, _: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    c.xpos()
}

fn extract_relation<'a>(c: &Cursor<'a>, _: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    c.relation().map(Some)
}

fn extract_feature<'a>(c: &Cursor<'a>, key: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    match key {
        Some(key) => c.feature(key),
        None => Ok(None),
    }
}

fn extract_misc<'a>(c: &Cursor<'a>, key: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    match key {
        Some(key) => c.misc(key),
        None => Ok(None),
    }
}

fn extract_distance(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<i64>, CursorError> {
    c.distance()
}

fn extract_children(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<i64>, CursorError> {
    Ok(Some(c.child_count()? as i64))
}

fn extract_depth(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<i64>, CursorError> {
    Ok(Some(c.depth()? as i64))
}

fn extract_position(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<f64>, CursorError> {
    c.relative_position().map(Some)
}

fn extract_direction(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<&'static str>, CursorError> {
    c.direction()
}

fn extract_root(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<bool>, CursorError> {
    c.is_root().map(Some)
}

fn extract_entity_kind<'a>(c: &Cursor<'a>, _: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    c.entity_kind()
}

fn extract_mention_length(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<i64>, CursorError> {
    Ok(Some(c.mention_length()? as i64))
}

fn extract_cluster_size(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<i64>, CursorError> {
    Ok(Some(c.cluster_size()? as i64))
}

fn extract_first_mention(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<bool>, CursorError> {
    c.is_first_mention().map(Some)
}

fn extract_edge_gap(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<i64>, CursorError> {
    c.edge_gap().map(Some)
}

fn extract_edge_relation<'a>(c: &Cursor<'a>, _: Option<&str>) -> Result<Option<&'a str>, CursorError> {
    c.edge_relation().map(Some)
}

fn extract_edge_distance(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<i64>, CursorError> {
    c.edge_distance().map(Some)
}

fn extract_edge_direction(c: &Cursor<'_>, _: Option<&str>) -> Result<Option<&'static str>, CursorError> {
    c.edge_direction().map(Some)
}
