//! Constraint payloads and extracted feature values
//!
//! `Value` is what a constraint stores; `FeatureValue` is what the cursor
//! hands back for the inspected position. The latter borrows from the
//! sentence so comparing a candidate never allocates.

use std::borrow::Cow;
use std::fmt;

/// Label written for a feature that has no value at a position
pub const ABSENT_LABEL: &str = "_";

/// Accepted value representation of a constraint kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Boolean,
    /// One of a fixed set of labels, stored as `Value::Text`
    Label(&'static [&'static str]),
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Label(_) => "label",
        }
    }

    /// Whether `value` is a legal payload for this kind
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Text, Value::Text(_)) => true,
            (ValueKind::Integer, Value::Integer(_)) => true,
            (ValueKind::Float, Value::Float(f)) => f.is_finite(),
            (ValueKind::Float, Value::Integer(_)) => true,
            (ValueKind::Boolean, Value::Boolean(_)) => true,
            (ValueKind::Label(labels), Value::Text(s)) => labels.contains(&s.as_str()),
            _ => false,
        }
    }
}

/// Owned constraint payload
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_feature(&self) -> FeatureValue<'_> {
        match self {
            Value::Text(s) => FeatureValue::Text(s),
            Value::Integer(i) => FeatureValue::Integer(*i),
            Value::Float(f) => FeatureValue::Float(*f),
            Value::Boolean(b) => FeatureValue::Boolean(*b),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_feature().as_f64()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Feature value extracted at a cursor position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Text(&'a str),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// The feature does not exist here (e.g. distance at the root)
    Absent,
}

impl<'a> FeatureValue<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FeatureValue::Absent)
    }

    /// Numeric view; text is parsed, booleans are not numbers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Integer(i) => Some(*i as f64),
            FeatureValue::Float(f) => Some(*f),
            FeatureValue::Text(s) => s.trim().parse::<f64>().ok(),
            FeatureValue::Boolean(_) | FeatureValue::Absent => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Label used when projecting this value onto a group dimension
    pub fn to_label(&self) -> Cow<'a, str> {
        match self {
            FeatureValue::Text(s) => Cow::Borrowed(s),
            FeatureValue::Integer(i) => Cow::Owned(i.to_string()),
            FeatureValue::Float(f) => Cow::Owned(f.to_string()),
            FeatureValue::Boolean(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            FeatureValue::Absent => Cow::Borrowed(ABSENT_LABEL),
        }
    }
}
