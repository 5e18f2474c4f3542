//! Comparison operators
//!
//! An operator decides how an extracted feature is compared against the
//! value stored in a constraint. `Grouping` is special: it never filters,
//! it marks the constraint as a result dimension.

use crate::value::{FeatureValue, Value};
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    EqualsNot,
    Matches,
    MatchesNot,
    Contains,
    ContainsNot,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Grouping,
}

impl Operator {
    pub const ALL: &'static [Operator] = &[
        Operator::Equals,
        Operator::EqualsNot,
        Operator::Matches,
        Operator::MatchesNot,
        Operator::Contains,
        Operator::ContainsNot,
        Operator::LessThan,
        Operator::LessOrEqual,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
        Operator::Grouping,
    ];

    /// Operators that work on any value kind
    pub const COMPARING: &'static [Operator] =
        &[Operator::Equals, Operator::EqualsNot, Operator::Grouping];

    /// Operators for text features
    pub const TEXT: &'static [Operator] = &[
        Operator::Equals,
        Operator::EqualsNot,
        Operator::Matches,
        Operator::MatchesNot,
        Operator::Contains,
        Operator::ContainsNot,
        Operator::Grouping,
    ];

    /// Operators for numeric features
    pub const NUMERICAL: &'static [Operator] = &[
        Operator::Equals,
        Operator::EqualsNot,
        Operator::LessThan,
        Operator::LessOrEqual,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
        Operator::Grouping,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::EqualsNot => "!=",
            Operator::Matches => "~",
            Operator::MatchesNot => "!~",
            Operator::Contains => "#",
            Operator::ContainsNot => "!#",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Grouping => "<*>",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::EqualsNot => "equals-not",
            Operator::Matches => "matches",
            Operator::MatchesNot => "matches-not",
            Operator::Contains => "contains",
            Operator::ContainsNot => "contains-not",
            Operator::LessThan => "less-than",
            Operator::LessOrEqual => "less-or-equal",
            Operator::GreaterThan => "greater-than",
            Operator::GreaterOrEqual => "greater-or-equal",
            Operator::Grouping => "grouping",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operator::Equals => "Target value equals the constraint value",
            Operator::EqualsNot => "Target value differs from the constraint value",
            Operator::Matches => "Target text matches the regular expression",
            Operator::MatchesNot => "Target text does not match the regular expression",
            Operator::Contains => "Target text contains the constraint text",
            Operator::ContainsNot => "Target text does not contain the constraint text",
            Operator::LessThan => "Target number is less than the constraint value",
            Operator::LessOrEqual => "Target number is at most the constraint value",
            Operator::GreaterThan => "Target number is greater than the constraint value",
            Operator::GreaterOrEqual => "Target number is at least the constraint value",
            Operator::Grouping => "Groups results by the target value",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Operator::LessThan
                | Operator::LessOrEqual
                | Operator::GreaterThan
                | Operator::GreaterOrEqual
        )
    }

    pub fn is_comparing(&self) -> bool {
        Self::COMPARING.contains(self)
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Operator::Matches | Operator::MatchesNot)
    }

    pub fn is_grouping(&self) -> bool {
        matches!(self, Operator::Grouping)
    }

    /// Compare an extracted target against a constraint value
    ///
    /// Regular expressions are compiled on every call here; constraints keep
    /// a compiled pattern and go through `apply_regex` instead.
    pub fn apply(&self, target: FeatureValue<'_>, value: &Value) -> bool {
        match self {
            Operator::Equals => values_equal(target, value),
            Operator::EqualsNot => !values_equal(target, value),
            Operator::Matches | Operator::MatchesNot => match value {
                Value::Text(pattern) => match Regex::new(pattern) {
                    Ok(regex) => self.apply_regex(target, &regex),
                    Err(_) => *self == Operator::MatchesNot,
                },
                _ => *self == Operator::MatchesNot,
            },
            Operator::Contains => text_contains(target, value),
            Operator::ContainsNot => !text_contains(target, value),
            Operator::LessThan => compare(target, value).is_some_and(|o| o.is_lt()),
            Operator::LessOrEqual => compare(target, value).is_some_and(|o| o.is_le()),
            Operator::GreaterThan => compare(target, value).is_some_and(|o| o.is_gt()),
            Operator::GreaterOrEqual => compare(target, value).is_some_and(|o| o.is_ge()),
            Operator::Grouping => true,
        }
    }

    /// Match a precompiled pattern; the negated operators invert the outcome
    pub fn apply_regex(&self, target: FeatureValue<'_>, regex: &Regex) -> bool {
        let found = target.as_text().is_some_and(|s| regex.is_match(s));
        match self {
            Operator::MatchesNot | Operator::ContainsNot => !found,
            _ => found,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn values_equal(target: FeatureValue<'_>, value: &Value) -> bool {
    match (target, value) {
        (FeatureValue::Text(a), Value::Text(b)) => a == b,
        (FeatureValue::Integer(a), Value::Integer(b)) => a == *b,
        (FeatureValue::Boolean(a), Value::Boolean(b)) => a == *b,
        (FeatureValue::Integer(_) | FeatureValue::Float(_), Value::Integer(_) | Value::Float(_)) => {
            target.as_f64() == value.as_f64()
        }
        _ => false,
    }
}

fn text_contains(target: FeatureValue<'_>, value: &Value) -> bool {
    match (target, value) {
        (FeatureValue::Text(a), Value::Text(b)) => a.contains(b.as_str()),
        _ => false,
    }
}

fn compare(target: FeatureValue<'_>, value: &Value) -> Option<std::cmp::Ordering> {
    match (target, value) {
        (FeatureValue::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        _ => target.as_f64()?.partial_cmp(&value.as_f64()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<FeatureValue<'static>> {
        vec![
            FeatureValue::Text("NOUN"),
            FeatureValue::Text("noun"),
            FeatureValue::Text("3"),
            FeatureValue::Integer(3),
            FeatureValue::Integer(-1),
            FeatureValue::Float(3.0),
            FeatureValue::Boolean(true),
            FeatureValue::Absent,
        ]
    }

    fn values() -> Vec<Value> {
        vec![
            Value::text("NOUN"),
            Value::text("3"),
            Value::Integer(3),
            Value::Float(3.0),
            Value::Boolean(true),
            Value::Boolean(false),
        ]
    }

    #[test]
    fn test_equals_is_value_equality() {
        assert!(Operator::Equals.apply(FeatureValue::Text("NOUN"), &Value::text("NOUN")));
        assert!(!Operator::Equals.apply(FeatureValue::Text("noun"), &Value::text("NOUN")));
        assert!(Operator::Equals.apply(FeatureValue::Integer(3), &Value::Float(3.0)));
        assert!(!Operator::Equals.apply(FeatureValue::Text("3"), &Value::Integer(3)));
        assert!(!Operator::Equals.apply(FeatureValue::Absent, &Value::text("_")));
    }

    #[test]
    fn test_negated_operators_are_exact_complements() {
        let pairs = [
            (Operator::Equals, Operator::EqualsNot),
            (Operator::Matches, Operator::MatchesNot),
            (Operator::Contains, Operator::ContainsNot),
        ];
        for (positive, negative) in pairs {
            for target in targets() {
                for value in values() {
                    assert_ne!(
                        positive.apply(target, &value),
                        negative.apply(target, &value),
                        "{} vs {} on {:?} / {:?}",
                        positive,
                        negative,
                        target,
                        value
                    );
                }
            }
        }
    }

    #[test]
    fn test_numeric_operators() {
        let three = Value::Integer(3);
        assert!(Operator::LessThan.apply(FeatureValue::Integer(-1), &three));
        assert!(Operator::LessOrEqual.apply(FeatureValue::Float(3.0), &three));
        assert!(Operator::GreaterOrEqual.apply(FeatureValue::Text("3"), &three));
        assert!(!Operator::GreaterThan.apply(FeatureValue::Integer(3), &three));
        assert!(!Operator::LessThan.apply(FeatureValue::Absent, &three));
        assert!(!Operator::GreaterThan.apply(FeatureValue::Absent, &three));
    }

    #[test]
    fn test_regex_and_contains() {
        let pattern = Value::text("^(NOUN|VERB)$");
        assert!(Operator::Matches.apply(FeatureValue::Text("VERB"), &pattern));
        assert!(!Operator::Matches.apply(FeatureValue::Text("ADVERB"), &pattern));
        assert!(Operator::MatchesNot.apply(FeatureValue::Absent, &pattern));
        assert!(Operator::Contains.apply(FeatureValue::Text("nsubj:pass"), &Value::text("pass")));
    }

    #[test]
    fn test_grouping_never_filters() {
        for target in targets() {
            for value in values() {
                assert!(Operator::Grouping.apply(target, &value));
            }
        }
    }

    #[test]
    fn test_subsets_and_symbols() {
        assert!(Operator::NUMERICAL.iter().filter(|op| op.is_numerical()).count() == 4);
        assert!(Operator::COMPARING.iter().all(|op| !op.is_numerical()));
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(*op));
        }
    }
}
