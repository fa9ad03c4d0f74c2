//! Backend-neutral boolean filter trees
//!
//! A [`Predicate`] is built once from a typed query object and handed to a
//! [`DocumentBackend`](crate::backend::DocumentBackend), which translates it
//! into its own filter language. An empty `And` node matches every document.

pub mod builder;
pub mod region;
pub mod schema;

use serde::Serialize;
use serde_json::Value;

pub use builder::{PredicateBuilder, PreparedQuery};
pub use schema::{Capabilities, EntitySchema, FieldSpec, FieldType};

/// Boolean filter over document field paths
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Leaf(Condition),
}

/// A comparator applied to one dotted field path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub field: String,
    pub comparator: Comparator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Comparator {
    Equals { value: Value },
    Range {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
    Exists { present: bool },
    Regex {
        pattern: String,
        case_insensitive: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bound {
    pub value: Value,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            inclusive: true,
        }
    }

    pub fn exclusive(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
        }
    }
}

impl Predicate {
    /// The vacuous predicate
    pub fn match_all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Predicate::And(children) if children.is_empty())
    }

    /// Conjunction, flattening nested ANDs and dropping match-all children
    pub fn and(children: Vec<Predicate>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap_or_else(Predicate::match_all)
        } else {
            Predicate::And(flat)
        }
    }

    /// Disjunction; a single child collapses to itself
    pub fn or(mut children: Vec<Predicate>) -> Self {
        if children.len() == 1 {
            children.pop().unwrap_or_else(Predicate::match_all)
        } else {
            Predicate::Or(children)
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(field, Comparator::Equals { value: value.into() })
    }

    pub fn range(field: impl Into<String>, lower: Option<Bound>, upper: Option<Bound>) -> Self {
        Self::leaf(field, Comparator::Range { lower, upper })
    }

    pub fn exists(field: impl Into<String>, present: bool) -> Self {
        Self::leaf(field, Comparator::Exists { present })
    }

    pub fn regex(field: impl Into<String>, pattern: impl Into<String>, case_insensitive: bool) -> Self {
        Self::leaf(
            field,
            Comparator::Regex {
                pattern: pattern.into(),
                case_insensitive,
            },
        )
    }

    fn leaf(field: impl Into<String>, comparator: Comparator) -> Self {
        Predicate::Leaf(Condition {
            field: field.into(),
            comparator,
        })
    }

    /// Every leaf condition, depth first
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_conditions(out);
                }
            },
            Predicate::Leaf(condition) => out.push(condition),
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::match_all()
    }
}
