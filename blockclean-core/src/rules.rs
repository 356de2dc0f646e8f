// blockclean-core/src/rules.rs
//! Defines the rule model shared by the composer, the tree sanitizer and the
//! cleaning primitive.
//!
//! A [`RuleSet`] maps element tags (or, one level up, document field names) to
//! a [`Rule`]. The same type serves both purposes: a block tool declares
//! `field -> RuleSet`, an inline tool declares `tag -> rule`, and the tree
//! sanitizer looks a field name up in whatever set it currently holds.
//!
//! License: MIT OR Apache-2.0

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::sync::Arc;

use crate::errors::SanitizerError;

/// Tags that are structural punctuation inside formatted text. Every inline
/// config and every merged field config allows them.
pub const LINE_BREAK_TAGS: [&str; 2] = ["br", "wbr"];

/// What a [`Predicate`] is asked about.
///
/// At tag level `attribute` and `value` are `None`; at attribute level both
/// are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateInput<'a> {
    pub element: &'a str,
    pub attribute: Option<&'a str>,
    pub value: Option<&'a str>,
}

/// A rule decided in code rather than configuration.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&PredicateInput<'_>) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PredicateInput<'_>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn test(&self, input: &PredicateInput<'_>) -> bool {
        (self.0)(input)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A single sanitization rule.
///
/// `Allow`, `Set` and `Predicate` are rule-shaped; `Literal` carries plain
/// data (fixed attribute values, numbers, null) and is not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Rule {
    Allow(bool),
    Set(RuleSet),
    Predicate(Predicate),
    Literal(Value),
}

impl Rule {
    /// Whether this value carries sanitization policy rather than plain data.
    pub fn is_rule(&self) -> bool {
        match self {
            Rule::Allow(_) | Rule::Set(_) | Rule::Predicate(_) => true,
            Rule::Literal(_) => false,
        }
    }

    pub fn as_set(&self) -> Option<&RuleSet> {
        match self {
            Rule::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&PredicateInput<'_>) -> bool + Send + Sync + 'static,
    {
        Rule::Predicate(Predicate::new(f))
    }
}

impl From<Value> for Rule {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Rule::Allow(b),
            Value::Object(map) => Rule::Set(RuleSet::from(map)),
            other => Rule::Literal(other),
        }
    }
}

impl From<bool> for Rule {
    fn from(b: bool) -> Self {
        Rule::Allow(b)
    }
}

impl From<RuleSet> for Rule {
    fn from(set: RuleSet) -> Self {
        Rule::Set(set)
    }
}

impl From<&str> for Rule {
    fn from(s: &str) -> Self {
        Rule::Literal(Value::String(s.to_string()))
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rule::Allow(b) => serializer.serialize_bool(*b),
            Rule::Set(set) => set.serialize(serializer),
            Rule::Literal(value) => value.serialize(serializer),
            Rule::Predicate(_) => Err(S::Error::custom(SanitizerError::UnserializablePredicate)),
        }
    }
}

/// Mapping from tag or field name to [`Rule`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(BTreeMap<String, Rule>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Rule> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, rule: impl Into<Rule>) -> Option<Rule> {
        self.0.insert(key.into(), rule.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Rule> {
        self.0.iter()
    }

    /// The sub-rule a field of mapping-shaped data should use, if this set
    /// declares a rule-shaped entry for it.
    pub fn field_rule(&self, field: &str) -> Option<&Rule> {
        self.0.get(field).filter(|rule| rule.is_rule())
    }

    /// Copies every entry of `other` into `self`, replacing same-named entries
    /// wholesale. Nested sets are not merged.
    pub fn extend_from(&mut self, other: &RuleSet) {
        for (key, rule) in other.iter() {
            self.0.insert(key.clone(), rule.clone());
        }
    }

    /// Returns `self` overlaid with `overrides`, one level deep.
    pub fn merged_with(&self, overrides: &RuleSet) -> RuleSet {
        let mut merged = self.clone();
        merged.extend_from(overrides);
        merged
    }

    /// Forces every tag in [`LINE_BREAK_TAGS`] to `true`.
    pub fn allow_line_breaks(&mut self) {
        for tag in LINE_BREAK_TAGS {
            self.0.insert(tag.to_string(), Rule::Allow(true));
        }
    }
}

impl From<serde_json::Map<String, Value>> for RuleSet {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, Rule::from(v))).collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Rule)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, Rule)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = (&'a String, &'a Rule);
    type IntoIter = btree_map::Iter<'a, String, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
