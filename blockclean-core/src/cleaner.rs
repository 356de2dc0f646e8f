// blockclean-core/src/cleaner.rs
//! The markup-stripping primitive.
//!
//! [`HtmlCleaner`] is the seam between rule handling and actual HTML work:
//! given one string and one [`RuleSet`] it returns the cleaned string. The core
//! never inspects markup itself. [`AmmoniaCleaner`] is the shipped
//! implementation; any `Fn(&str, &RuleSet) -> String` works as well.
//!
//! License: MIT OR APACHE 2.0

use ammonia::Builder;
use log::debug;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use crate::rules::{Predicate, PredicateInput, Rule, RuleSet};

/// Tags whose content is dropped together with the tag unless allowed.
const CLEAN_CONTENT_TAGS: [&str; 2] = ["script", "style"];

/// Cleans one string against an allow-list.
///
/// Implementations must deny tags that have no entry in `rules`.
pub trait HtmlCleaner: Send + Sync {
    fn clean(&self, input: &str, rules: &RuleSet) -> String;
}

impl<F> HtmlCleaner for F
where
    F: Fn(&str, &RuleSet) -> String + Send + Sync,
{
    fn clean(&self, input: &str, rules: &RuleSet) -> String {
        self(input, rules)
    }
}

/// [`HtmlCleaner`] backed by the `ammonia` HTML sanitizer.
///
/// Element rules: `true` or a mapping allows the tag; a predicate is asked
/// once about the bare tag. Attribute rules: `true` allows the attribute, a
/// string or number sets a fixed value, a predicate is asked per value.
/// Comments are stripped and no `rel` is injected into links.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaCleaner;

impl AmmoniaCleaner {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Default)]
struct CleanPlan<'r> {
    tags: HashSet<&'r str>,
    tag_attributes: HashMap<&'r str, HashSet<&'r str>>,
    fixed_values: Vec<(&'r str, &'r str, String)>,
    filters: HashMap<(String, String), Predicate>,
}

impl<'r> CleanPlan<'r> {
    fn from_rules(rules: &'r RuleSet) -> Self {
        let mut plan = CleanPlan::default();
        for (tag, rule) in rules {
            match rule {
                Rule::Allow(true) => {
                    plan.tags.insert(tag.as_str());
                }
                Rule::Allow(false) | Rule::Literal(_) => {}
                Rule::Predicate(predicate) => {
                    let input = PredicateInput {
                        element: tag.as_str(),
                        attribute: None,
                        value: None,
                    };
                    if predicate.test(&input) {
                        plan.tags.insert(tag.as_str());
                    }
                }
                Rule::Set(attributes) => {
                    plan.tags.insert(tag.as_str());
                    plan.add_attributes(tag, attributes);
                }
            }
        }
        plan
    }

    fn add_attributes(&mut self, tag: &'r str, attributes: &'r RuleSet) {
        for (attribute, rule) in attributes {
            match rule {
                Rule::Allow(true) => {
                    self.tag_attributes.entry(tag).or_default().insert(attribute.as_str());
                }
                Rule::Allow(false) | Rule::Literal(Value::Null) => {}
                Rule::Literal(Value::String(fixed)) => {
                    self.fixed_values.push((tag, attribute.as_str(), fixed.clone()));
                }
                Rule::Literal(other) => {
                    self.fixed_values.push((tag, attribute.as_str(), other.to_string()));
                }
                Rule::Predicate(predicate) => {
                    self.tag_attributes.entry(tag).or_default().insert(attribute.as_str());
                    self.filters
                        .insert((tag.to_string(), attribute.clone()), predicate.clone());
                }
                Rule::Set(_) => {
                    debug!("Ignoring nested rule set for attribute '{}' on <{}>.", attribute, tag);
                }
            }
        }
    }
}

impl HtmlCleaner for AmmoniaCleaner {
    fn clean(&self, input: &str, rules: &RuleSet) -> String {
        let CleanPlan {
            tags,
            tag_attributes,
            fixed_values,
            filters,
        } = CleanPlan::from_rules(rules);

        let clean_content: HashSet<&str> = CLEAN_CONTENT_TAGS
            .iter()
            .copied()
            .filter(|tag| !tags.contains(tag))
            .collect();

        let mut builder = Builder::default();
        builder
            .tags(tags)
            .clean_content_tags(clean_content)
            .tag_attributes(tag_attributes)
            .generic_attributes(HashSet::<&str>::new())
            .link_rel(None)
            .strip_comments(true);

        for (tag, attribute, value) in &fixed_values {
            builder.set_tag_attribute_value(*tag, *attribute, value.as_str());
        }

        if !filters.is_empty() {
            builder.attribute_filter(move |element, attribute, value| {
                let key = (element.to_string(), attribute.to_string());
                match filters.get(&key) {
                    Some(predicate) => {
                        let input = PredicateInput {
                            element,
                            attribute: Some(attribute),
                            value: Some(value),
                        };
                        predicate.test(&input).then_some(Cow::Borrowed(value))
                    }
                    None => Some(Cow::Borrowed(value)),
                }
            });
        }

        builder.clean(input).to_string()
    }
}
