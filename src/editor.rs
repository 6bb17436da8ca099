//! Rule editing session driven by a UI layer.
//!
//! `FilterSession` is a value type: every edit returns a new session and
//! leaves the old one untouched, so keeping an undo stack is just keeping
//! old values around.

use crate::filter::{FieldCatalog, FilterCriteria, FilterRule, Operator, active_rules};
use std::sync::Arc;
use tracing::warn;

/// Receives the published filter state
pub trait FilterConsumer {
    fn on_filters_changed(&mut self, rules: &[FilterRule]);
    fn on_search_changed(&mut self, search_term: &str);
}

/// One attribute change on a rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleUpdate {
    Field(String),
    Operator(Operator),
    Value(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSession {
    catalog: Arc<FieldCatalog>,
    rules: Vec<FilterRule>,
    search_term: String,
}

impl FilterSession {
    pub fn new(catalog: Arc<FieldCatalog>) -> Self {
        Self {
            catalog,
            rules: Vec::new(),
            search_term: String::new(),
        }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Append a rule on the first catalog field with its kind's `equals`
    /// operator and an empty (inactive) value
    pub fn with_rule_added(&self) -> Self {
        let Some(first) = self.catalog.first() else {
            warn!("cannot add a rule: catalog has no fields");
            return self.clone();
        };

        let mut next = self.clone();
        next.rules.push(FilterRule::new(
            first.key.clone(),
            first.kind().default_operator(),
            "",
        ));
        next
    }

    pub fn with_rule_removed(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.rules.len() {
            next.rules.remove(index);
        }
        next
    }

    /// Remove the rule at `index` and publish the remaining active rules,
    /// so the owner re-filters without a separate `apply`
    pub fn remove_rule<C: FilterConsumer + ?Sized>(&self, index: usize, consumer: &mut C) -> Self {
        let next = self.with_rule_removed(index);
        consumer.on_filters_changed(&next.active_rules());
        next
    }

    pub fn with_rule_updated(&self, index: usize, update: RuleUpdate) -> Self {
        let mut next = self.clone();
        if index >= next.rules.len() {
            return next;
        }
        let rule = &mut next.rules[index];

        match update {
            RuleUpdate::Field(field) => {
                if let Some(descriptor) = self.catalog.get(&field)
                    && descriptor.kind() != rule.operator.kind()
                {
                    rule.operator = descriptor.kind().default_operator();
                }
                rule.field = field;
            }
            RuleUpdate::Operator(operator) => match self.catalog.get(&rule.field) {
                Some(descriptor) if descriptor.kind() != operator.kind() => {
                    warn!(
                        field = %rule.field,
                        operator = %operator,
                        kind = %descriptor.kind(),
                        "ignoring operator not legal for field kind"
                    );
                }
                _ => rule.operator = operator,
            },
            RuleUpdate::Value(value) => rule.value = value,
        }

        next
    }

    pub fn with_search_term(&self, search_term: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.search_term = search_term.into();
        next
    }

    /// Rules with a non-empty value
    pub fn active_rules(&self) -> Vec<FilterRule> {
        active_rules(&self.rules).cloned().collect()
    }

    pub fn active_rule_count(&self) -> usize {
        active_rules(&self.rules).count()
    }

    /// Criteria for the evaluator, using the given search fields
    pub fn criteria<I, S>(&self, search_fields: I) -> FilterCriteria
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterCriteria {
            rules: self.active_rules(),
            search_term: self.search_term.clone(),
            search_fields: search_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Publish the active rules to the consumer
    pub fn apply<C: FilterConsumer + ?Sized>(&self, consumer: &mut C) {
        consumer.on_filters_changed(&self.active_rules());
    }

    /// Empty session on the same catalog; publishes no rules and no search
    pub fn clear<C: FilterConsumer + ?Sized>(&self, consumer: &mut C) -> Self {
        consumer.on_filters_changed(&[]);
        consumer.on_search_changed("");
        Self::new(Arc::clone(&self.catalog))
    }
}
