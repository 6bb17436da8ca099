use super::error::FilterParseError;
use super::model::{
    DateOperator, FilterRule, NumberOperator, Operator, SelectOperator, TextOperator,
};
use super::parser::{parse_date, parse_date_range, parse_number, parse_number_range};
use crate::record::{FieldValue, Record};
use serde::Serialize;
use tracing::{debug, trace};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn equals_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Rules that contribute a constraint (non-empty value)
pub fn active_rules(rules: &[FilterRule]) -> impl Iterator<Item = &FilterRule> {
    rules.iter().filter(|rule| rule.is_active())
}

/// Free-text predicate: true when the term is blank, or when at least one
/// search field contains it (case-insensitive)
pub fn matches_search<R, S>(record: &R, search_term: &str, search_fields: &[S]) -> bool
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    if search_term.trim().is_empty() {
        return true;
    }

    let needle = search_term.to_lowercase();
    search_fields.iter().any(|key| {
        record
            .field(key.as_ref())
            .is_some_and(|value| value.to_text().to_lowercase().contains(&needle))
    })
}

/// Evaluate one rule against a record. Inactive rules always hold.
pub fn matches_rule<R: Record + ?Sized>(record: &R, rule: &FilterRule) -> bool {
    if !rule.is_active() {
        return true;
    }

    let Some(value) = record.field(&rule.field) else {
        return false;
    };

    match evaluate(&value, rule.operator, &rule.value) {
        Ok(matched) => matched,
        Err(err) => {
            trace!(
                field = %rule.field,
                operator = %rule.operator,
                error = %err,
                "rule operand not coercible"
            );
            false
        }
    }
}

fn evaluate(
    value: &FieldValue<'_>,
    operator: Operator,
    operand: &str,
) -> Result<bool, FilterParseError> {
    let text = value.to_text();

    let matched = match operator {
        Operator::Text(TextOperator::Contains) => contains_ci(&text, operand),
        Operator::Text(TextOperator::Equals)
        | Operator::Select(SelectOperator::Equals)
        | Operator::Date(DateOperator::On)
        | Operator::Number(NumberOperator::Equals) => equals_ci(&text, operand),
        Operator::Select(SelectOperator::NotEquals) => !equals_ci(&text, operand),
        Operator::Text(TextOperator::StartsWith) => {
            text.to_lowercase().starts_with(&operand.to_lowercase())
        }
        Operator::Text(TextOperator::EndsWith) => {
            text.to_lowercase().ends_with(&operand.to_lowercase())
        }
        Operator::Number(NumberOperator::Greater) => value.as_number()? > parse_number(operand)?,
        Operator::Number(NumberOperator::Less) => value.as_number()? < parse_number(operand)?,
        Operator::Number(NumberOperator::Between) => {
            let (low, high) = parse_number_range(operand)?;
            let n = value.as_number()?;
            low <= n && n <= high
        }
        Operator::Date(DateOperator::Before) => value.as_date()? < parse_date(operand)?,
        Operator::Date(DateOperator::After) => value.as_date()? > parse_date(operand)?,
        Operator::Date(DateOperator::Between) => {
            let (low, high) = parse_date_range(operand)?;
            let d = value.as_date()?;
            low <= d && d <= high
        }
    };

    Ok(matched)
}

/// Search predicate AND every active rule
pub fn matches_record<R, S>(
    record: &R,
    rules: &[FilterRule],
    search_term: &str,
    search_fields: &[S],
) -> bool
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    matches_search(record, search_term, search_fields)
        && rules.iter().all(|rule| matches_rule(record, rule))
}

/// Indices of matching records, in input order
pub fn filter_indices<R, S>(
    records: &[R],
    rules: &[FilterRule],
    search_term: &str,
    search_fields: &[S],
) -> Vec<usize>
where
    R: Record,
    S: AsRef<str>,
{
    let indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            matches_record(record, rules, search_term, search_fields).then_some(idx)
        })
        .collect();

    debug!(
        total = records.len(),
        matched = indices.len(),
        active_rules = active_rules(rules).count(),
        search = !search_term.trim().is_empty(),
        "filtered records"
    );

    indices
}

/// Stable filter: the subsequence of `records` satisfying the search term
/// and every active rule
pub fn filter_records<'a, R, S>(
    records: &'a [R],
    rules: &[FilterRule],
    search_term: &str,
    search_fields: &[S],
) -> Vec<&'a R>
where
    R: Record,
    S: AsRef<str>,
{
    filter_indices(records, rules, search_term, search_fields)
        .into_iter()
        .map(|idx| &records[idx])
        .collect()
}

/// Owned bundle of everything the evaluator reads besides the records
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterCriteria {
    pub rules: Vec<FilterRule>,
    pub search_term: String,
    pub search_fields: Vec<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// No active rule and no search term: filtering is the identity
    pub fn is_idle(&self) -> bool {
        self.search_term.trim().is_empty() && active_rules(&self.rules).next().is_none()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        matches_record(record, &self.rules, &self.search_term, &self.search_fields)
    }

    pub fn indices<R: Record>(&self, records: &[R]) -> Vec<usize> {
        filter_indices(records, &self.rules, &self.search_term, &self.search_fields)
    }

    pub fn filter<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        filter_records(records, &self.rules, &self.search_term, &self.search_fields)
    }

    /// Like [`FilterCriteria::filter`] but returns owned copies
    pub fn apply<R: Record + Clone>(&self, records: &[R]) -> Vec<R> {
        records
            .iter()
            .filter(|record| self.matches(*record))
            .cloned()
            .collect()
    }
}
