use crate::display::create_styled_table;
use crate::filter::{FilterCriteria, active_rules};
use crate::record::Record;
use comfy_table::Cell;
use serde::Serialize;
use serde_json::json;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

const MISSING: &str = "<none>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountGroup {
    pub key: String,
    pub count: usize,
}

pub fn collect_match_indices<R: Record>(records: &[R], criteria: &FilterCriteria) -> Vec<usize> {
    criteria.indices(records)
}

fn cell_text<R: Record>(record: &R, key: &str) -> String {
    record
        .field(key)
        .map(|value| value.to_text().into_owned())
        .unwrap_or_default()
}

fn describe_criteria(out: &mut String, criteria: &FilterCriteria) {
    if !criteria.search_term.trim().is_empty() {
        let _ = writeln!(
            out,
            "Search: \"{}\" in {}",
            criteria.search_term,
            criteria.search_fields.join(", ")
        );
    }
    for rule in active_rules(&criteria.rules) {
        let _ = writeln!(
            out,
            "Rule: {} {} \"{}\"",
            rule.field,
            rule.operator.label().to_lowercase(),
            rule.value
        );
    }
}

pub fn format_search_text<R: Record>(
    records: &[R],
    match_indices: &[usize],
    columns: &[String],
    criteria: &FilterCriteria,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "FILTER matched {} of {} record{}",
        match_indices.len(),
        records.len(),
        if records.len() == 1 { "" } else { "s" }
    );
    describe_criteria(&mut out, criteria);

    if match_indices.is_empty() {
        let _ = writeln!(out, "No matching records found.");
        return out;
    }
    out.push('\n');

    let mut table = create_styled_table();
    let mut header = vec![Cell::new("#")];
    header.extend(columns.iter().map(Cell::new));
    table.set_header(header);

    for &idx in match_indices {
        let record = &records[idx];
        let mut row = vec![Cell::new(idx + 1)];
        row.extend(columns.iter().map(|key| Cell::new(cell_text(record, key))));
        table.add_row(row);
    }
    let _ = writeln!(out, "{table}");

    out
}

pub fn format_search_json<R: Record + Serialize>(
    file: &Path,
    records: &[R],
    match_indices: &[usize],
    criteria: &FilterCriteria,
) -> String {
    let matched: Vec<&R> = match_indices.iter().map(|&idx| &records[idx]).collect();
    let rules: Vec<_> = active_rules(&criteria.rules).collect();

    serde_json::to_string_pretty(&json!({
        "search": {
            "file": file.display().to_string(),
            "total": records.len(),
            "matches": match_indices.len(),
            "search_term": criteria.search_term,
            "search_fields": criteria.search_fields,
            "rules": rules,
            "records": matched,
        }
    }))
    .unwrap_or_else(|_| "{\"search\":{\"error\":\"failed to serialize search output\"}}".into())
}

pub fn format_search_count_text<R: Record>(
    records: &[R],
    match_indices: &[usize],
    count_by: Option<&str>,
) -> String {
    let Some(field) = count_by else {
        return format!("{}\n", match_indices.len());
    };

    let groups = build_count_groups(records, match_indices, field);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "FILTER count by {} ({} record{})",
        field,
        match_indices.len(),
        if match_indices.len() == 1 { "" } else { "s" }
    );

    if groups.is_empty() {
        return out;
    }

    out.push('\n');
    for group in groups {
        let _ = writeln!(out, "{:>6}  {}", group.count, group.key);
    }

    out
}

pub fn format_search_count_json<R: Record>(
    file: &Path,
    records: &[R],
    match_indices: &[usize],
    count_by: Option<&str>,
) -> String {
    let groups = count_by
        .map(|field| build_count_groups(records, match_indices, field))
        .unwrap_or_default();

    serde_json::to_string_pretty(&json!({
        "search": {
            "file": file.display().to_string(),
            "matches": match_indices.len(),
            "count_by": count_by,
            "groups": groups
                .iter()
                .map(|group| json!({
                    "key": group.key,
                    "count": group.count,
                }))
                .collect::<Vec<_>>(),
        }
    }))
    .unwrap_or_else(|_| {
        "{\"search\":{\"error\":\"failed to serialize search count output\"}}".into()
    })
}

/// Group matches by the stringified value of `field`, largest group first
pub fn build_count_groups<R: Record>(
    records: &[R],
    match_indices: &[usize],
    field: &str,
) -> Vec<CountGroup> {
    let mut grouped: BTreeMap<String, usize> = BTreeMap::new();

    for &idx in match_indices {
        let key = records[idx]
            .field(field)
            .map(|value| value.to_text().into_owned())
            .unwrap_or_else(|| MISSING.to_string());
        *grouped.entry(key).or_insert(0) += 1;
    }

    let mut groups: Vec<_> = grouped
        .into_iter()
        .map(|(key, count)| CountGroup { key, count })
        .collect();
    groups.sort_by_key(|group| (Reverse(group.count), group.key.clone()));
    groups
}
