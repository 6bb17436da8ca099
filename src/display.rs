use crate::config::CatalogConfig;
use crate::filter::FilterFieldDescriptor;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::json;
use std::fmt::Write;

pub fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn operator_list(field: &FilterFieldDescriptor) -> String {
    field
        .kind()
        .operators()
        .iter()
        .map(|op| format!("{} ({})", op.tag(), op.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_catalog_list_text(catalogs: &[CatalogConfig]) -> String {
    let mut table = create_styled_table();
    table.set_header(vec!["Catalog", "Fields", "Search fields"]);

    for catalog in catalogs {
        table.add_row(vec![
            Cell::new(&catalog.name),
            Cell::new(catalog.fields.len()),
            Cell::new(catalog.search_fields.join(", ")),
        ]);
    }

    format!("{table}\n")
}

pub fn format_catalog_list_json(catalogs: &[CatalogConfig]) -> String {
    let catalogs: Vec<_> = catalogs
        .iter()
        .map(|catalog| {
            json!({
                "name": catalog.name,
                "fields": catalog.fields.len(),
                "search_fields": catalog.search_fields,
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({ "catalogs": catalogs }))
        .unwrap_or_else(|_| "{\"catalogs\":{\"error\":\"failed to serialize catalogs\"}}".into())
}

pub fn format_catalog_text(catalog: &CatalogConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "CATALOG {}", catalog.name);
    let _ = writeln!(out, "Search fields: {}", catalog.search_fields.join(", "));
    out.push('\n');

    let mut table = create_styled_table();
    table.set_header(vec!["Key", "Label", "Kind", "Operators", "Options"]);
    for field in &catalog.fields {
        let options = field
            .options()
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&field.key),
            Cell::new(&field.label),
            Cell::new(field.kind()),
            Cell::new(operator_list(field)),
            Cell::new(options),
        ]);
    }
    let _ = writeln!(out, "{table}");

    out
}

pub fn format_catalog_json(catalog: &CatalogConfig) -> String {
    let fields: Vec<_> = catalog
        .fields
        .iter()
        .map(|field| {
            json!({
                "key": field.key,
                "label": field.label,
                "kind": field.kind(),
                "placeholder": field.placeholder,
                "options": field.options(),
                "operators": field
                    .kind()
                    .operators()
                    .iter()
                    .map(|op| json!({"operator": op.tag(), "label": op.label()}))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "catalog": {
            "name": catalog.name,
            "search_fields": catalog.search_fields,
            "fields": fields,
        }
    }))
    .unwrap_or_else(|_| "{\"catalog\":{\"error\":\"failed to serialize catalog\"}}".into())
}
