pub mod cli;
pub mod config;
pub mod display;
pub mod editor;
pub mod filter;
pub mod record;
pub mod search;

use crate::config::{CatalogConfig, RecordFilterConfig};
use crate::filter::{FieldCatalog, FilterCriteria, FilterRule};
pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
use colored::Colorize;
pub use editor::{FilterConsumer, FilterSession, RuleUpdate};
pub use filter::{CachedFilter, filter_records};
pub use record::{FieldValue, Record};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read a JSON (or JSON5) array of objects
pub fn load_records(path: &Path) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read records file '{}': {}", path.display(), e))?;
    let parsed: Value = json5::from_str(&raw)
        .map_err(|e| format!("Failed to parse records file '{}': {}", path.display(), e))?;

    let Value::Array(records) = parsed else {
        return Err(format!(
            "Records file '{}' must contain a JSON array of objects",
            path.display()
        )
        .into());
    };

    if let Some(pos) = records.iter().position(|r| !r.is_object()) {
        return Err(format!(
            "Record #{} in '{}' is not an object",
            pos + 1,
            path.display()
        )
        .into());
    }

    Ok(records)
}

/// Build rules from `field:operator:value` terms
pub fn build_rules(
    catalog: &FieldCatalog,
    terms: &[String],
) -> Result<Vec<FilterRule>, Box<dyn std::error::Error>> {
    terms
        .iter()
        .map(|term| {
            catalog
                .parse_rule(term)
                .map_err(|e| -> Box<dyn std::error::Error> {
                    format!("Invalid rule '{}': {}", term, e).into()
                })
        })
        .collect()
}

/// Warn about active rules whose field no record carries
fn print_filter_warnings(rules: &[FilterRule], records: &[Value]) {
    for rule in rules.iter().filter(|rule| rule.is_active()) {
        if !records.is_empty() && records.iter().all(|r| r.field(&rule.field).is_none()) {
            eprintln!(
                "{} no record has field '{}'; rule '{} {} {}' matches nothing",
                "Warning:".yellow().bold(),
                rule.field,
                rule.field,
                rule.operator,
                rule.value
            );
        }
    }
}

fn resolve_catalog(
    config: &RecordFilterConfig,
    name: &str,
) -> Result<CatalogConfig, Box<dyn std::error::Error>> {
    config.catalog(name)?.ok_or_else(|| {
        format!(
            "Catalog '{}' not found. Available: {}",
            name,
            config.catalog_names().join(", ")
        )
        .into()
    })
}

fn write_output_file(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, content)
        .map_err(|e| format!("Failed to write output file '{}': {}", path.display(), e).into())
}

fn emit(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    if let Some(path) = output {
        write_output_file(path, content)?;
    }
    Ok(())
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli_parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let config = crate::config::load_config(cli.config.as_deref())
        .map_err(|e| format!("Failed to load config: {}", e))?;
    if let Some(config_path) = &cli.config {
        info!(path = %config_path.display(), catalogs = config.catalogs.len(), "loaded config");
    }

    let format = cli.format;
    let output = cli.output.as_deref();

    match &cli.command {
        Commands::Filter {
            file,
            catalog,
            search,
            rules,
            search_fields,
            columns,
            count,
            count_by,
        } => {
            let catalog = resolve_catalog(&config, catalog)?;
            catalog.validate()?;

            let records = load_records(file)?;
            let rules = build_rules(&catalog.field_catalog(), rules)?;
            if !cli.quiet {
                print_filter_warnings(&rules, &records);
            }

            let search_fields = if search_fields.is_empty() {
                catalog.search_fields.clone()
            } else {
                search_fields.clone()
            };
            let criteria = FilterCriteria {
                rules,
                search_term: search.clone().unwrap_or_default(),
                search_fields,
            };
            debug!(?criteria, "filter criteria");

            let match_indices = crate::search::collect_match_indices(&records, &criteria);

            let content = match (format, *count) {
                (OutputFormat::Text, true) => crate::search::format_search_count_text(
                    &records,
                    &match_indices,
                    count_by.as_deref(),
                ),
                (OutputFormat::Json, true) => crate::search::format_search_count_json(
                    file,
                    &records,
                    &match_indices,
                    count_by.as_deref(),
                ),
                (OutputFormat::Text, false) => {
                    let columns = if columns.is_empty() {
                        catalog.display_columns()
                    } else {
                        columns.clone()
                    };
                    crate::search::format_search_text(
                        &records,
                        &match_indices,
                        &columns,
                        &criteria,
                    )
                }
                (OutputFormat::Json, false) => crate::search::format_search_json(
                    file,
                    &records,
                    &match_indices,
                    &criteria,
                ),
            };
            emit(&content, output)?;
        }
        Commands::Catalog { name } => {
            let content = match (name, format) {
                (Some(name), OutputFormat::Text) => {
                    crate::display::format_catalog_text(&resolve_catalog(&config, name)?)
                }
                (Some(name), OutputFormat::Json) => {
                    crate::display::format_catalog_json(&resolve_catalog(&config, name)?)
                }
                (None, OutputFormat::Text) => {
                    crate::display::format_catalog_list_text(&config.all_catalogs()?)
                }
                (None, OutputFormat::Json) => {
                    crate::display::format_catalog_list_json(&config.all_catalogs()?)
                }
            };
            emit(&content, output)?;
        }
        Commands::Validate => {
            config.validate()?;
            if !cli.quiet {
                println!(
                    "{} {} catalog(s) valid",
                    "OK".green().bold(),
                    config.catalog_names().len()
                );
            }
        }
    }

    Ok(())
}
