use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Filter JSON record collections with search terms and typed field rules
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog config file (TOML); built-in catalogs are always available
    #[arg(long, global = true, env = "RECORD_FILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the output to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// When to use colors in diagnostics
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter a JSON array of records
    Filter {
        /// JSON file holding an array of objects
        file: PathBuf,

        /// Catalog describing the record fields (e.g. "classes")
        #[arg(short, long)]
        catalog: String,

        /// Free-text search term (case-insensitive substring)
        #[arg(short, long)]
        search: Option<String>,

        /// Rule as field:operator:value (repeatable, combined with AND)
        #[arg(short = 'r', long = "rule")]
        rules: Vec<String>,

        /// Fields the search term is matched against (overrides the catalog)
        #[arg(long, value_delimiter = ',')]
        search_fields: Vec<String>,

        /// Columns shown in text output (overrides the catalog)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Print only the number of matching records
        #[arg(long)]
        count: bool,

        /// Group the count by this field
        #[arg(long, requires = "count")]
        count_by: Option<String>,
    },
    /// List catalogs, or the fields and operators of one catalog
    Catalog {
        /// Catalog name
        name: Option<String>,
    },
    /// Validate every catalog in the config file
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filter_command() {
        let cli = Cli::try_parse_from([
            "record-filter",
            "-F",
            "json",
            "filter",
            "classes.json",
            "--catalog",
            "classes",
            "-r",
            "capacity:greater:40",
            "-r",
            "is_active:equals:true",
            "--search-fields",
            "name,code",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Filter {
                rules,
                search_fields,
                catalog,
                ..
            } => {
                assert_eq!(catalog, "classes");
                assert_eq!(rules.len(), 2);
                assert_eq!(search_fields, vec!["name", "code"]);
            }
            _ => panic!("expected filter command"),
        }
    }

    #[test]
    fn test_count_by_requires_count() {
        let result = Cli::try_parse_from([
            "record-filter",
            "filter",
            "a.json",
            "-c",
            "classes",
            "--count-by",
            "class_level",
        ]);
        assert!(result.is_err());
    }
}
