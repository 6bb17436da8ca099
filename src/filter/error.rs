use thiserror::Error;

/// Errors that can occur when parsing rule terms or coercing operands
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterParseError {
    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    #[error("Operator '{operator}' is not valid for {kind} fields. Valid operators are: {valid}")]
    IllegalOperator {
        operator: String,
        kind: String,
        valid: String,
    },

    #[error("Not a number: '{0}'")]
    NotANumber(String),

    #[error("Invalid date: '{0}'. Expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid range: '{0}'. Expected 'low,high'")]
    InvalidRange(String),

    #[error("Invalid filter expression: {0}")]
    InvalidExpression(String),
}

/// Authoring mistakes in a field catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Catalog has no fields")]
    EmptyCatalog,

    #[error("Invalid field key: '{0}'. Keys must be record attribute names")]
    InvalidKey(String),

    #[error("Duplicate field key: '{0}'")]
    DuplicateKey(String),

    #[error("Select field '{0}' has no options")]
    EmptyOptions(String),

    #[error("Field '{0}' has options but is not a select field")]
    UnexpectedOptions(String),
}
