//! Structured record filtering
//!
//! A filter is a list of rules, each a `field / operator / value` triple,
//! plus an optional free-text search over a list of fields. A record is
//! kept when the search matches AND every active rule matches.
//!
//! # Operators
//!
//! ```text
//! text    contains  equals  starts_with  ends_with
//! select  equals (Is)  not_equals (Is not)
//! date    equals (On)  before  after  between
//! number  equals  greater  less  between
//! ```
//!
//! Operands are strings. A rule with an empty value is inactive and never
//! excludes anything. `between` takes `low,high` and is inclusive on both
//! ends. Operands that do not coerce to the field's kind never match.
//!
//! # Rule terms
//!
//! ```text
//! capacity:greater:40
//! class_level:equals:class_9
//! created_at:between:2024-01-01,2024-06-30
//! ```

pub mod cache;
pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;

pub use cache::CachedFilter;
pub use error::{CatalogError, FilterParseError};
pub use matcher::{
    FilterCriteria, active_rules, filter_indices, filter_records, matches_record, matches_rule,
    matches_search,
};
pub use model::{
    DateOperator, FieldCatalog, FieldInput, FieldKind, FilterFieldDescriptor, FilterRule,
    NumberOperator, Operator, SelectOperator, SelectOption, TextOperator,
};
