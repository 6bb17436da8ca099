use super::error::{CatalogError, FilterParseError};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static FIELD_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid field key regex")
});

/// Kind of a filterable field; decides which operators are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Select,
    Date,
    Number,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Select => "select",
            FieldKind::Date => "date",
            FieldKind::Number => "number",
        };
        write!(f, "{name}")
    }
}

impl FieldKind {
    /// All operators legal for this kind, in display order
    pub fn operators(self) -> Vec<Operator> {
        match self {
            FieldKind::Text => TextOperator::ALL.iter().copied().map(Operator::Text).collect(),
            FieldKind::Select => SelectOperator::ALL
                .iter()
                .copied()
                .map(Operator::Select)
                .collect(),
            FieldKind::Date => DateOperator::ALL.iter().copied().map(Operator::Date).collect(),
            FieldKind::Number => NumberOperator::ALL
                .iter()
                .copied()
                .map(Operator::Number)
                .collect(),
        }
    }

    /// The operator a freshly added rule starts with
    pub fn default_operator(self) -> Operator {
        match self {
            FieldKind::Text => Operator::Text(TextOperator::Equals),
            FieldKind::Select => Operator::Select(SelectOperator::Equals),
            FieldKind::Date => Operator::Date(DateOperator::On),
            FieldKind::Number => Operator::Number(NumberOperator::Equals),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOperator {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
}

impl TextOperator {
    pub const ALL: [TextOperator; 4] = [
        TextOperator::Contains,
        TextOperator::Equals,
        TextOperator::StartsWith,
        TextOperator::EndsWith,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectOperator {
    Equals,
    NotEquals,
}

impl SelectOperator {
    pub const ALL: [SelectOperator; 2] = [SelectOperator::Equals, SelectOperator::NotEquals];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOperator {
    /// Stringified equality, tagged `equals`
    On,
    Before,
    After,
    Between,
}

impl DateOperator {
    pub const ALL: [DateOperator; 4] = [
        DateOperator::On,
        DateOperator::Before,
        DateOperator::After,
        DateOperator::Between,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberOperator {
    Equals,
    Greater,
    Less,
    Between,
}

impl NumberOperator {
    pub const ALL: [NumberOperator; 4] = [
        NumberOperator::Equals,
        NumberOperator::Greater,
        NumberOperator::Less,
        NumberOperator::Between,
    ];
}

/// A rule operator, tagged by the field kind it belongs to.
///
/// Each kind carries its own operator enum, so a `(kind, operator)` pair
/// that the catalog does not allow cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Text(TextOperator),
    Select(SelectOperator),
    Date(DateOperator),
    Number(NumberOperator),
}

impl Operator {
    /// Resolve an operator tag (e.g. `starts_with`) for the given field kind
    pub fn parse(kind: FieldKind, tag: &str) -> Result<Self, FilterParseError> {
        let wanted = tag.trim().to_lowercase();
        kind.operators()
            .into_iter()
            .find(|op| op.tag() == wanted)
            .ok_or_else(|| FilterParseError::IllegalOperator {
                operator: tag.to_string(),
                kind: kind.to_string(),
                valid: kind
                    .operators()
                    .iter()
                    .map(|op| op.tag())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Operator::Text(_) => FieldKind::Text,
            Operator::Select(_) => FieldKind::Select,
            Operator::Date(_) => FieldKind::Date,
            Operator::Number(_) => FieldKind::Number,
        }
    }

    /// Stable identifier used in rule terms and JSON output
    pub fn tag(&self) -> &'static str {
        match self {
            Operator::Text(TextOperator::Contains) => "contains",
            Operator::Text(TextOperator::Equals) => "equals",
            Operator::Text(TextOperator::StartsWith) => "starts_with",
            Operator::Text(TextOperator::EndsWith) => "ends_with",
            Operator::Select(SelectOperator::Equals) => "equals",
            Operator::Select(SelectOperator::NotEquals) => "not_equals",
            Operator::Date(DateOperator::On) => "equals",
            Operator::Date(DateOperator::Before) => "before",
            Operator::Date(DateOperator::After) => "after",
            Operator::Date(DateOperator::Between) => "between",
            Operator::Number(NumberOperator::Equals) => "equals",
            Operator::Number(NumberOperator::Greater) => "greater",
            Operator::Number(NumberOperator::Less) => "less",
            Operator::Number(NumberOperator::Between) => "between",
        }
    }

    /// Human-readable label for pickers
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Text(TextOperator::Contains) => "Contains",
            Operator::Text(TextOperator::Equals) => "Equals",
            Operator::Text(TextOperator::StartsWith) => "Starts with",
            Operator::Text(TextOperator::EndsWith) => "Ends with",
            Operator::Select(SelectOperator::Equals) => "Is",
            Operator::Select(SelectOperator::NotEquals) => "Is not",
            Operator::Date(DateOperator::On) => "On",
            Operator::Date(DateOperator::Before) => "Before",
            Operator::Date(DateOperator::After) => "After",
            Operator::Date(DateOperator::Between) => "Between",
            Operator::Number(NumberOperator::Equals) => "Equals",
            Operator::Number(NumberOperator::Greater) => "Greater than",
            Operator::Number(NumberOperator::Less) => "Less than",
            Operator::Number(NumberOperator::Between) => "Between",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// One legal value of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Input shape of a field. Options only exist on select fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldInput {
    Text,
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    Date,
    Number,
}

impl FieldInput {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldInput::Text => FieldKind::Text,
            FieldInput::Select { .. } => FieldKind::Select,
            FieldInput::Date => FieldKind::Date,
            FieldInput::Number => FieldKind::Number,
        }
    }
}

/// Describes one filterable attribute of a record shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldDescriptor")]
pub struct FilterFieldDescriptor {
    /// Record attribute name
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub input: FieldInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Descriptor as authored in config, before `options` is checked
/// against the kind
#[derive(Deserialize)]
struct RawFieldDescriptor {
    key: String,
    label: String,
    kind: FieldKind,
    #[serde(default)]
    options: Option<Vec<SelectOption>>,
    #[serde(default)]
    placeholder: Option<String>,
}

impl TryFrom<RawFieldDescriptor> for FilterFieldDescriptor {
    type Error = CatalogError;

    fn try_from(raw: RawFieldDescriptor) -> Result<Self, Self::Error> {
        let input = match (raw.kind, raw.options) {
            (FieldKind::Select, options) => FieldInput::Select {
                options: options.unwrap_or_default(),
            },
            (_, Some(_)) => return Err(CatalogError::UnexpectedOptions(raw.key)),
            (FieldKind::Text, None) => FieldInput::Text,
            (FieldKind::Date, None) => FieldInput::Date,
            (FieldKind::Number, None) => FieldInput::Number,
        };

        Ok(Self {
            key: raw.key,
            label: raw.label,
            input,
            placeholder: raw.placeholder,
        })
    }
}

impl FilterFieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, input: FieldInput) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            input,
            placeholder: None,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldInput::Text)
    }

    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(key, label, FieldInput::Select { options })
    }

    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldInput::Date)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldInput::Number)
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn kind(&self) -> FieldKind {
        self.input.kind()
    }

    pub fn options(&self) -> &[SelectOption] {
        match &self.input {
            FieldInput::Select { options } => options,
            _ => &[],
        }
    }
}

/// The set of fields that may be filtered for one record shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCatalog {
    pub fields: Vec<FilterFieldDescriptor>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FilterFieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FilterFieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn first(&self) -> Option<&FilterFieldDescriptor> {
        self.fields.first()
    }

    /// Check the authoring invariants: non-empty, well-formed unique keys,
    /// and at least one option on every select field
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.fields.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !FIELD_KEY_RE.is_match(&field.key) {
                return Err(CatalogError::InvalidKey(field.key.clone()));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(CatalogError::DuplicateKey(field.key.clone()));
            }
            if let FieldInput::Select { options } = &field.input
                && options.is_empty()
            {
                return Err(CatalogError::EmptyOptions(field.key.clone()));
            }
        }

        Ok(())
    }

    /// Build a rule from a `field:operator:value` term.
    ///
    /// The value may itself contain colons (e.g. timestamps); only the
    /// first two separators split the term.
    pub fn parse_rule(&self, term: &str) -> Result<FilterRule, FilterParseError> {
        let parts: Vec<&str> = term.splitn(3, ':').collect();
        if parts.len() != 3 {
            return Err(FilterParseError::InvalidExpression(format!(
                "Expected 'field:operator:value' format, got: {}",
                term
            )));
        }

        let field = parts[0].trim();
        let descriptor = self
            .get(field)
            .ok_or_else(|| FilterParseError::UnknownField(field.to_string()))?;
        let operator = Operator::parse(descriptor.kind(), parts[1])?;

        Ok(FilterRule::new(field, operator, parts[2].trim()))
    }
}

/// One user-authored predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterRule {
    pub field: String,
    pub operator: Operator,
    /// String-encoded operand; empty means the rule is inactive
    pub value: String,
}

impl FilterRule {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.value.is_empty()
    }
}
