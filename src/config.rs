//! Table schema and per-resource settings.
//!
//! A [`ResourceConfig`] is built once, validated, and then shared read-only by every
//! operation of a [`Resource`](crate::resource::Resource). Invalid settings (a reserved
//! delimiter, an operator the range key cannot support, ...) fail here, before the
//! resource serves anything.

use crate::{
    common::{
        key::{KeyType, KeyValue},
        range::RangeOperator,
    },
    error::{Error, Result},
    hydrate::{FieldDefault, KeyField, KeyRole},
};

use aws_sdk_dynamodb::types;
use serde::{Deserialize, Serialize};

/// Characters that cannot delimit key halves because they carry URL or query-string syntax.
pub const RESERVED_DELIMITERS: [char; 3] = [';', '&', '?'];

/// Default delimiter between the hash and range halves of a slug.
pub const DEFAULT_DELIMITER: char = ':';

/// Default number of items returned by one list call.
pub const DEFAULT_LIMIT: i32 = 20;

/// Name and declared type of a key attribute.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KeyAttribute {
    /// The attribute name.
    pub name: String,
    /// The declared type.
    #[serde(rename = "type")]
    pub key_type: KeyType,
}

impl KeyAttribute {
    /// Create a key attribute.
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            name: name.into(),
            key_type,
        }
    }

    pub(crate) fn coerce(&self, raw: &str) -> Result<KeyValue> {
        self.key_type.coerce(raw)
    }
}

/// Key layout of one table.
///
/// ```rust
/// use dynamodb_resource::{common::key::KeyType, config};
///
/// let schema = config::TableSchema::new("events", config::KeyAttribute::new("id", KeyType::Number))
///     .with_range_key(config::KeyAttribute::new("ts", KeyType::Number));
/// assert_eq!(schema.key_names().collect::<Vec<_>>(), vec!["id", "ts"]);
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableSchema {
    /// The table name.
    pub table_name: String,
    /// The hash (partition) key.
    pub hash_key: KeyAttribute,
    /// The range (sort) key, for composite primary keys.
    #[serde(default)]
    pub range_key: Option<KeyAttribute>,
}

impl TableSchema {
    /// Create a hash-only schema.
    pub fn new(table_name: impl Into<String>, hash_key: KeyAttribute) -> Self {
        Self {
            table_name: table_name.into(),
            hash_key,
            range_key: None,
        }
    }

    /// Add a range key.
    pub fn with_range_key(mut self, range_key: KeyAttribute) -> Self {
        self.range_key = Some(range_key);
        self
    }

    /// Key attribute names, hash first.
    pub fn key_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hash_key.name.as_str())
            .chain(self.range_key.as_ref().map(|range_key| range_key.name.as_str()))
    }
}

impl TryFrom<&types::TableDescription> for TableSchema {
    type Error = Error;

    fn try_from(description: &types::TableDescription) -> Result<Self> {
        let table_name = description
            .table_name()
            .ok_or_else(|| Error::Configuration("table description has no name".to_string()))?;
        let key_attribute = |name: &str| -> Result<KeyAttribute> {
            let definition = description
                .attribute_definitions()
                .iter()
                .find(|definition| definition.attribute_name() == name)
                .ok_or_else(|| {
                    Error::Configuration(format!("key attribute `{name}` has no definition"))
                })?;
            let key_type = match definition.attribute_type() {
                types::ScalarAttributeType::N => KeyType::Number,
                types::ScalarAttributeType::S => KeyType::String,
                other => {
                    return Err(Error::Configuration(format!(
                        "key attribute `{name}` has unsupported type {other:?}"
                    )));
                }
            };
            Ok(KeyAttribute::new(name, key_type))
        };
        let mut hash_key = None;
        let mut range_key = None;
        for element in description.key_schema() {
            let attribute = key_attribute(element.attribute_name())?;
            match element.key_type() {
                types::KeyType::Hash => hash_key = Some(attribute),
                types::KeyType::Range => range_key = Some(attribute),
                other => {
                    return Err(Error::Configuration(format!(
                        "unsupported key role {other:?}"
                    )));
                }
            }
        }
        let hash_key = hash_key.ok_or_else(|| {
            Error::Configuration(format!("table `{table_name}` has no hash key"))
        })?;
        Ok(Self {
            table_name: table_name.to_string(),
            hash_key,
            range_key,
        })
    }
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_limit() -> i32 {
    DEFAULT_LIMIT
}

fn default_scan_index_forward() -> bool {
    true
}

/// Unvalidated resource settings.
///
/// Settings can be assembled in code or deserialized; [`build`](Self::build) applies the
/// validation rules.
///
/// ```rust
/// use dynamodb_resource::{common::{key::KeyType, range::RangeOperator}, config};
///
/// let schema = config::TableSchema::new("events", config::KeyAttribute::new("id", KeyType::Number))
///     .with_range_key(config::KeyAttribute::new("ts", KeyType::Number));
/// let config = config::ResourceConfig::builder(schema)
///     .range_operator(RangeOperator::Between)
///     .consistent_read(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.primary_key_delimiter(), ':');
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct ResourceConfigBuilder {
    table: TableSchema,
    #[serde(default)]
    consistent_read: bool,
    #[serde(default = "default_delimiter")]
    primary_key_delimiter: char,
    #[serde(default = "default_scan_index_forward")]
    scan_index_forward: bool,
    #[serde(default)]
    range_operator: RangeOperator,
    #[serde(default = "default_limit")]
    limit: i32,
    #[serde(default)]
    resource_name: Option<String>,
    #[serde(default)]
    api_name: Option<String>,
    #[serde(default)]
    updateable_keys: bool,
    #[serde(skip)]
    hash_key_default: Option<FieldDefault>,
    #[serde(skip)]
    range_key_default: Option<FieldDefault>,
}

impl ResourceConfigBuilder {
    /// Whether point reads and queries are strongly consistent.
    pub fn consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    /// The character joining key halves in slugs and operands in range filters.
    pub fn primary_key_delimiter(mut self, delimiter: char) -> Self {
        self.primary_key_delimiter = delimiter;
        self
    }

    /// Whether list results are in ascending range key order.
    pub fn scan_index_forward(mut self, scan_index_forward: bool) -> Self {
        self.scan_index_forward = scan_index_forward;
        self
    }

    /// The operator applied to range filters of list requests.
    pub fn range_operator(mut self, range_operator: RangeOperator) -> Self {
        self.range_operator = range_operator;
        self
    }

    /// The page size of list requests.
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = limit;
        self
    }

    /// The URI segment naming the resource; defaults to the table name.
    pub fn resource_name(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = Some(resource_name.into());
        self
    }

    /// The URI segment naming the API the resource belongs to.
    pub fn api_name(mut self, api_name: impl Into<String>) -> Self {
        self.api_name = Some(api_name.into());
        self
    }

    /// Whether update payloads may carry key attributes.
    pub fn updateable_keys(mut self, updateable_keys: bool) -> Self {
        self.updateable_keys = updateable_keys;
        self
    }

    /// Value given to the hash key on create.
    pub fn hash_key_default(mut self, default: FieldDefault) -> Self {
        self.hash_key_default = Some(default);
        self
    }

    /// Value given to the range key on create.
    pub fn range_key_default(mut self, default: FieldDefault) -> Self {
        self.range_key_default = Some(default);
        self
    }

    /// Validate the settings.
    pub fn build(self) -> Result<ResourceConfig> {
        let delimiter = self.primary_key_delimiter;
        if RESERVED_DELIMITERS.contains(&delimiter) {
            return Err(Error::Configuration(format!(
                "`{delimiter}` is not a valid delimiter"
            )));
        }
        if self.limit <= 0 {
            return Err(Error::Configuration(format!(
                "limit must be positive, got {}",
                self.limit
            )));
        }
        if self.table.table_name.is_empty() {
            return Err(Error::Configuration("table name is empty".to_string()));
        }
        if self.table.key_names().any(str::is_empty) {
            return Err(Error::Configuration("key attribute name is empty".to_string()));
        }
        match &self.table.range_key {
            None if self.range_operator != RangeOperator::Equal => {
                return Err(Error::Configuration(format!(
                    "range operator {:?} needs a range key",
                    self.range_operator
                )));
            }
            None if self.range_key_default.is_some() => {
                return Err(Error::Configuration(
                    "range key default needs a range key".to_string(),
                ));
            }
            Some(range_key) if !self.range_operator.supports(range_key.key_type) => {
                return Err(Error::Configuration(format!(
                    "range operator {:?} does not apply to {} range key `{}`",
                    self.range_operator, range_key.key_type, range_key.name
                )));
            }
            _ => {}
        }
        check_default(&self.hash_key_default, &self.table.hash_key)?;
        if let Some(range_key) = &self.table.range_key {
            check_default(&self.range_key_default, range_key)?;
        }
        let resource_name = self
            .resource_name
            .unwrap_or_else(|| self.table.table_name.clone());
        Ok(ResourceConfig {
            schema: self.table,
            consistent_read: self.consistent_read,
            primary_key_delimiter: delimiter,
            scan_index_forward: self.scan_index_forward,
            range_operator: self.range_operator,
            limit: self.limit,
            resource_name,
            api_name: self.api_name,
            updateable_keys: self.updateable_keys,
            hash_key_default: self.hash_key_default,
            range_key_default: self.range_key_default,
        })
    }
}

fn check_default(default: &Option<FieldDefault>, attribute: &KeyAttribute) -> Result<()> {
    match default {
        Some(FieldDefault::Value(value)) if value.key_type() != attribute.key_type => {
            Err(Error::Configuration(format!(
                "default `{value}` of key `{}` is not a {}",
                attribute.name, attribute.key_type
            )))
        }
        _ => Ok(()),
    }
}

/// Validated, immutable settings of one resource.
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    schema: TableSchema,
    consistent_read: bool,
    primary_key_delimiter: char,
    scan_index_forward: bool,
    range_operator: RangeOperator,
    limit: i32,
    resource_name: String,
    api_name: Option<String>,
    updateable_keys: bool,
    hash_key_default: Option<FieldDefault>,
    range_key_default: Option<FieldDefault>,
}

impl ResourceConfig {
    /// Start configuring a resource over `schema`.
    pub fn builder(schema: TableSchema) -> ResourceConfigBuilder {
        ResourceConfigBuilder {
            table: schema,
            consistent_read: false,
            primary_key_delimiter: DEFAULT_DELIMITER,
            scan_index_forward: true,
            range_operator: RangeOperator::default(),
            limit: DEFAULT_LIMIT,
            resource_name: None,
            api_name: None,
            updateable_keys: false,
            hash_key_default: None,
            range_key_default: None,
        }
    }

    /// The table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Whether point reads and queries are strongly consistent.
    pub fn consistent_read(&self) -> bool {
        self.consistent_read
    }

    /// The slug and range filter delimiter.
    pub fn primary_key_delimiter(&self) -> char {
        self.primary_key_delimiter
    }

    /// Whether list results are in ascending range key order.
    pub fn scan_index_forward(&self) -> bool {
        self.scan_index_forward
    }

    /// The operator applied to range filters.
    pub fn range_operator(&self) -> RangeOperator {
        self.range_operator
    }

    /// The page size of list requests.
    pub fn limit(&self) -> i32 {
        self.limit
    }

    /// The URI segment naming the resource.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The URI segment naming the API, if any.
    pub fn api_name(&self) -> Option<&str> {
        self.api_name.as_deref()
    }

    /// Descriptors of the key attributes, hash first.
    pub fn key_fields(&self) -> Vec<KeyField> {
        let hash_key = KeyField {
            attribute: self.schema.hash_key.name.clone(),
            key_type: self.schema.hash_key.key_type,
            role: KeyRole::Hash,
            updateable: self.updateable_keys,
            default: self.hash_key_default.clone(),
        };
        let range_key = self.schema.range_key.as_ref().map(|range_key| KeyField {
            attribute: range_key.name.clone(),
            key_type: range_key.key_type,
            role: KeyRole::Range,
            updateable: self.updateable_keys,
            default: self.range_key_default.clone(),
        });
        std::iter::once(hash_key).chain(range_key).collect()
    }
}

impl TryFrom<ResourceConfigBuilder> for ResourceConfig {
    type Error = Error;

    fn try_from(builder: ResourceConfigBuilder) -> Result<Self> {
        builder.build()
    }
}
