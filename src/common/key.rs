use crate::{
    common::item::Item,
    config::TableSchema,
    error::{Error, Result},
};

use aws_sdk_dynamodb::types;
use serde::{Deserialize, Serialize};
use serde_dynamo::to_attribute_value;
use std::{collections, fmt};

/// Declared type of a key attribute.
///
/// Numeric keys use integer semantics only, since range queries compare them as integers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum KeyType {
    /// `N` - a signed integer.
    #[serde(rename = "N", alias = "number")]
    Number,
    /// `S` - a string.
    #[serde(rename = "S", alias = "string")]
    String,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
        }
    }
}

impl KeyType {
    /// Coerce a raw wire string to this type.
    ///
    /// ```rust
    /// use dynamodb_resource::common::key::{KeyType, KeyValue};
    ///
    /// assert_eq!(KeyType::Number.coerce("-42").unwrap(), KeyValue::Number(-42));
    /// assert_eq!(KeyType::String.coerce("42").unwrap(), KeyValue::String("42".to_string()));
    /// assert!(KeyType::Number.coerce("abc").is_err());
    /// ```
    pub fn coerce(self, raw: &str) -> Result<KeyValue> {
        match self {
            Self::Number => raw
                .parse()
                .map(KeyValue::Number)
                .map_err(|_| Error::InvalidKeyType {
                    value: raw.to_string(),
                    key_type: self,
                }),
            Self::String => Ok(KeyValue::String(raw.to_string())),
        }
    }

    /// Coerce a JSON payload value to this type; `null` stays absent.
    pub fn coerce_json(self, value: &serde_json::Value) -> Result<Option<KeyValue>> {
        let invalid = || Error::InvalidKeyType {
            value: value.to_string(),
            key_type: self,
        };
        match (self, value) {
            (_, serde_json::Value::Null) => Ok(None),
            (_, serde_json::Value::String(raw)) => self.coerce(raw).map(Some),
            (Self::Number, serde_json::Value::Number(number)) => {
                number.as_i64().map(KeyValue::Number).map(Some).ok_or_else(invalid)
            }
            (Self::String, serde_json::Value::Number(number)) => {
                Ok(Some(KeyValue::String(number.to_string())))
            }
            _ => Err(invalid()),
        }
    }
}

/// A coerced key value.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    /// A numeric key value.
    Number(i64),
    /// A string key value.
    String(String),
}

impl KeyValue {
    /// The type this value was coerced to.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Number(_) => KeyType::Number,
            Self::String(_) => KeyType::String,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::String(string) => f.write_str(string),
        }
    }
}

impl From<KeyValue> for serde_json::Value {
    fn from(value: KeyValue) -> Self {
        match value {
            KeyValue::Number(number) => Self::Number(number.into()),
            KeyValue::String(string) => Self::String(string),
        }
    }
}

impl TryFrom<&types::AttributeValue> for KeyValue {
    type Error = Error;

    fn try_from(value: &types::AttributeValue) -> Result<Self> {
        match value {
            types::AttributeValue::N(number) => KeyType::Number.coerce(number),
            types::AttributeValue::S(string) => Ok(Self::String(string.clone())),
            other => Err(Error::InvalidKeyType {
                value: format!("{other:?}"),
                key_type: KeyType::String,
            }),
        }
    }
}

/// Key component.
///
/// ```rust
/// use dynamodb_resource::common::key;
///
/// let key = key::Key {
///     name: "id".to_string(),
///     value: key::KeyValue::Number(1),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

/// Primary key (partition key and optional sort key).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key (required).
    pub partition_key: Key<T>,
    /// The sort key (optional, only for tables with composite primary keys).
    pub sort_key: Option<Key<T>>,
}

/// A primary key whose components are coerced to the table's declared key types.
pub type PrimaryKey = Keys<KeyValue>;

impl PrimaryKey {
    /// Read and coerce the key attributes of `item`.
    pub fn from_item(item: &Item, schema: &TableSchema) -> Result<Self> {
        let read = |name: &str, key_type: KeyType| -> Result<Key<KeyValue>> {
            item.get(name)
                .map(|value| key_type.coerce_json(value))
                .transpose()?
                .flatten()
                .map(|value| Key {
                    name: name.to_string(),
                    value,
                })
                .ok_or_else(|| Error::MissingKey(name.to_string()))
        };
        let partition_key = read(&schema.hash_key.name, schema.hash_key.key_type)?;
        let sort_key = schema
            .range_key
            .as_ref()
            .map(|range_key| read(&range_key.name, range_key.key_type))
            .transpose()?;
        Ok(Self {
            partition_key,
            sort_key,
        })
    }

    /// The key components in hash, range order.
    pub fn iter(&self) -> impl Iterator<Item = &Key<KeyValue>> {
        std::iter::once(&self.partition_key).chain(self.sort_key.as_ref())
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, key) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key.name, key.value)?;
        }
        Ok(())
    }
}

impl<T: Serialize> TryFrom<Keys<T>> for collections::HashMap<String, types::AttributeValue> {
    type Error = serde_dynamo::Error;

    fn try_from(key: Keys<T>) -> serde_dynamo::Result<Self> {
        let partition_key_value = to_attribute_value(key.partition_key.value)?;
        let mut keys = Self::from([(key.partition_key.name, partition_key_value)]);
        if let Some(sort_key) = key.sort_key {
            let sort_key_value = to_attribute_value(sort_key.value)?;
            keys.insert(sort_key.name, sort_key_value);
        }
        Ok(keys)
    }
}
