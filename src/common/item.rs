use crate::{config::TableSchema, error::Result};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, to_item};
use std::collections;

/// A store record plus its key attributes, as handed to and from the caller.
///
/// Attributes keep their insertion order. A `null` value means the attribute is absent:
/// it is never sent to the store on write.
///
/// ```rust
/// use dynamodb_resource::common::item::Item;
/// use serde_json::json;
///
/// let mut item = Item::default();
/// item.insert("id", json!(42));
/// item.insert("note", json!(null));
/// assert_eq!(item.get("id"), Some(&json!(42)));
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Item(IndexMap<String, serde_json::Value>);

impl Item {
    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// Set an attribute value, returning the previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Iterate over attributes in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// Number of attributes, including `null` ones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the item has no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wrap a store record, placing the key attributes first and the rest by name.
    pub fn from_record(
        record: collections::HashMap<String, types::AttributeValue>,
        schema: &TableSchema,
    ) -> Result<Self> {
        let mut attributes: IndexMap<String, serde_json::Value> = from_item(record)?;
        attributes.sort_by(|left, _, right, _| {
            let rank = |name: &str| schema.key_names().position(|key| key == name);
            match (rank(left.as_str()), rank(right.as_str())) {
                (Some(left_rank), Some(right_rank)) => left_rank.cmp(&right_rank),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => left.cmp(right),
            }
        });
        Ok(Self(attributes))
    }

    /// Convert to a store record, dropping `null` attributes.
    pub fn into_record(self) -> Result<collections::HashMap<String, types::AttributeValue>> {
        let attributes: IndexMap<_, _> = self
            .0
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();
        Ok(to_item(attributes)?)
    }
}

impl From<IndexMap<String, serde_json::Value>> for Item {
    fn from(attributes: IndexMap<String, serde_json::Value>) -> Self {
        Self(attributes)
    }
}

impl FromIterator<(String, serde_json::Value)> for Item {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Item {
    type Item = (String, serde_json::Value);
    type IntoIter = indexmap::map::IntoIter<String, serde_json::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
