use crate::{
    common::{
        condition::Condition,
        key::{Key, KeyValue, Keys, PrimaryKey},
    },
    config::TableSchema,
    error::{Error, Result},
    store,
};

use async_trait::async_trait;
use std::{cmp, collections, sync};
use tokio::sync::RwLock;

type StorageKey = (KeyValue, Option<KeyValue>);

/// In-memory table with DynamoDB key semantics.
///
/// Records are ordered by hash key, then range key. Strict puts conflict on an existing
/// key, queries honor the sort key condition, direction, limit and exclusive start key.
/// Data lives as long as the store (and its clones, which share it).
#[derive(Clone, Debug)]
pub struct MemoryStore {
    schema: TableSchema,
    records: sync::Arc<RwLock<collections::BTreeMap<StorageKey, store::Record>>>,
}

impl MemoryStore {
    /// Create an empty table with the key layout of `schema`.
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            records: sync::Arc::new(RwLock::new(collections::BTreeMap::new())),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn storage_key(key: &PrimaryKey) -> StorageKey {
        let range = key.sort_key.as_ref().map(|sort_key| sort_key.value.clone());
        (key.partition_key.value.clone(), range)
    }

    /// Read the storage key of a raw key record, such as an exclusive start key.
    fn record_key(&self, record: &store::Record) -> Result<StorageKey> {
        let read = |name: &str| -> Result<KeyValue> {
            let value = record
                .get(name)
                .ok_or_else(|| Error::MissingKey(name.to_string()))?;
            KeyValue::try_from(value)
        };
        let hash = read(&self.schema.hash_key.name)?;
        let range = self
            .schema
            .range_key
            .as_ref()
            .map(|range_key| read(&range_key.name))
            .transpose()?;
        Ok((hash, range))
    }

    /// Render a storage key back into a key record.
    fn key_record(&self, (hash, range): &StorageKey) -> Result<store::Record> {
        let key = Keys {
            partition_key: Key {
                name: self.schema.hash_key.name.clone(),
                value: hash.clone(),
            },
            sort_key: self
                .schema
                .range_key
                .as_ref()
                .zip(range.as_ref())
                .map(|(range_key, value)| Key {
                    name: range_key.name.clone(),
                    value: value.clone(),
                }),
        };
        Ok(key.try_into()?)
    }
}

/// Whether a stored range key satisfies a sort key condition.
fn satisfies(condition: &Condition<KeyValue>, value: &KeyValue) -> bool {
    let comparable = |operand: &KeyValue| operand.key_type() == value.key_type();
    match condition {
        Condition::BeginsWith(KeyValue::String(prefix)) => {
            matches!(value, KeyValue::String(value) if value.starts_with(prefix.as_str()))
        }
        Condition::BeginsWith(KeyValue::Number(_)) => false,
        Condition::Between(low, high) => {
            comparable(low) && comparable(high) && low <= value && value <= high
        }
        Condition::Equals(operand) => value == operand,
        Condition::GreaterThan(operand) => comparable(operand) && value > operand,
        Condition::GreaterThanOrEqual(operand) => comparable(operand) && value >= operand,
        Condition::LessThan(operand) => comparable(operand) && value < operand,
        Condition::LessThanOrEqual(operand) => comparable(operand) && value <= operand,
        Condition::NotNull => true,
        Condition::Null => false,
    }
}

#[async_trait]
impl store::Store for MemoryStore {
    async fn get(&self, key: &PrimaryKey, _consistent_read: bool) -> Result<Option<store::Record>> {
        let records = self.records.read().await;
        Ok(records.get(&Self::storage_key(key)).cloned())
    }

    async fn put_strict(&self, key: &PrimaryKey, record: store::Record) -> Result<store::Record> {
        let mut records = self.records.write().await;
        let storage_key = Self::storage_key(key);
        if records.contains_key(&storage_key) {
            return Err(Error::AlreadyExists(key.to_string()));
        }
        records.insert(storage_key, record.clone());
        Ok(record)
    }

    async fn put_upsert(&self, key: &PrimaryKey, record: store::Record) -> Result<store::Record> {
        let mut records = self.records.write().await;
        records.insert(Self::storage_key(key), record.clone());
        Ok(record)
    }

    async fn delete(&self, key: &PrimaryKey) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(&Self::storage_key(key));
        Ok(())
    }

    async fn query(&self, request: store::QueryRequest) -> Result<store::QueryPage> {
        let start = request
            .exclusive_start_key
            .as_ref()
            .map(|record| self.record_key(record))
            .transpose()?;
        let hash = request.partition_key.value;
        let records = self.records.read().await;
        let mut matching: Vec<(&StorageKey, &store::Record)> = records
            .iter()
            .filter(|((record_hash, _), _)| *record_hash == hash)
            .filter(|((_, range), _)| match (&request.sort_key_condition, range) {
                (None, _) => true,
                (Some(condition), Some(range)) => satisfies(&condition.condition, range),
                (Some(_), None) => false,
            })
            .collect();
        if !request.scan_index_forward {
            matching.reverse();
        }
        if let Some(start) = &start {
            let after = if request.scan_index_forward {
                cmp::Ordering::Greater
            } else {
                cmp::Ordering::Less
            };
            matching.retain(|(key, _)| (*key).cmp(start) == after);
        }
        let limit = request
            .limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(usize::MAX);
        let last_evaluated_key = match matching.get(limit.saturating_sub(1)) {
            Some((key, _)) if matching.len() > limit => Some(self.key_record(key)?),
            _ => None,
        };
        let items = matching
            .into_iter()
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect();
        let page = store::QueryPage {
            items,
            last_evaluated_key,
        };
        Ok(page)
    }
}
