//! The store seam a [`Resource`](crate::resource::Resource) talks to.
//!
//! A [`Store`] performs exactly one round trip per call and never retries. Two
//! implementations ship with the crate:
//! - [`dynamodb::DynamoStore`], backed by `aws-sdk-dynamodb`;
//! - [`memory::MemoryStore`], an in-process table for tests and local development.

/// DynamoDB-backed store.
pub mod dynamodb;

/// In-memory store.
pub mod memory;

use crate::{
    common::{
        condition::KeyCondition,
        key::{Key, KeyValue, PrimaryKey},
    },
    error::Result,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::types;
use std::collections;

/// A raw store record.
pub type Record = collections::HashMap<String, types::AttributeValue>;

/// One page of a key condition query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryRequest {
    /// The partition key to query under.
    pub partition_key: Key<KeyValue>,
    /// Optional condition on the sort key.
    pub sort_key_condition: Option<KeyCondition<KeyValue>>,
    /// Whether the read is strongly consistent.
    pub consistent_read: bool,
    /// Ascending (`true`) or descending sort key order.
    pub scan_index_forward: bool,
    /// Maximum number of items in the page.
    pub limit: Option<i32>,
    /// Key of the last item of the previous page.
    pub exclusive_start_key: Option<Record>,
}

/// Result of a [`QueryRequest`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryPage {
    /// Matching records, in sort key order.
    pub items: Vec<Record>,
    /// Start key of the next page, when more items may follow.
    pub last_evaluated_key: Option<Record>,
}

/// Store client used by resources.
#[async_trait]
pub trait Store: Send + Sync {
    /// Point read; `None` when the key is absent.
    async fn get(&self, key: &PrimaryKey, consistent_read: bool) -> Result<Option<Record>>;

    /// Insert a record that must not exist yet.
    ///
    /// Fails with [`Error::AlreadyExists`](crate::error::Error::AlreadyExists) otherwise.
    async fn put_strict(&self, key: &PrimaryKey, record: Record) -> Result<Record>;

    /// Insert or overwrite a record.
    async fn put_upsert(&self, key: &PrimaryKey, record: Record) -> Result<Record>;

    /// Delete a record; deleting an absent key succeeds.
    async fn delete(&self, key: &PrimaryKey) -> Result<()>;

    /// Fetch a single page of records under one partition key.
    async fn query(&self, request: QueryRequest) -> Result<QueryPage>;
}
