//! The resource adapter: create, read, update, delete and list over one table.
//!
//! Every operation is one store round trip. Key decoding and range filter parsing happen
//! before the store is called, so client input errors never reach it.

use crate::{
    common::{
        condition::KeyCondition,
        item::Item,
        key::{Key, PrimaryKey},
        range, slug,
    },
    config::ResourceConfig,
    error::{Error, Result},
    hydrate::{FieldHydrator, Hydrate, Intent},
    store::{QueryRequest, Record, Store},
};

use std::collections;

/// One page of list results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// The items of the page.
    pub items: Vec<Item>,
    /// Pass back as `exclusive_start_key` to fetch the next page.
    pub last_evaluated_key: Option<Record>,
}

/// A DynamoDB table exposed as a resource.
///
/// ```rust
/// use dynamodb_resource::{
///     common::{key::KeyType, range::RangeOperator},
///     config::{KeyAttribute, ResourceConfig, TableSchema},
///     resource::Resource,
///     store::memory::MemoryStore,
/// };
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> dynamodb_resource::error::Result<()> {
/// let schema = TableSchema::new("events", KeyAttribute::new("id", KeyType::Number))
///     .with_range_key(KeyAttribute::new("ts", KeyType::Number));
/// let config = ResourceConfig::builder(schema.clone())
///     .range_operator(RangeOperator::Between)
///     .build()?;
/// let resource = Resource::new(config, MemoryStore::new(schema));
///
/// resource.create(&json!({"id": 42, "ts": 1001, "title": "launch"})).await?;
/// let item = resource.get("42:1001").await?;
/// assert_eq!(item.get("title"), Some(&json!("launch")));
///
/// let items = resource.list(Some("42"), Some("1000:2000")).await?;
/// assert_eq!(items.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Resource<S, H = FieldHydrator> {
    config: ResourceConfig,
    store: S,
    hydrator: H,
}

impl<S: Store> Resource<S> {
    /// Create a resource hydrating payloads with the config's key fields.
    pub fn new(config: ResourceConfig, store: S) -> Self {
        let hydrator = FieldHydrator::new(config.key_fields());
        Self {
            config,
            store,
            hydrator,
        }
    }
}

impl<S: Store, H: Hydrate> Resource<S, H> {
    /// Create a resource with a custom hydrator.
    pub fn with_hydrator(config: ResourceConfig, store: S, hydrator: H) -> Self {
        Self {
            config,
            store,
            hydrator,
        }
    }

    /// The resource settings.
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert a new item; fails with [`Error::AlreadyExists`] when its key is taken.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_resource.create", skip_all, err)
    )]
    pub async fn create(&self, payload: &serde_json::Value) -> Result<Item> {
        let hydrated = self.hydrator.hydrate(payload, Intent::Create)?;
        let key = PrimaryKey::from_item(&hydrated.item, self.config.schema())?;
        self.write(key, hydrated.item, Intent::Create).await
    }

    /// Replace the item addressed by `slug`, creating it when absent.
    ///
    /// The slug's key values win over key attributes in the payload, unless the config
    /// makes keys updateable: then a payload key moves the write to that key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_resource.update", skip(self, payload), err)
    )]
    pub async fn update(&self, slug: &str, payload: &serde_json::Value) -> Result<Item> {
        let key = self.decode(slug)?;
        let hydrated = self.hydrator.hydrate(payload, Intent::Update)?;
        self.write(key, hydrated.item, Intent::Update).await
    }

    /// Read the item addressed by `slug`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_resource.get", skip(self), err)
    )]
    pub async fn get(&self, slug: &str) -> Result<Item> {
        let key = self.decode(slug)?;
        let record = self
            .store
            .get(&key, self.config.consistent_read())
            .await?
            .ok_or_else(|| Error::NotFound(slug.to_string()))?;
        Item::from_record(record, self.config.schema())
    }

    /// Delete the item addressed by `slug`; deleting an absent item succeeds.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_resource.delete", skip(self), err)
    )]
    pub async fn delete(&self, slug: &str) -> Result<()> {
        let key = self.decode(slug)?;
        self.store.delete(&key).await
    }

    /// List the first page of items under a hash key.
    ///
    /// A missing or empty hash key is [`Error::NotFound`]. The range filter is parsed with
    /// the configured operator.
    pub async fn list(
        &self,
        hash_key: Option<&str>,
        range_filter: Option<&str>,
    ) -> Result<Vec<Item>> {
        let page = self.list_page(hash_key, range_filter, None).await?;
        Ok(page.items)
    }

    /// List items with the hash key and range filter read from query parameters.
    ///
    /// Parameters are named after the key attributes.
    pub async fn list_params(
        &self,
        params: &collections::HashMap<String, String>,
    ) -> Result<Vec<Item>> {
        let schema = self.config.schema();
        let hash_key = params.get(&schema.hash_key.name).map(String::as_str);
        let range_filter = schema
            .range_key
            .as_ref()
            .and_then(|range_key| params.get(&range_key.name))
            .map(String::as_str);
        self.list(hash_key, range_filter).await
    }

    /// List one page of items, continuing after `exclusive_start_key` when given.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_resource.list",
            skip(self, exclusive_start_key),
            err
        )
    )]
    pub async fn list_page(
        &self,
        hash_key: Option<&str>,
        range_filter: Option<&str>,
        exclusive_start_key: Option<Record>,
    ) -> Result<Page> {
        let schema = self.config.schema();
        let hash_key = hash_key
            .filter(|hash_key| !hash_key.is_empty())
            .ok_or_else(|| {
                Error::NotFound(format!("missing hash key `{}`", schema.hash_key.name))
            })?;
        let partition_key = Key {
            name: schema.hash_key.name.clone(),
            value: schema.hash_key.coerce(hash_key)?,
        };
        let range_filter = range_filter.filter(|range_filter| !range_filter.is_empty());
        let sort_key_condition = match (&schema.range_key, range_filter) {
            (Some(range_key), range_filter) => range::build(
                range_filter,
                self.config.range_operator(),
                self.config.primary_key_delimiter(),
                range_key.key_type,
            )?
            .map(|condition| KeyCondition {
                condition,
                name: range_key.name.clone(),
            }),
            (None, Some(range_filter)) => {
                return Err(Error::InvalidFilter {
                    filter: range_filter.to_string(),
                    reason: format!("table `{}` has no range key", schema.table_name),
                });
            }
            (None, None) => None,
        };
        let request = QueryRequest {
            partition_key,
            sort_key_condition,
            consistent_read: self.config.consistent_read(),
            scan_index_forward: self.config.scan_index_forward(),
            limit: Some(self.config.limit()),
            exclusive_start_key,
        };
        let page = self.store.query(request).await?;
        let items = page
            .items
            .into_iter()
            .map(|record| Item::from_record(record, schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            last_evaluated_key: page.last_evaluated_key,
        })
    }

    /// Bulk delete; unsupported on DynamoDB tables, so nothing is deleted.
    pub async fn delete_all(&self) -> Result<()> {
        Ok(())
    }

    /// Unfiltered listing; unsupported on DynamoDB tables, so always empty.
    pub fn get_object_list(&self) -> Vec<Item> {
        Vec::new()
    }

    /// Every write is a single store call, so there is nothing to roll back.
    pub fn rollback(&self) {}

    /// The slug of `item`.
    pub fn slug(&self, item: &Item) -> Result<String> {
        slug::encode(
            item,
            self.config.schema(),
            self.config.primary_key_delimiter(),
        )
    }

    /// The URI of `item`: `/<api>/<resource>/<slug>/`, without the api segment when unset.
    pub fn resource_uri(&self, item: &Item) -> Result<String> {
        let slug = self.slug(item)?;
        let resource_name = self.config.resource_name();
        let uri = match self.config.api_name() {
            Some(api_name) => format!("/{api_name}/{resource_name}/{slug}/"),
            None => format!("/{resource_name}/{slug}/"),
        };
        Ok(uri)
    }

    fn decode(&self, slug: &str) -> Result<PrimaryKey> {
        slug::decode(
            slug,
            self.config.schema(),
            self.config.primary_key_delimiter(),
        )
    }

    /// Write `item`, filling key attributes it lacks from `key`.
    ///
    /// Key attributes already in the item (updateable keys on update) decide where it is stored.
    async fn write(&self, key: PrimaryKey, mut item: Item, intent: Intent) -> Result<Item> {
        for component in key.iter() {
            if item.get(&component.name).is_none() {
                item.insert(component.name.clone(), component.value.clone());
            }
        }
        let key = PrimaryKey::from_item(&item, self.config.schema())?;
        let record = item.into_record()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(key = %key, attributes = record.len(), ?intent, "writing item");
        let stored = match intent {
            Intent::Create => self.store.put_strict(&key, record).await?,
            Intent::Update => self.store.put_upsert(&key, record).await?,
        };
        let mut item = Item::from_record(stored, self.config.schema())?;
        for component in key.iter() {
            if item.get(&component.name).is_none() {
                item.insert(component.name.clone(), component.value.clone());
            }
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{
            condition::Condition,
            key::{KeyType, KeyValue},
            range::RangeOperator,
        },
        config::{KeyAttribute, TableSchema},
        error::ErrorKind,
        hydrate::FieldDefault,
        store::{QueryPage, memory::MemoryStore},
    };

    use async_trait::async_trait;
    use aws_sdk_dynamodb::types;
    use rstest::rstest;
    use serde_json::json;
    use std::sync;

    fn schema() -> TableSchema {
        TableSchema::new("events", KeyAttribute::new("id", KeyType::Number))
            .with_range_key(KeyAttribute::new("ts", KeyType::Number))
    }

    fn resource() -> Resource<MemoryStore> {
        let config = ResourceConfig::builder(schema())
            .range_operator(RangeOperator::Between)
            .build()
            .unwrap();
        Resource::new(config, MemoryStore::new(schema()))
    }

    /// Store that records the calls it receives and answers from a memory store.
    #[derive(Debug)]
    struct RecordingStore {
        inner: MemoryStore,
        queries: sync::Mutex<Vec<QueryRequest>>,
        writes: sync::Mutex<Vec<Record>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(schema()),
                queries: sync::Mutex::default(),
                writes: sync::Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl Store for RecordingStore {
        async fn get(&self, key: &PrimaryKey, consistent_read: bool) -> Result<Option<Record>> {
            self.inner.get(key, consistent_read).await
        }

        async fn put_strict(&self, key: &PrimaryKey, record: Record) -> Result<Record> {
            self.writes.lock().unwrap().push(record.clone());
            self.inner.put_strict(key, record).await
        }

        async fn put_upsert(&self, key: &PrimaryKey, record: Record) -> Result<Record> {
            self.writes.lock().unwrap().push(record.clone());
            self.inner.put_upsert(key, record).await
        }

        async fn delete(&self, key: &PrimaryKey) -> Result<()> {
            self.inner.delete(key).await
        }

        async fn query(&self, request: QueryRequest) -> Result<QueryPage> {
            self.queries.lock().unwrap().push(request.clone());
            self.inner.query(request).await
        }
    }

    /// Store whose every call fails.
    #[derive(Debug)]
    struct FailingStore;

    fn unavailable() -> Error {
        Error::store(std::io::Error::other("table unavailable"))
    }

    #[async_trait]
    impl Store for FailingStore {
        async fn get(&self, _key: &PrimaryKey, _consistent_read: bool) -> Result<Option<Record>> {
            Err(unavailable())
        }

        async fn put_strict(&self, _key: &PrimaryKey, _record: Record) -> Result<Record> {
            Err(unavailable())
        }

        async fn put_upsert(&self, _key: &PrimaryKey, _record: Record) -> Result<Record> {
            Err(unavailable())
        }

        async fn delete(&self, _key: &PrimaryKey) -> Result<()> {
            Err(unavailable())
        }

        async fn query(&self, _request: QueryRequest) -> Result<QueryPage> {
            Err(unavailable())
        }
    }

    #[tokio::test]
    async fn test_list_merges_hash_key_and_between_condition() {
        let config = ResourceConfig::builder(schema())
            .range_operator(RangeOperator::Between)
            .consistent_read(true)
            .build()
            .unwrap();
        let resource = Resource::new(config, RecordingStore::new());
        resource.list(Some("42"), Some("1000:2000")).await.unwrap();
        let queries = resource.store().queries.lock().unwrap().clone();
        let expected = QueryRequest {
            partition_key: Key {
                name: "id".to_string(),
                value: KeyValue::Number(42),
            },
            sort_key_condition: Some(KeyCondition {
                condition: Condition::Between(KeyValue::Number(1000), KeyValue::Number(2000)),
                name: "ts".to_string(),
            }),
            consistent_read: true,
            scan_index_forward: true,
            limit: Some(20),
            exclusive_start_key: None,
        };
        assert_eq!(queries, vec![expected]);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_slug() {
        let resource = resource();
        let created = resource
            .create(&json!({"id": "42", "ts": 1001, "title": "launch"}))
            .await
            .unwrap();
        assert_eq!(resource.slug(&created).unwrap(), "42:1001");
        let fetched = resource.get("42:1001").await.unwrap();
        assert_eq!(fetched, created);
        let names: Vec<_> = fetched.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["id", "ts", "title"]);
    }

    #[tokio::test]
    async fn test_create_never_sends_null_attributes() {
        let config = ResourceConfig::builder(schema()).build().unwrap();
        let resource = Resource::new(config, RecordingStore::new());
        let created = resource
            .create(&json!({"id": 1, "ts": 2, "note": null, "title": "a"}))
            .await
            .unwrap();
        let writes = resource.store().writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 1);
        assert!(!writes[0].contains_key("note"));
        assert_eq!(
            writes[0].get("title"),
            Some(&types::AttributeValue::S("a".to_string()))
        );
        assert_eq!(created.get("note"), None);
        assert_eq!(created.len(), 3);
    }

    #[tokio::test]
    async fn test_create_conflicts_on_existing_key() {
        let resource = resource();
        resource.create(&json!({"id": 1, "ts": 2})).await.unwrap();
        let error = resource.create(&json!({"id": 1, "ts": 2})).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_create_requires_key_attributes() {
        let error = resource().create(&json!({"id": 1})).await.unwrap_err();
        assert!(matches!(error, Error::MissingKey(ref name) if name == "ts"));
    }

    #[tokio::test]
    async fn test_create_applies_key_default() {
        let config = ResourceConfig::builder(schema())
            .range_key_default(FieldDefault::Value(KeyValue::Number(7)))
            .build()
            .unwrap();
        let resource = Resource::new(config, MemoryStore::new(schema()));
        let created = resource.create(&json!({"id": 1})).await.unwrap();
        assert_eq!(created.get("ts"), Some(&json!(7)));
        resource.get("1:7").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_upserts_with_slug_keys() {
        let resource = resource();
        let updated = resource
            .update("42:1001", &json!({"id": 9, "title": "b"}))
            .await
            .unwrap();
        assert_eq!(updated.get("id"), Some(&json!(42)));
        assert_eq!(updated.get("ts"), Some(&json!(1001)));
        assert_eq!(updated.get("title"), Some(&json!("b")));
        let replaced = resource
            .update("42:1001", &json!({"body": "c"}))
            .await
            .unwrap();
        assert_eq!(replaced.get("title"), None);
        assert_eq!(resource.get("42:1001").await.unwrap(), replaced);
    }

    #[tokio::test]
    async fn test_update_with_updateable_keys_takes_payload_keys() {
        let config = ResourceConfig::builder(schema())
            .updateable_keys(true)
            .build()
            .unwrap();
        let resource = Resource::new(config, RecordingStore::new());
        let updated = resource
            .update("42:1001", &json!({"id": 9, "title": "b"}))
            .await
            .unwrap();
        assert_eq!(updated.get("id"), Some(&json!(9)));
        assert_eq!(updated.get("ts"), Some(&json!(1001)));
        let writes = resource.store().writes.lock().unwrap().clone();
        assert_eq!(
            writes[0].get("id"),
            Some(&types::AttributeValue::N("9".to_string()))
        );
        assert_eq!(resource.get("9:1001").await.unwrap(), updated);
        assert_eq!(resource.get("42:1001").await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_missing_item_is_not_found() {
        let error = resource().get("42:1001").await.unwrap_err();
        assert!(matches!(error, Error::NotFound(ref slug) if slug == "42:1001"));
    }

    #[tokio::test]
    async fn test_delete_missing_item_succeeds() {
        let resource = resource();
        resource.delete("42:1001").await.unwrap();
        resource.create(&json!({"id": 42, "ts": 1001})).await.unwrap();
        resource.delete("42:1001").await.unwrap();
        assert_eq!(resource.get("42:1001").await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[rstest]
    #[case::missing_hash_key(None, None, ErrorKind::NotFound)]
    #[case::empty_hash_key(Some(""), None, ErrorKind::NotFound)]
    #[case::non_numeric_hash_key(Some("abc"), None, ErrorKind::BadRequest)]
    #[case::single_operand(Some("42"), Some("1000"), ErrorKind::BadRequest)]
    #[case::three_operands(Some("42"), Some("1:2:3"), ErrorKind::BadRequest)]
    #[case::non_numeric_operand(Some("42"), Some("a:b"), ErrorKind::BadRequest)]
    #[tokio::test]
    async fn test_list_rejects(
        #[case] hash_key: Option<&str>,
        #[case] range_filter: Option<&str>,
        #[case] expected: ErrorKind,
    ) {
        let error = resource().list(hash_key, range_filter).await.unwrap_err();
        assert_eq!(error.kind(), expected);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let config = ResourceConfig::builder(schema())
            .range_operator(RangeOperator::Between)
            .limit(2)
            .build()
            .unwrap();
        let resource = Resource::new(config, MemoryStore::new(schema()));
        for ts in [900, 1000, 1500, 2000, 2100] {
            resource.create(&json!({"id": 42, "ts": ts})).await.unwrap();
        }
        resource.create(&json!({"id": 7, "ts": 1500})).await.unwrap();

        let page = resource
            .list_page(Some("42"), Some("1000:2000"), None)
            .await
            .unwrap();
        let range_keys: Vec<_> = page.items.iter().map(|item| item.get("ts").cloned()).collect();
        assert_eq!(range_keys, vec![Some(json!(1000)), Some(json!(1500))]);
        assert!(page.last_evaluated_key.is_some());

        let page = resource
            .list_page(Some("42"), Some("1000:2000"), page.last_evaluated_key)
            .await
            .unwrap();
        let range_keys: Vec<_> = page.items.iter().map(|item| item.get("ts").cloned()).collect();
        assert_eq!(range_keys, vec![Some(json!(2000))]);
        assert_eq!(page.last_evaluated_key, None);
    }

    #[tokio::test]
    async fn test_list_params_reads_key_attribute_names() {
        let resource = resource();
        resource.create(&json!({"id": 42, "ts": 1001})).await.unwrap();
        let params = collections::HashMap::from([
            ("id".to_string(), "42".to_string()),
            ("ts".to_string(), "1000:2000".to_string()),
        ]);
        assert_eq!(resource.list_params(&params).await.unwrap().len(), 1);
        let error = resource
            .list_params(&collections::HashMap::new())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_hash_only_table_rejects_range_filter() {
        let schema = TableSchema::new("users", KeyAttribute::new("name", KeyType::String));
        let config = ResourceConfig::builder(schema.clone()).build().unwrap();
        let resource = Resource::new(config, MemoryStore::new(schema));
        resource.create(&json!({"name": "a"})).await.unwrap();
        assert_eq!(resource.list(Some("a"), None).await.unwrap().len(), 1);
        let error = resource.list(Some("a"), Some("b")).await.unwrap_err();
        assert!(matches!(error, Error::InvalidFilter { .. }));
    }

    #[rstest]
    #[case::without_api(None, "/events/42:1001/")]
    #[case::with_api(Some("v1"), "/v1/events/42:1001/")]
    fn test_resource_uri(#[case] api_name: Option<&str>, #[case] expected: &str) {
        let mut builder = ResourceConfig::builder(schema());
        if let Some(api_name) = api_name {
            builder = builder.api_name(api_name);
        }
        let resource = Resource::new(builder.build().unwrap(), MemoryStore::new(schema()));
        let item: Item = [
            ("id".to_string(), json!(42)),
            ("ts".to_string(), json!(1001)),
        ]
        .into_iter()
        .collect();
        assert_eq!(resource.resource_uri(&item).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let config = ResourceConfig::builder(schema()).build().unwrap();
        let resource = Resource::new(config, FailingStore);
        let errors = [
            resource.create(&json!({"id": 1, "ts": 2})).await.unwrap_err(),
            resource.update("1:2", &json!({"title": "a"})).await.unwrap_err(),
            resource.get("1:2").await.unwrap_err(),
            resource.delete("1:2").await.unwrap_err(),
            resource.list(Some("1"), None).await.unwrap_err(),
        ];
        for error in errors {
            assert_eq!(error.kind(), ErrorKind::Store);
            let source = std::error::Error::source(&error).unwrap();
            assert_eq!(source.to_string(), "table unavailable");
        }
    }

    #[tokio::test]
    async fn test_unsupported_bulk_operations_are_no_ops() {
        let resource = resource();
        resource.create(&json!({"id": 1, "ts": 1})).await.unwrap();
        resource.delete_all().await.unwrap();
        resource.rollback();
        assert!(resource.get_object_list().is_empty());
        assert_eq!(resource.store().len().await, 1);
    }
}
