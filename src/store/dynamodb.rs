use crate::{
    common::{
        condition::{Condition, KeyCondition},
        key::{KeyValue, PrimaryKey},
    },
    config::TableSchema,
    error::{Error, Result},
    read, store, write,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, error::SdkError, operation::put_item::PutItemError};
use std::fmt;

/// Store backed by a DynamoDB table.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_resource::{config, store::dynamodb::DynamoStore};
///
/// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
/// let schema = DynamoStore::describe(&client, "events").await?;
/// let store = DynamoStore::new(client, &schema);
/// let resource_config = config::ResourceConfig::builder(schema).build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    /// Create a store for the table of `schema`.
    pub fn new(client: Client, schema: &TableSchema) -> Self {
        Self {
            client,
            table_name: schema.table_name.clone(),
        }
    }

    /// Read a table's key schema with `DescribeTable`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_resource.describe", skip(client), err)
    )]
    pub async fn describe(client: &Client, table_name: &str) -> Result<TableSchema> {
        let output = client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(Error::store)?;
        let table = output.table.ok_or_else(|| {
            Error::Configuration(format!("table `{table_name}` has no description"))
        })?;
        TableSchema::try_from(&table)
    }

    /// The table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn put(
        &self,
        key: &PrimaryKey,
        record: store::Record,
        condition: Option<KeyCondition<KeyValue>>,
    ) -> Result<store::Record> {
        let put_item = write::put_item::PutItem {
            item: record.clone(),
            write_args: write::common::WriteArgs {
                condition,
                table_name: self.table_name.clone(),
            },
        };
        match put_item.send(&self.client).await {
            Ok(_) => Ok(record),
            Err(error) => Err(put_error(key, error)),
        }
    }
}

/// A failed `attribute_not_exists` guard means the key is taken; anything else is a store error.
fn put_error<R>(key: &PrimaryKey, error: SdkError<PutItemError, R>) -> Error
where
    R: fmt::Debug + Send + Sync + 'static,
{
    match error.as_service_error() {
        Some(PutItemError::ConditionalCheckFailedException(_)) => {
            Error::AlreadyExists(key.to_string())
        }
        _ => Error::store(error),
    }
}

#[async_trait]
impl store::Store for DynamoStore {
    async fn get(&self, key: &PrimaryKey, consistent_read: bool) -> Result<Option<store::Record>> {
        let get_item = read::get_item::GetItem {
            keys: key.clone(),
            single_read_args: read::common::SingleReadArgs {
                consistent_read: Some(consistent_read),
                table_name: self.table_name.clone(),
            },
        };
        let output = get_item.send(&self.client).await.map_err(Error::store)?;
        Ok(output.item)
    }

    async fn put_strict(&self, key: &PrimaryKey, record: store::Record) -> Result<store::Record> {
        let condition = KeyCondition {
            condition: Condition::Null,
            name: key.partition_key.name.clone(),
        };
        self.put(key, record, Some(condition)).await
    }

    async fn put_upsert(&self, key: &PrimaryKey, record: store::Record) -> Result<store::Record> {
        self.put(key, record, None).await
    }

    async fn delete(&self, key: &PrimaryKey) -> Result<()> {
        let delete_item = write::delete_item::DeleteItem {
            keys: key.clone(),
            write_args: write::common::WriteArgs {
                condition: None,
                table_name: self.table_name.clone(),
            },
        };
        delete_item.send(&self.client).await.map_err(Error::store)?;
        Ok(())
    }

    async fn query(&self, request: store::QueryRequest) -> Result<store::QueryPage> {
        let query = read::query::Query {
            multiple_read_args: read::common::MultipleReadArgs {
                consistent_read: Some(request.consistent_read),
                exclusive_start_key: request.exclusive_start_key,
                limit: request.limit,
                table_name: self.table_name.clone(),
            },
            partition_key: request.partition_key,
            scan_index_forward: Some(request.scan_index_forward),
            sort_key_condition: request.sort_key_condition,
        };
        let output = query.send(&self.client).await.map_err(Error::store)?;
        let page = store::QueryPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        };
        Ok(page)
    }
}
