use crate::{
    common::key::{KeyValue, PrimaryKey},
    write,
};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde_dynamo::{Error, Result};
use std::collections;

/// Key map plus rendered write arguments, ready for the DeleteItem builder.
#[derive(Debug, PartialEq)]
struct DeleteItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

/// Removal of one item by its primary key. Deleting an absent item succeeds unless a
/// condition is set.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_resource::{common, write};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let delete_item = write::delete_item::DeleteItem {
///     keys: common::key::Keys {
///         partition_key: common::key::Key {
///             name: "id".to_string(),
///             value: common::key::KeyValue::Number(1),
///         },
///         sort_key: None,
///     },
///     write_args: write::common::WriteArgs {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// delete_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct DeleteItem {
    /// The primary key of the item to delete.
    pub keys: PrimaryKey,
    /// Additional write operation arguments (table name, condition).
    pub write_args: write::common::WriteArgs<KeyValue>,
}

impl TryFrom<DeleteItem> for DeleteItemInput {
    type Error = Error;

    fn try_from(delete_item: DeleteItem) -> Result<Self> {
        Ok(Self {
            keys: delete_item.keys.try_into()?,
            write_operation: delete_item.write_args.try_into()?,
        })
    }
}

impl DeleteItem {
    /// Send the DeleteItem request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_resource.delete_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::delete_item::DeleteItemOutput,
        error::SdkError<operation::delete_item::DeleteItemError>,
    > {
        let delete_item: DeleteItemInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client.delete_item().set_key(Some(delete_item.keys));
        crate::apply_write_operation!(builder, delete_item.write_operation)
            .send()
            .await
    }
}
