use crate::write;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::{Error, Result};
use std::collections;

/// put item operation
#[derive(Debug, PartialEq)]
struct PutItemInput {
    item: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

/// Put item operation.
///
/// A strict insert guards on the hash key being absent:
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::{Client, types};
/// use dynamodb_resource::{common, write};
/// use std::collections::HashMap;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let put_item = write::put_item::PutItem {
///     item: HashMap::from([
///         ("id".to_string(), types::AttributeValue::N("1".to_string())),
///         ("name".to_string(), types::AttributeValue::S("John".to_string())),
///     ]),
///     write_args: write::common::WriteArgs::<common::key::KeyValue> {
///         condition: Some(common::condition::KeyCondition {
///             name: "id".to_string(),
///             condition: common::condition::Condition::Null,
///         }),
///         table_name: "users".to_string(),
///     },
/// };
/// put_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct PutItem<T> {
    /// The item to put into the table, already in attribute value form.
    pub item: collections::HashMap<String, types::AttributeValue>,
    /// Additional write operation arguments (table name, condition).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<PutItem<T>> for PutItemInput {
    type Error = Error;

    fn try_from(put_item: PutItem<T>) -> Result<Self> {
        let write_operation: write::common::WriteInput = put_item.write_args.try_into()?;
        let operation = Self {
            item: put_item.item,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> PutItem<T> {
    /// Execute the put item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_resource.put_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::put_item::PutItemOutput,
        error::SdkError<operation::put_item::PutItemError>,
    > {
        let put_item: PutItemInput = self.try_into().map_err(error::BuildError::other)?;
        let builder = client.put_item().set_item(Some(put_item.item));
        crate::apply_write_operation!(builder, put_item.write_operation)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{self, key::KeyValue};

    use rstest::rstest;

    #[rstest]
    #[case::upsert(
        PutItem {
            item: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            ),
            write_args: write::common::WriteArgs {
                table_name: "c".to_string(),
                ..Default::default()
            },
        },
        PutItemInput {
            item: collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            ),
            write_operation: write::common::WriteInput {
                table_name: "c".to_string(),
                ..Default::default()
            },
        }
    )]
    #[case::strict(
        PutItem {
            item: collections::HashMap::from(
                [
                    (
                        "id".to_string(),
                        types::AttributeValue::N(
                            "42".to_string()
                        ),
                    ),
                    (
                        "ts".to_string(),
                        types::AttributeValue::N(
                            "1001".to_string()
                        ),
                    ),
                ]
            ),
            write_args: write::common::WriteArgs {
                condition: Some(
                    common::condition::KeyCondition {
                        name: "id".to_string(),
                        condition: common::condition::Condition::Null,
                    }
                ),
                table_name: "events".to_string(),
            },
        },
        PutItemInput {
            item: collections::HashMap::from(
                [
                    (
                        "id".to_string(),
                        types::AttributeValue::N(
                            "42".to_string()
                        ),
                    ),
                    (
                        "ts".to_string(),
                        types::AttributeValue::N(
                            "1001".to_string()
                        ),
                    ),
                ]
            ),
            write_operation: write::common::WriteInput {
                condition_expression: Some(
                    "attribute_not_exists(#id)".to_string()
                ),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#id".to_string(), "id".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: None,
                table_name: "events".to_string(),
            },
        }
    )]
    #[case::strict_dashed_key(
        PutItem {
            item: collections::HashMap::from(
                [(
                    "user-id".to_string(),
                    types::AttributeValue::S(
                        "a".to_string()
                    ),
                )]
            ),
            write_args: write::common::WriteArgs {
                condition: Some(
                    common::condition::KeyCondition {
                        name: "user-id".to_string(),
                        condition: common::condition::Condition::Null,
                    }
                ),
                table_name: "users".to_string(),
            },
        },
        PutItemInput {
            item: collections::HashMap::from(
                [(
                    "user-id".to_string(),
                    types::AttributeValue::S(
                        "a".to_string()
                    ),
                )]
            ),
            write_operation: write::common::WriteInput {
                condition_expression: Some(
                    "attribute_not_exists(#user_id)".to_string()
                ),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#user_id".to_string(), "user-id".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: None,
                table_name: "users".to_string(),
            },
        }
    )]
    #[case::conditional_value(
        PutItem {
            item: collections::HashMap::new(),
            write_args: write::common::WriteArgs {
                condition: Some(
                    common::condition::KeyCondition {
                        name: "c".to_string(),
                        condition: common::condition::Condition::Equals(
                            KeyValue::String(
                                "d".to_string()
                            )
                        ),
                    }
                ),
                table_name: "e".to_string(),
            },
        },
        PutItemInput {
            item: collections::HashMap::new(),
            write_operation: write::common::WriteInput {
                condition_expression: Some(
                    "#c = :c_eq0".to_string()
                ),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#c".to_string(), "c".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [
                            (
                                ":c_eq0".to_string(),
                                types::AttributeValue::S(
                                    "d".to_string()
                                )
                            ),
                        ]
                    )
                ),
                table_name: "e".to_string(),
            },
        }
    )]
    fn test_put_item(#[case] args: PutItem<KeyValue>, #[case] expected: PutItemInput) {
        let actual: PutItemInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
