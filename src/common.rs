//! Key codec, range condition builder and item representation.
//!
//! Everything here is independent of the store client: these modules translate between
//! the caller's wire strings and typed DynamoDB key values and expressions.

/// Key conditions and their expression rendering.
pub mod condition;

/// Attribute bag exchanged with callers.
pub mod item;

/// Key types, key values and type coercion.
pub mod key;

/// Range filter to sort key condition translation.
pub mod range;

/// Slug encoding and decoding of primary keys.
pub mod slug;

use aws_sdk_dynamodb::types;
use std::collections;

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        match names {
            Some(existing) => existing.extend(self.expression_attribute_names),
            None => *names = Some(self.expression_attribute_names),
        }
        if !self.expression_attribute_values.is_empty() {
            match values {
                Some(existing) => existing.extend(self.expression_attribute_values),
                None => *values = Some(self.expression_attribute_values),
            }
        }
        self.expression
    }
}
