use crate::common;

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::{Result, to_attribute_value};
use std::collections;

/// Separator between the clauses of a key condition expression.
const AND: &str = " AND ";

/// Attribute name reduced to the characters DynamoDB accepts in placeholders.
fn placeholder_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Condition on a key attribute, with its operands bound.
///
/// ```rust
/// use dynamodb_resource::common::{condition, key::KeyValue};
///
/// let eq = condition::Condition::Equals(KeyValue::Number(42));
/// let between = condition::Condition::Between(KeyValue::Number(1), KeyValue::Number(9));
/// let absent: condition::Condition<KeyValue> = condition::Condition::Null;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Condition<T> {
    /// Checks if an attribute begins with a specified prefix (string types only).
    BeginsWith(T),
    /// Checks if an attribute value is between two values (inclusive).
    Between(T, T),
    /// Checks if an attribute value equals a specified value.
    Equals(T),
    /// Checks if an attribute value is greater than a specified value.
    GreaterThan(T),
    /// Checks if an attribute value is greater than or equal to a specified value.
    GreaterThanOrEqual(T),
    /// Checks if an attribute value is less than a specified value.
    LessThan(T),
    /// Checks if an attribute value is less than or equal to a specified value.
    LessThanOrEqual(T),
    /// Checks if an attribute exists.
    NotNull,
    /// Checks if an attribute does not exist.
    Null,
}

impl<T: Serialize> Condition<T> {
    fn get_expression(
        self,
        key: &str,
        key_placeholder: &str,
        index: &mut usize,
    ) -> Result<(String, collections::HashMap<String, types::AttributeValue>)> {
        let mut expression_attribute_values = collections::HashMap::new();
        let mut bind = |suffix: &str, value: T| -> Result<String> {
            let value = to_attribute_value(value)?;
            let value_placeholder = format!(":{key}_{suffix}{index}");
            *index += 1;
            expression_attribute_values.insert(value_placeholder.clone(), value);
            Ok(value_placeholder)
        };
        let expression = match self {
            Self::BeginsWith(prefix) => {
                let value_placeholder = bind("begins_with", prefix)?;
                format!("begins_with({key_placeholder}, {value_placeholder})")
            }
            Self::Between(value1, value2) => {
                let value_placeholder_1 = bind("between", value1)?;
                let value_placeholder_2 = bind("between", value2)?;
                format!("{key_placeholder} BETWEEN {value_placeholder_1} AND {value_placeholder_2}")
            }
            Self::Equals(value) => {
                let value_placeholder = bind("eq", value)?;
                format!("{key_placeholder} = {value_placeholder}")
            }
            Self::GreaterThan(value) => {
                let value_placeholder = bind("gt", value)?;
                format!("{key_placeholder} > {value_placeholder}")
            }
            Self::GreaterThanOrEqual(value) => {
                let value_placeholder = bind("gte", value)?;
                format!("{key_placeholder} >= {value_placeholder}")
            }
            Self::LessThan(value) => {
                let value_placeholder = bind("lt", value)?;
                format!("{key_placeholder} < {value_placeholder}")
            }
            Self::LessThanOrEqual(value) => {
                let value_placeholder = bind("lte", value)?;
                format!("{key_placeholder} <= {value_placeholder}")
            }
            Self::NotNull => format!("attribute_exists({key_placeholder})"),
            Self::Null => format!("attribute_not_exists({key_placeholder})"),
        };
        Ok((expression, expression_attribute_values))
    }
}

/// Condition applied to an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition<T> {
    /// The condition to apply to the attribute.
    pub condition: Condition<T>,
    /// The name of the attribute to apply the condition to.
    pub name: String,
}

impl<T: Serialize> KeyCondition<T> {
    /// Render conditions joined by `AND`, with `#name` and `:value` placeholders.
    ///
    /// Placeholders only keep `[A-Za-z0-9_]` of the attribute name; two names that reduce
    /// to the same placeholder are told apart by their position.
    pub(crate) fn get_expression_operation(keys: Vec<Self>) -> Result<common::ExpressionInput> {
        let mut expressions = Vec::with_capacity(keys.len());
        let mut expression_attribute_names: collections::HashMap<String, String> =
            collections::HashMap::with_capacity(keys.len());
        let mut expression_attribute_values = collections::HashMap::new();
        let mut index = 0;
        for (position, key) in keys.into_iter().enumerate() {
            let mut name = placeholder_name(&key.name);
            if expression_attribute_names
                .get(&format!("#{name}"))
                .is_some_and(|taken| *taken != key.name)
            {
                name = format!("{name}_{position}");
            }
            let placeholder = format!("#{name}");
            let (expression, condition_expression_attribute_values) = key
                .condition
                .get_expression(&name, &placeholder, &mut index)?;
            expressions.push(expression);
            expression_attribute_names.insert(placeholder, key.name);
            expression_attribute_values.extend(condition_expression_attribute_values);
        }
        let expression = expressions.join(AND);
        let operation = common::ExpressionInput {
            expression,
            expression_attribute_names,
            expression_attribute_values,
        };
        Ok(operation)
    }
}
