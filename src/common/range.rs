//! Translation of raw range filters into sort key conditions.
//!
//! The operator of a range condition is declared once per resource; a request only ever
//! supplies its operand values. Binary operators take both operands from one filter
//! string joined by the resource's delimiter, the same delimiter that joins slug halves.

use crate::{
    common::{
        condition::Condition,
        key::{KeyType, KeyValue},
    },
    error::{Error, Result},
};

use serde::{Deserialize, Serialize};

/// Sort key operator, without operands.
///
/// ```rust
/// use dynamodb_resource::common::range::RangeOperator;
///
/// assert_eq!(RangeOperator::Equal.arity(), 1);
/// assert_eq!(RangeOperator::Between.arity(), 2);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOperator {
    /// `=`
    #[default]
    Equal,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `begins_with`, string keys only.
    BeginsWith,
    /// `BETWEEN .. AND ..`, bounds inclusive.
    Between,
}

impl RangeOperator {
    /// Number of operands the operator takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Between => 2,
            _ => 1,
        }
    }

    /// Whether the operator applies to keys of `key_type`.
    pub fn supports(self, key_type: KeyType) -> bool {
        !matches!((self, key_type), (Self::BeginsWith, KeyType::Number))
    }

    fn unary<T>(self, value: T) -> Option<Condition<T>> {
        let condition = match self {
            Self::Equal => Condition::Equals(value),
            Self::LessThan => Condition::LessThan(value),
            Self::LessThanOrEqual => Condition::LessThanOrEqual(value),
            Self::GreaterThan => Condition::GreaterThan(value),
            Self::GreaterThanOrEqual => Condition::GreaterThanOrEqual(value),
            Self::BeginsWith => Condition::BeginsWith(value),
            Self::Between => return None,
        };
        Some(condition)
    }
}

/// Build the sort key condition for a raw range filter.
///
/// An absent or empty filter yields no condition, so the query matches every item under
/// the hash key.
///
/// ```rust
/// use dynamodb_resource::common::{
///     condition::Condition,
///     key::{KeyType, KeyValue},
///     range::{self, RangeOperator},
/// };
///
/// let condition = range::build(Some("1000:2000"), RangeOperator::Between, ':', KeyType::Number)
///     .unwrap();
/// assert_eq!(
///     condition,
///     Some(Condition::Between(KeyValue::Number(1000), KeyValue::Number(2000)))
/// );
/// ```
pub fn build(
    raw: Option<&str>,
    operator: RangeOperator,
    delimiter: char,
    key_type: KeyType,
) -> Result<Option<Condition<KeyValue>>> {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let invalid = |reason: String| Error::InvalidFilter {
        filter: raw.to_string(),
        reason,
    };
    let condition = match operator {
        RangeOperator::Between => {
            let operands: Vec<&str> = raw.split(delimiter).collect();
            let [left, right] = operands.as_slice() else {
                return Err(invalid(format!(
                    "{operator:?} expects two values separated by `{delimiter}`, got {}",
                    operands.len()
                )));
            };
            Condition::Between(key_type.coerce(left)?, key_type.coerce(right)?)
        }
        _ if raw.contains(delimiter) => {
            return Err(invalid(format!(
                "{operator:?} expects a single value, found `{delimiter}`"
            )));
        }
        _ => operator
            .unary(key_type.coerce(raw)?)
            .ok_or_else(|| invalid(format!("{operator:?} is not a single value operator")))?,
    };
    Ok(Some(condition))
}
