//! URL-safe identifiers for primary keys.
//!
//! A slug is `<hash>` for hash-only tables and `<hash><delimiter><range>` for tables with
//! a range key. Decoding splits on the first delimiter only, so a string range value may
//! itself contain the delimiter.

use crate::{
    common::{
        item::Item,
        key::{Key, Keys, PrimaryKey},
    },
    config::TableSchema,
    error::{Error, Result},
};

/// Slug of an item, read from its key attributes.
///
/// ```rust
/// use dynamodb_resource::{common::{item::Item, key::KeyType, slug}, config};
/// use serde_json::json;
///
/// let schema = config::TableSchema::new("events", config::KeyAttribute::new("id", KeyType::Number))
///     .with_range_key(config::KeyAttribute::new("ts", KeyType::Number));
/// let mut item = Item::default();
/// item.insert("id", json!(42));
/// item.insert("ts", json!(1001));
/// assert_eq!(slug::encode(&item, &schema, ':').unwrap(), "42:1001");
/// ```
pub fn encode(item: &Item, schema: &TableSchema, delimiter: char) -> Result<String> {
    let key = PrimaryKey::from_item(item, schema)?;
    Ok(encode_key(&key, delimiter))
}

/// Slug of a primary key.
pub fn encode_key(key: &PrimaryKey, delimiter: char) -> String {
    match &key.sort_key {
        Some(sort_key) => format!("{}{delimiter}{}", key.partition_key.value, sort_key.value),
        None => key.partition_key.value.to_string(),
    }
}

/// Primary key addressed by a slug, coerced to the schema's key types.
pub fn decode(slug: &str, schema: &TableSchema, delimiter: char) -> Result<PrimaryKey> {
    let malformed = || Error::MalformedKey {
        slug: slug.to_string(),
        delimiter,
    };
    if slug.is_empty() {
        return Err(malformed());
    }
    let Some(range_key) = &schema.range_key else {
        return Ok(Keys {
            partition_key: Key {
                name: schema.hash_key.name.clone(),
                value: schema.hash_key.coerce(slug)?,
            },
            sort_key: None,
        });
    };
    let (hash, range) = slug
        .split_once(delimiter)
        .filter(|(hash, range)| !hash.is_empty() && !range.is_empty())
        .ok_or_else(malformed)?;
    Ok(Keys {
        partition_key: Key {
            name: schema.hash_key.name.clone(),
            value: schema.hash_key.coerce(hash)?,
        },
        sort_key: Some(Key {
            name: range_key.name.clone(),
            value: range_key.coerce(range)?,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::key::{KeyType, KeyValue},
        config::KeyAttribute,
    };

    use rstest::rstest;
    use serde_json::json;

    fn hash_range_schema(hash_type: KeyType, range_type: KeyType) -> TableSchema {
        TableSchema::new("events", KeyAttribute::new("id", hash_type))
            .with_range_key(KeyAttribute::new("ts", range_type))
    }

    fn hash_schema(hash_type: KeyType) -> TableSchema {
        TableSchema::new("users", KeyAttribute::new("id", hash_type))
    }

    fn primary_key(hash: KeyValue, range: Option<KeyValue>) -> PrimaryKey {
        Keys {
            partition_key: Key {
                name: "id".to_string(),
                value: hash,
            },
            sort_key: range.map(|value| Key {
                name: "ts".to_string(),
                value,
            }),
        }
    }

    #[rstest]
    #[case::hash_range_numbers(
        json!({"id": 42, "ts": 1001, "title": "launch"}),
        hash_range_schema(KeyType::Number, KeyType::Number),
        "42:1001"
    )]
    #[case::hash_range_strings(
        json!({"id": "user", "ts": "2024-01-01"}),
        hash_range_schema(KeyType::String, KeyType::String),
        "user:2024-01-01"
    )]
    #[case::hash_only_number(json!({"id": -7}), hash_schema(KeyType::Number), "-7")]
    #[case::hash_only_string(json!({"id": "abc"}), hash_schema(KeyType::String), "abc")]
    #[case::numeric_string_attribute(
        json!({"id": "42", "ts": 1001}),
        hash_range_schema(KeyType::Number, KeyType::Number),
        "42:1001"
    )]
    fn test_encode(
        #[case] item: serde_json::Value,
        #[case] schema: TableSchema,
        #[case] expected: &str,
    ) {
        let item: Item = serde_json::from_value(item).unwrap();
        assert_eq!(encode(&item, &schema, ':').unwrap(), expected);
    }

    #[test]
    fn test_encode_missing_range_key() {
        let item: Item = serde_json::from_value(json!({"id": 42, "ts": null})).unwrap();
        let error = encode(&item, &hash_range_schema(KeyType::Number, KeyType::Number), ':')
            .unwrap_err();
        assert!(matches!(error, Error::MissingKey(name) if name == "ts"));
    }

    #[rstest]
    #[case::hash_range_numbers(
        "42:1001",
        hash_range_schema(KeyType::Number, KeyType::Number),
        primary_key(KeyValue::Number(42), Some(KeyValue::Number(1001)))
    )]
    #[case::hash_range_signed(
        "-42:+7",
        hash_range_schema(KeyType::Number, KeyType::Number),
        primary_key(KeyValue::Number(-42), Some(KeyValue::Number(7)))
    )]
    #[case::first_split_keeps_extra_delimiters(
        "user:12:30:00",
        hash_range_schema(KeyType::String, KeyType::String),
        primary_key(
            KeyValue::String("user".to_string()),
            Some(KeyValue::String("12:30:00".to_string()))
        )
    )]
    #[case::hash_only_number(
        "42",
        hash_schema(KeyType::Number),
        primary_key(KeyValue::Number(42), None)
    )]
    #[case::hash_only_string_with_delimiter(
        "a:b",
        hash_schema(KeyType::String),
        primary_key(KeyValue::String("a:b".to_string()), None)
    )]
    fn test_decode(
        #[case] slug: &str,
        #[case] schema: TableSchema,
        #[case] expected: PrimaryKey,
    ) {
        assert_eq!(decode(slug, &schema, ':').unwrap(), expected);
    }

    #[rstest]
    #[case::no_delimiter("42")]
    #[case::empty_range("42:")]
    #[case::empty_hash(":1001")]
    #[case::empty("")]
    #[case::other_delimiter("42|1001")]
    fn test_decode_malformed(#[case] slug: &str) {
        let error = decode(slug, &hash_range_schema(KeyType::Number, KeyType::Number), ':')
            .unwrap_err();
        assert!(matches!(error, Error::MalformedKey { delimiter: ':', .. }));
    }

    #[rstest]
    #[case::hash("abc:1001")]
    #[case::range("42:abc")]
    #[case::extra_delimiter_in_numeric_range("42:10:01")]
    fn test_decode_invalid_key_type(#[case] slug: &str) {
        let error = decode(slug, &hash_range_schema(KeyType::Number, KeyType::Number), ':')
            .unwrap_err();
        assert!(matches!(error, Error::InvalidKeyType { .. }));
    }

    #[rstest]
    #[case::numbers(
        json!({"id": 42, "ts": 1001}),
        hash_range_schema(KeyType::Number, KeyType::Number)
    )]
    #[case::negative_numbers(
        json!({"id": -1, "ts": -99}),
        hash_range_schema(KeyType::Number, KeyType::Number)
    )]
    #[case::mixed(
        json!({"id": "tenant", "ts": 3}),
        hash_range_schema(KeyType::String, KeyType::Number)
    )]
    #[case::range_with_delimiter(
        json!({"id": 1, "ts": "12:30"}),
        hash_range_schema(KeyType::Number, KeyType::String)
    )]
    #[case::hash_only(json!({"id": "abc"}), hash_schema(KeyType::String))]
    fn test_round_trip(#[case] item: serde_json::Value, #[case] schema: TableSchema) {
        let item: Item = serde_json::from_value(item).unwrap();
        let slug = encode(&item, &schema, ':').unwrap();
        let decoded = decode(&slug, &schema, ':').unwrap();
        assert_eq!(decoded, PrimaryKey::from_item(&item, &schema).unwrap());
    }

    #[test]
    fn test_encode_key_single_delimiter() {
        let key = primary_key(KeyValue::Number(42), Some(KeyValue::Number(1001)));
        let slug = encode_key(&key, '|');
        assert_eq!(slug, "42|1001");
        assert_eq!(slug.matches('|').count(), 1);
    }
}
