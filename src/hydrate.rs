//! Turning raw write payloads into items.
//!
//! The resource never parses request bodies itself: it hands the decoded JSON payload to a
//! [`Hydrate`] implementation together with the intent of the write. [`FieldHydrator`] is
//! the default implementation, driven by the [`KeyField`] descriptors a
//! [`ResourceConfig`](crate::config::ResourceConfig) emits for its key attributes.

use crate::{
    common::{
        item::Item,
        key::{KeyType, KeyValue},
    },
    error::{Error, Result},
};

use std::{fmt, sync};

/// What a write is for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Intent {
    /// Insert a new item (`POST`).
    Create,
    /// Replace the item addressed by a slug (`PUT`).
    Update,
}

/// Which half of the primary key a field holds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyRole {
    /// The hash (partition) key.
    Hash,
    /// The range (sort) key.
    Range,
}

/// Value assigned to a key attribute on create.
#[derive(Clone)]
pub enum FieldDefault {
    /// A fixed value.
    Value(KeyValue),
    /// A value computed from the item hydrated so far.
    Generate(sync::Arc<dyn Fn(&Item) -> KeyValue + Send + Sync>),
}

impl FieldDefault {
    /// Wrap a generator function.
    pub fn generate<F>(generate: F) -> Self
    where
        F: Fn(&Item) -> KeyValue + Send + Sync + 'static,
    {
        Self::Generate(sync::Arc::new(generate))
    }

    fn resolve(&self, item: &Item) -> KeyValue {
        match self {
            Self::Value(value) => value.clone(),
            Self::Generate(generate) => generate(item),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Generate(_) => f.write_str("Generate(..)"),
        }
    }
}

/// Descriptor of one key attribute of a resource.
#[derive(Clone, Debug)]
pub struct KeyField {
    /// The attribute name.
    pub attribute: String,
    /// The declared type.
    pub key_type: KeyType,
    /// Hash or range.
    pub role: KeyRole,
    /// Whether an update payload may set this attribute.
    pub updateable: bool,
    /// Value assigned on create, overriding the payload.
    pub default: Option<FieldDefault>,
}

impl KeyField {
    /// Resolve this field's value, or `None` when it must not be written.
    fn hydrate(
        &self,
        payload: Option<&serde_json::Value>,
        item: &Item,
        intent: Intent,
    ) -> Result<Hydration> {
        match (intent, &self.default) {
            (Intent::Create, Some(default)) => {
                let value = default.resolve(item);
                if value.key_type() != self.key_type {
                    return Err(Error::InvalidPayload(format!(
                        "default `{value}` of key `{}` is not a {}",
                        self.attribute, self.key_type
                    )));
                }
                Ok(Hydration::Defaulted(value))
            }
            (Intent::Update, _) if !self.updateable => Ok(Hydration::Dropped),
            _ => {
                let value = payload
                    .map(|value| self.key_type.coerce_json(value))
                    .transpose()?
                    .flatten();
                Ok(value.map_or(Hydration::Dropped, Hydration::Supplied))
            }
        }
    }
}

enum Hydration {
    Supplied(KeyValue),
    Defaulted(KeyValue),
    Dropped,
}

/// Result of hydrating a payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hydrated {
    /// The item to write.
    pub item: Item,
    /// Attributes taken from the payload.
    pub supplied: Vec<String>,
    /// Attributes filled from field defaults.
    pub defaulted: Vec<String>,
}

/// Validation and normalization of write payloads.
pub trait Hydrate {
    /// Build the item to write from a raw payload.
    fn hydrate(&self, payload: &serde_json::Value, intent: Intent) -> Result<Hydrated>;
}

/// Hydration driven by key field descriptors.
///
/// Non-key payload attributes pass through unchanged. Key attributes follow their field:
/// - on create, a field with a default takes the default;
/// - on update, a field that is not updateable is dropped, since the slug addresses the item;
/// - otherwise the payload value is coerced to the key type.
///
/// ```rust
/// use dynamodb_resource::{
///     common::key::{KeyType, KeyValue},
///     hydrate::{FieldHydrator, Hydrate, Intent, KeyField, KeyRole},
/// };
/// use serde_json::json;
///
/// let hydrator = FieldHydrator::new(vec![KeyField {
///     attribute: "id".to_string(),
///     key_type: KeyType::Number,
///     role: KeyRole::Hash,
///     updateable: false,
///     default: None,
/// }]);
/// let hydrated = hydrator.hydrate(&json!({"id": "42", "name": "a"}), Intent::Create).unwrap();
/// assert_eq!(hydrated.item.get("id"), Some(&json!(42)));
/// ```
#[derive(Clone, Debug)]
pub struct FieldHydrator {
    fields: Vec<KeyField>,
}

impl FieldHydrator {
    /// Hydrate with the given key fields.
    pub fn new(fields: Vec<KeyField>) -> Self {
        Self { fields }
    }

    /// The key fields.
    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }
}

impl Hydrate for FieldHydrator {
    fn hydrate(&self, payload: &serde_json::Value, intent: Intent) -> Result<Hydrated> {
        let serde_json::Value::Object(attributes) = payload else {
            return Err(Error::InvalidPayload(format!(
                "expected an object, got `{payload}`"
            )));
        };
        let is_key = |name: &str| self.fields.iter().any(|field| field.attribute == name);
        let mut hydrated = Hydrated::default();
        for (name, value) in attributes {
            if is_key(name) {
                continue;
            }
            if !value.is_null() {
                hydrated.supplied.push(name.clone());
            }
            hydrated.item.insert(name.clone(), value.clone());
        }
        for field in &self.fields {
            let payload_value = attributes.get(&field.attribute);
            match field.hydrate(payload_value, &hydrated.item, intent)? {
                Hydration::Supplied(value) => {
                    hydrated.supplied.push(field.attribute.clone());
                    hydrated.item.insert(field.attribute.clone(), value);
                }
                Hydration::Defaulted(value) => {
                    hydrated.defaulted.push(field.attribute.clone());
                    hydrated.item.insert(field.attribute.clone(), value);
                }
                Hydration::Dropped => {}
            }
        }
        Ok(hydrated)
    }
}
