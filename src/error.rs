//! Error types surfaced by key decoding, range filters, configuration and store calls.

use crate::common::key::KeyType;

use std::error;

/// Broad category of an [`Error`].
///
/// A web collaborator typically maps these to `404`, `400`, `409` and `500` responses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The addressed item, or a required lookup parameter, is missing.
    NotFound,
    /// The request carried a malformed identifier, filter or payload.
    BadRequest,
    /// A strict create hit an existing item.
    Conflict,
    /// The resource definition itself is invalid.
    Configuration,
    /// The underlying store failed.
    Store,
}

/// Errors returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The item does not exist, or a list request lacked its hash key.
    #[error("not found: {0}")]
    NotFound(String),
    /// The item addressed by a strict create already exists.
    #[error("item already exists: {0}")]
    AlreadyExists(String),
    /// A slug did not split into the expected key components.
    #[error("malformed key `{slug}`: expected `<hash>{delimiter}<range>`")]
    MalformedKey {
        /// The slug as received.
        slug: String,
        /// The delimiter the resource joins key halves with.
        delimiter: char,
    },
    /// A key component could not be coerced to its declared type.
    #[error("invalid {key_type} key value `{value}`")]
    InvalidKeyType {
        /// The raw component.
        value: String,
        /// The declared key type.
        key_type: KeyType,
    },
    /// An item is missing one of its primary key attributes.
    #[error("missing key attribute `{0}`")]
    MissingKey(String),
    /// A range filter does not have the shape its operator requires.
    #[error("invalid range filter `{filter}`: {reason}")]
    InvalidFilter {
        /// The raw filter.
        filter: String,
        /// Why the filter was rejected.
        reason: String,
    },
    /// A write payload could not be hydrated into an item.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// The resource definition is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Converting between items and DynamoDB attribute values failed.
    #[error(transparent)]
    Serialization(#[from] serde_dynamo::Error),
    /// The store failed; the original error is kept as the source.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn error::Error + Send + Sync>),
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::Conflict,
            Self::MalformedKey { .. }
            | Self::InvalidKeyType { .. }
            | Self::MissingKey(_)
            | Self::InvalidFilter { .. }
            | Self::InvalidPayload(_) => ErrorKind::BadRequest,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Serialization(_) | Self::Store(_) => ErrorKind::Store,
        }
    }

    pub(crate) fn store<E: error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Store(Box::new(error))
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
