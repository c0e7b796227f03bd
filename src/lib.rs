#![deny(missing_docs)]

//! # DynamoDB Resource
//!
//! Expose a DynamoDB table as a REST-style resource: items addressed by URL-safe slugs,
//! listed by hash key with an optional range filter.
//!
//! ## Overview
//!
//! The crate sits between a web layer and a DynamoDB table:
//! - slugs (`<hash>` or `<hash>:<range>`) decode into typed primary keys and back;
//! - raw range filters (`"1000:2000"`) become sort key conditions under an operator
//!   declared once per resource, never chosen by the request;
//! - create, get, update, delete and list each make exactly one store call.
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_resource::{
//!     common::range::RangeOperator, config::ResourceConfig, resource::Resource,
//!     store::dynamodb::DynamoStore,
//! };
//! use serde_json::json;
//!
//! # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! let schema = DynamoStore::describe(&client, "events").await?;
//! let config = ResourceConfig::builder(schema.clone())
//!     .range_operator(RangeOperator::Between)
//!     .build()?;
//! let events = Resource::new(config, DynamoStore::new(client, &schema));
//!
//! let created = events.create(&json!({"id": 42, "ts": 1001, "title": "launch"})).await?;
//! assert_eq!(events.resource_uri(&created)?, "/events/42:1001/");
//! // "#id = :id_eq0 AND #ts BETWEEN :ts_between1 AND :ts_between2"
//! let window = events.list(Some("42"), Some("1000:2000")).await?;
//! events.delete("42:1001").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Key codec, range conditions and the item type
//! - [`mod@config`] - Table schema and validated resource settings
//! - [`mod@hydrate`] - Turning write payloads into items
//! - [`mod@resource`] - The resource adapter
//! - [`mod@store`] - The store seam, with DynamoDB and in-memory implementations
//! - [`mod@read`] - Read operations (GetItem, Query)
//! - [`mod@write`] - Write operations (PutItem, DeleteItem)

/// Common utilities for keys, conditions, and items.
pub mod common;

/// Table schema and resource settings.
pub mod config;

/// Error types.
pub mod error;

/// Write payload hydration.
pub mod hydrate;

/// Read operations for retrieving data from DynamoDB tables.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying one page of items with key conditions
pub mod read;

/// The resource adapter.
pub mod resource;

/// Store clients.
pub mod store;

/// Write operations for modifying data in DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Deleting items by key
pub mod write;
