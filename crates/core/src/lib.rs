//! Core types for Docket
//!
//! This crate defines the storage-independent pieces of the document store:
//! - Error: Error taxonomy and `Result` alias
//! - CollectionName: Validated collection identifier, document id rules
//! - Value: Write-side field values (with `Absent` and `Date`)
//! - Document / Record: Write-side and read-side document shapes
//! - Codec: Payload encoding and decoding
//! - Condition / QueryOptions: Filter terms and query shaping
//! - WriteResult / BatchReport: Structured write outcomes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod document;
pub mod error;
pub mod name;
pub mod outcome;
pub mod query;
pub mod value;

pub use codec::{decode, decode_map, encode, encode_document, encode_value, DecodeDepth};
pub use document::{generate_id, Document, Record, ID_FIELD};
pub use error::{Error, ItemFailure, Result};
pub use name::{
    sanitize_collection_name, validate_collection_name, validate_document_id, CollectionName,
    MAX_COLLECTION_NAME_LENGTH, MAX_DOCUMENT_ID_LENGTH, RESERVED_PREFIX,
};
pub use outcome::{BatchReport, WriteResult};
pub use query::{Condition, Operator, OrderBy, QueryOptions, SortDirection};
pub use value::Value;
