//! # Docmeta Model
//!
//! Shared value types for the docmeta workspace: attribute records produced by
//! the dump parser, type nodes held by the metadata cache, and the bridge
//! transfer types exchanged with the repository server.
//!
//! Everything here is plain data. Behavior lives in `docmeta-dump` (parsing)
//! and `docmeta-cache` (hierarchy maintenance and queries).

mod attribute;
mod name;
mod type_node;

pub use attribute::{category_for_prefix, AttributeCategory, AttributeRecord, AttributeValue};
pub use name::canonical_name;
pub use type_node::{AttributeDescriptor, TypeDescriptor, TypeDetails, TypeNode};
