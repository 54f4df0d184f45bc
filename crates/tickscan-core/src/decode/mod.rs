//! Payload decoders.
//!
//! Array endpoints go through [`ArrayElements`], which splits a top-level
//! array while it is still arriving. Object endpoints are parsed whole into a
//! [`Document`]. [`crate::Endpoint::decode_strategy`] says which one applies.

mod array;
mod document;

pub use array::ArrayElements;
pub use document::{parse_number, Document, Node};
