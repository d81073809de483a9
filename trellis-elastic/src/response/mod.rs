//! Response side: wire-level response types, the bucket-tree walker, the
//! frame assembler and the raw-hit projector.

pub mod frames;
pub mod hits;
pub mod types;
pub mod walker;

pub use types::{MultiSearchResponse, ResponseEntry, SearchResponse};
