//! Request side: wire-level types, the aggregation tree builder and the
//! multi-search payload serializer.

pub mod builder;
pub mod msearch;
pub mod types;

pub use builder::QueryCompiler;
pub use types::{CompiledQuery, IndexSpec, SearchBody, SearchHeader};
