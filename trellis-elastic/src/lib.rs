//! Elasticsearch datasource layer for trellis.
//!
//! This crate compiles logical time-series queries into the backend's
//! newline-delimited multi-search wire format, and shapes the nested
//! aggregation responses back into flat [`trellis::Frame`]s:
//!
//! - [`query::builder`] folds a query's bucket-agg chain into a nested
//!   aggregation request with metric leaves.
//! - [`query::msearch`] renders compiled header/body pairs as the NDJSON
//!   multi-search payload.
//! - [`response::walker`] descends the returned bucket tree, accumulating
//!   keys and metric values per bucket path.
//! - [`response::frames`] pivots walked values into frames, exploding
//!   percentiles and extended statistics.
//! - [`response::hits`] projects raw-document hits straight into a frame.
//! - [`datasource`] ties the halves together around a transport
//!   collaborator, keeping errors scoped per ref-id.
//!
//! Compilation and parsing are synchronous pure transformations; only the
//! transport seam is async.

pub mod datasource;
pub mod error;
pub mod index_pattern;
pub mod query;
pub mod response;

pub use datasource::{BatchResponse, DatasourceConfig, ElasticDatasource, QueryResult, SearchTransport};
pub use error::ElasticError;
pub use index_pattern::IndexInterval;

/// Result type for datasource operations.
pub type Result<T> = std::result::Result<T, ElasticError>;
