//! Vendor-neutral time-series query model and column-oriented data frames.
//!
//! This crate holds the two data models shared by every backend layer:
//!
//! - [`query`]: the logical query model a dashboarding frontend produces,
//!   a time filter plus metric computations plus a chain of bucket
//!   aggregations, correlated by ref-id.
//! - [`frame`]: the flat, typed, column-oriented result tables delivered
//!   to the visualization layer.
//!
//! Backend-specific compilation and response shaping live in sibling
//! crates (e.g. `trellis-elastic`).

pub mod frame;
pub mod query;

pub use frame::{Field, FieldKind, FieldValues, Frame, FrameError};
pub use query::{
    BucketAgg, BucketAggKind, BucketSettings, Metric, MetricKind, MetricSettings, Query,
    QueryFilter, StringOrNumber, TimeRange,
};
