//! Logical time-series query model.
//!
//! These types mirror the JSON query model produced by a query editor:
//! `refId`, `timeField`, `metrics[]`, `bucketAggs[]` plus per-type
//! settings. Metric and bucket-agg types are kept as strings on the wire
//! so an unknown type in one query fails that query at compile time
//! instead of failing deserialization of the whole batch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed time range in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }
}

/// One logical query within a batch. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Caller-assigned identifier correlating the query to its result
    /// frames. Unique within a batch.
    pub ref_id: String,

    /// Name of the document field holding the event timestamp.
    pub time_field: String,

    #[serde(default)]
    pub time_range: TimeRange,

    /// Optional lucene filter applied before aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Interval hint in milliseconds, used when a date histogram carries
    /// no explicit interval setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,

    #[serde(default)]
    pub metrics: Vec<Metric>,

    /// Bucket aggregations form a strict linear chain: each entry is
    /// evaluated within buckets of the previous one.
    #[serde(default)]
    pub bucket_aggs: Vec<BucketAgg>,
}

/// A metric computation, unique by `id` within its query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,

    #[serde(rename = "type")]
    pub metric_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default)]
    pub settings: MetricSettings,

    /// Extended-stats sub-field selection: stat key -> emit flag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, bool>,

    /// Hidden metrics are compiled (they may drive ordering) but produce
    /// no frames.
    #[serde(default)]
    pub hide: bool,
}

impl Metric {
    /// Resolve the wire type string, `None` for unknown types.
    pub fn kind(&self) -> Option<MetricKind> {
        MetricKind::parse(&self.metric_type)
    }

    /// Target field, empty string when absent.
    pub fn field_or_empty(&self) -> &str {
        self.field.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSettings {
    /// Percentile list for `percentiles` metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percents: Option<Vec<StringOrNumber>>,

    /// Result window for raw-document / raw-data metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<StringOrNumber>,

    /// Precision hint for `cardinality` metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_threshold: Option<StringOrNumber>,
}

/// A bucket aggregation, unique by `id` within its query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketAgg {
    pub id: String,

    #[serde(rename = "type")]
    pub agg_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default)]
    pub settings: BucketSettings,
}

impl BucketAgg {
    /// Resolve the wire type string, `None` for unknown types.
    pub fn kind(&self) -> Option<BucketAggKind> {
        BucketAggKind::parse(&self.agg_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketSettings {
    /// Date-histogram interval string or histogram bucket width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<StringOrNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_doc_count: Option<StringOrNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<StringOrNumber>,

    /// Sort direction for terms buckets (`asc` / `desc`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    /// Sort target for terms buckets: `_term`, `_count` or a metric id.
    #[serde(default, rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Geohash grid precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<StringOrNumber>,

    /// Filter list for `filters` aggregations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<QueryFilter>>,
}

/// One entry of a `filters` bucket aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFilter {
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl QueryFilter {
    /// Bucket key this filter appears under: the label when present and
    /// non-empty, the query text otherwise.
    pub fn key(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.query,
        }
    }
}

/// Settings values arrive as strings or numbers interchangeably
/// (`"size": "10"` vs `"size": 10`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    String(String),
    Number(f64),
}

impl StringOrNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StringOrNumber::String(s) => s.trim().parse().ok(),
            StringOrNumber::Number(n) => Some(*n),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64)
    }

    /// Canonical text form: strings pass through, whole numbers drop the
    /// fractional part (`75.0` -> `"75"`).
    pub fn to_text(&self) -> String {
        match self {
            StringOrNumber::String(s) => s.clone(),
            StringOrNumber::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            StringOrNumber::Number(n) => format!("{n}"),
        }
    }
}

/// Supported metric computation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Count,
    Avg,
    Sum,
    Min,
    Max,
    Percentiles,
    ExtendedStats,
    Cardinality,
    RawData,
    RawDocument,
}

impl MetricKind {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "count" => MetricKind::Count,
            "avg" => MetricKind::Avg,
            "sum" => MetricKind::Sum,
            "min" => MetricKind::Min,
            "max" => MetricKind::Max,
            "percentiles" => MetricKind::Percentiles,
            "extended_stats" => MetricKind::ExtendedStats,
            "cardinality" => MetricKind::Cardinality,
            "raw_data" => MetricKind::RawData,
            "raw_document" => MetricKind::RawDocument,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Count => "count",
            MetricKind::Avg => "avg",
            MetricKind::Sum => "sum",
            MetricKind::Min => "min",
            MetricKind::Max => "max",
            MetricKind::Percentiles => "percentiles",
            MetricKind::ExtendedStats => "extended_stats",
            MetricKind::Cardinality => "cardinality",
            MetricKind::RawData => "raw_data",
            MetricKind::RawDocument => "raw_document",
        }
    }

    /// Kinds that bypass aggregation and read search hits directly.
    pub fn is_raw(&self) -> bool {
        matches!(self, MetricKind::RawData | MetricKind::RawDocument)
    }

    /// Kinds that emit a wire-level aggregation. Count is derived from
    /// bucket document counts and emits none.
    pub fn has_wire_agg(&self) -> bool {
        !matches!(self, MetricKind::Count) && !self.is_raw()
    }

    /// Human-readable base label used in frame names.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Count => "Count",
            MetricKind::Avg => "Average",
            MetricKind::Sum => "Sum",
            MetricKind::Min => "Min",
            MetricKind::Max => "Max",
            MetricKind::Percentiles => "Percentile",
            MetricKind::ExtendedStats => "Extended Stats",
            MetricKind::Cardinality => "Unique Count",
            MetricKind::RawData => "Raw Data",
            MetricKind::RawDocument => "Raw Document",
        }
    }
}

/// Supported bucket aggregation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketAggKind {
    DateHistogram,
    Histogram,
    Terms,
    Filters,
    GeohashGrid,
}

impl BucketAggKind {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "date_histogram" => BucketAggKind::DateHistogram,
            "histogram" => BucketAggKind::Histogram,
            "terms" => BucketAggKind::Terms,
            "filters" => BucketAggKind::Filters,
            "geohash_grid" => BucketAggKind::GeohashGrid,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketAggKind::DateHistogram => "date_histogram",
            BucketAggKind::Histogram => "histogram",
            BucketAggKind::Terms => "terms",
            BucketAggKind::Filters => "filters",
            BucketAggKind::GeohashGrid => "geohash_grid",
        }
    }
}
