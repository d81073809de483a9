//! Wire-level request types for the multi-search payload.
//!
//! Shapes match the backend's search API exactly: externally tagged
//! snake_case enums produce `{"date_histogram": {...}}` style objects,
//! field-keyed clauses are maps. Child maps are `BTreeMap` so rendered
//! payload bytes are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trellis::TimeRange;

/// Wire name of the aggregation node built for the given metric or
/// bucket-agg id. The response walker locates subtrees through this same
/// function, so request and response naming can never drift apart.
pub fn agg_wire_name(id: &str) -> String {
    id.to_string()
}

/// One compiled header/body pair, still tied to its ref-id for response
/// correlation.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub ref_id: String,
    pub header: SearchHeader,
    pub body: SearchBody,
}

/// Header line of a multi-search pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHeader {
    pub ignore_unavailable: bool,
    pub index: IndexSpec,
    pub search_type: String,
}

impl SearchHeader {
    pub fn new(index: IndexSpec) -> Self {
        Self {
            ignore_unavailable: true,
            index,
            search_type: "query_then_fetch".to_string(),
        }
    }
}

/// One index name or a list of rotated index names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexSpec {
    Single(String),
    Multiple(Vec<String>),
}

impl IndexSpec {
    /// Collapse a generated name list: one entry stays a plain string.
    pub fn from_names(mut names: Vec<String>) -> Self {
        if names.len() == 1 {
            IndexSpec::Single(names.remove(0))
        } else {
            IndexSpec::Multiple(names)
        }
    }
}

/// Body line of a multi-search pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<WireQuery>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortSpec>>,

    /// Present (as an empty object) for raw-document queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_fields: Option<BTreeMap<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggs: Option<BTreeMap<String, ChildAgg>>,
}

/// `{"bool": {"filter": [...]}}` wrapper around the filter clauses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireQuery {
    #[serde(rename = "bool")]
    pub bool_clause: BoolFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoolFilter {
    pub filter: Vec<FilterClause>,
}

/// Filter clauses the datasource emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterClause {
    Range(BTreeMap<String, RangeFilter>),
    QueryString(QueryStringFilter),
}

impl FilterClause {
    /// Epoch-millis time window on the given field.
    pub fn time_range(field: &str, range: &TimeRange) -> Self {
        let mut clause = BTreeMap::new();
        clause.insert(
            field.to_string(),
            RangeFilter {
                gte: range.from,
                lte: range.to,
                format: "epoch_millis".to_string(),
            },
        );
        FilterClause::Range(clause)
    }

    /// Lucene query string clause.
    pub fn lucene(query: &str) -> Self {
        FilterClause::QueryString(QueryStringFilter {
            query: query.to_string(),
            analyze_wildcard: true,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeFilter {
    pub gte: i64,
    pub lte: i64,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStringFilter {
    pub query: String,
    pub analyze_wildcard: bool,
}

/// One sort entry, keyed by field name.
pub type SortSpec = BTreeMap<String, SortOptions>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortOptions {
    pub order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmapped_type: Option<String>,
}

pub fn sort_desc(field: &str, unmapped_type: Option<&str>) -> SortSpec {
    let mut spec = BTreeMap::new();
    spec.insert(
        field.to_string(),
        SortOptions {
            order: "desc".to_string(),
            unmapped_type: unmapped_type.map(str::to_string),
        },
    );
    spec
}

/// Recursive aggregation request node: a bucket definition plus a child
/// map of sub-aggregations (deeper buckets or metric leaves).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationNode {
    #[serde(flatten)]
    pub bucket: BucketDef,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, ChildAgg>,
}

/// A child slot holds either a nested bucket node or a metric leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildAgg {
    Bucket(Box<AggregationNode>),
    Metric(MetricDef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketDef {
    DateHistogram(DateHistogramDef),
    Histogram(HistogramDef),
    Terms(TermsDef),
    Filters(FiltersDef),
    GeohashGrid(GeohashGridDef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateHistogramDef {
    pub field: String,
    pub interval: String,
    pub min_doc_count: u64,
    pub extended_bounds: HistogramBounds,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBounds {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramDef {
    pub field: String,
    pub interval: f64,
    pub min_doc_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsDef {
    pub field: String,
    pub size: usize,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub order: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_doc_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersDef {
    pub filters: BTreeMap<String, FilterClause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeohashGridDef {
    pub field: String,
    pub precision: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDef {
    Avg(FieldMetric),
    Sum(FieldMetric),
    Min(FieldMetric),
    Max(FieldMetric),
    ExtendedStats(FieldMetric),
    Cardinality(CardinalityDef),
    Percentiles(PercentilesDef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMetric {
    pub field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardinalityDef {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_threshold: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentilesDef {
    pub field: String,
    pub percents: Vec<f64>,
}
