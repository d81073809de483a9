//! Aggregation tree builder: one logical query becomes one header/body
//! pair.
//!
//! The bucket-agg chain is folded right-to-left, each aggregation wrapped
//! in the previous one's sub-aggregation slot, with all metric leaves
//! attached at the innermost level. Raw-document and raw-data queries
//! skip tree construction and emit a plain size+sort query instead.

use crate::error::ElasticError;
use crate::query::types::{
    agg_wire_name, sort_desc, AggregationNode, BoolFilter, BucketDef, CardinalityDef, ChildAgg,
    CompiledQuery, DateHistogramDef, FieldMetric, FilterClause, FiltersDef, GeohashGridDef,
    HistogramBounds, HistogramDef, IndexSpec, MetricDef, PercentilesDef, SearchBody,
    SearchHeader, TermsDef, WireQuery,
};
use crate::Result;
use std::collections::BTreeMap;
use tracing::debug;
use trellis::{BucketAgg, BucketAggKind, Metric, MetricKind, Query, StringOrNumber};

/// Percentile list applied when a percentiles metric carries none.
pub(crate) const DEFAULT_PERCENTS: [f64; 5] = [25.0, 50.0, 75.0, 95.0, 99.0];

const DEFAULT_RAW_SIZE: usize = 500;
const DEFAULT_TERMS_SIZE: u64 = 500;
const DEFAULT_HISTOGRAM_INTERVAL: f64 = 1000.0;
const DEFAULT_GEOHASH_PRECISION: u32 = 3;

/// Percentile list for a metric, normalized to numbers.
pub(crate) fn resolve_percents(metric: &Metric) -> Vec<f64> {
    let configured: Vec<f64> = metric
        .settings
        .percents
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(StringOrNumber::as_f64)
        .collect();
    if configured.is_empty() {
        DEFAULT_PERCENTS.to_vec()
    } else {
        configured
    }
}

/// Compiles logical queries into the backend's request format.
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compile one logical query against the given index target.
    pub fn compile(query: &Query, index: IndexSpec) -> Result<CompiledQuery> {
        let metrics = Self::resolve_metrics(query)?;
        let buckets = Self::resolve_buckets(query)?;

        let body = match metrics.iter().find(|(_, kind)| kind.is_raw()) {
            Some((metric, kind)) => Self::raw_body(query, metric, *kind),
            None => Self::aggregation_body(query, &metrics, &buckets)?,
        };

        debug!(ref_id = %query.ref_id, "compiled query");
        Ok(CompiledQuery {
            ref_id: query.ref_id.clone(),
            header: SearchHeader::new(index),
            body,
        })
    }

    fn resolve_metrics<'a>(query: &'a Query) -> Result<Vec<(&'a Metric, MetricKind)>> {
        query
            .metrics
            .iter()
            .map(|m| {
                m.kind()
                    .map(|kind| (m, kind))
                    .ok_or_else(|| ElasticError::unsupported_agg(&query.ref_id, &m.metric_type))
            })
            .collect()
    }

    fn resolve_buckets<'a>(query: &'a Query) -> Result<Vec<(&'a BucketAgg, BucketAggKind)>> {
        query
            .bucket_aggs
            .iter()
            .map(|agg| {
                agg.kind()
                    .map(|kind| (agg, kind))
                    .ok_or_else(|| ElasticError::unsupported_agg(&query.ref_id, &agg.agg_type))
            })
            .collect()
    }

    /// Time filter plus optional lucene clause, shared by every body kind.
    fn base_query(query: &Query) -> WireQuery {
        let mut filter = vec![FilterClause::time_range(&query.time_field, &query.time_range)];
        if let Some(lucene) = query.query.as_deref() {
            if !lucene.is_empty() {
                filter.push(FilterClause::lucene(lucene));
            }
        }
        WireQuery {
            bool_clause: BoolFilter { filter },
        }
    }

    fn raw_body(query: &Query, metric: &Metric, kind: MetricKind) -> SearchBody {
        let size = metric
            .settings
            .size
            .as_ref()
            .and_then(StringOrNumber::as_u64)
            .unwrap_or(DEFAULT_RAW_SIZE as u64) as usize;

        SearchBody {
            size: Some(size),
            query: Some(Self::base_query(query)),
            sort: Some(vec![
                sort_desc(&query.time_field, Some("boolean")),
                sort_desc("_doc", None),
            ]),
            script_fields: matches!(kind, MetricKind::RawDocument).then(BTreeMap::new),
            aggs: None,
        }
    }

    fn aggregation_body(
        query: &Query,
        metrics: &[(&Metric, MetricKind)],
        buckets: &[(&BucketAgg, BucketAggKind)],
    ) -> Result<SearchBody> {
        let mut children: BTreeMap<String, ChildAgg> = BTreeMap::new();
        for (metric, kind) in metrics {
            if let Some(def) = Self::metric_def(metric, *kind) {
                children.insert(agg_wire_name(&metric.id), ChildAgg::Metric(def));
            }
        }

        for (agg, kind) in buckets.iter().rev() {
            let bucket = Self::bucket_def(query, agg, *kind, metrics, &mut children)?;
            let node = AggregationNode {
                bucket,
                aggs: std::mem::take(&mut children),
            };
            children.insert(agg_wire_name(&agg.id), ChildAgg::Bucket(Box::new(node)));
        }

        Ok(SearchBody {
            size: Some(0),
            query: Some(Self::base_query(query)),
            sort: None,
            script_fields: None,
            aggs: (!children.is_empty()).then_some(children),
        })
    }

    fn bucket_def(
        query: &Query,
        agg: &BucketAgg,
        kind: BucketAggKind,
        metrics: &[(&Metric, MetricKind)],
        children: &mut BTreeMap<String, ChildAgg>,
    ) -> Result<BucketDef> {
        let settings = &agg.settings;
        match kind {
            BucketAggKind::DateHistogram => Ok(BucketDef::DateHistogram(DateHistogramDef {
                // the time field is the natural default here
                field: agg
                    .field
                    .clone()
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| query.time_field.clone()),
                interval: Self::date_interval(query, agg),
                min_doc_count: settings
                    .min_doc_count
                    .as_ref()
                    .and_then(StringOrNumber::as_u64)
                    .unwrap_or(0),
                extended_bounds: HistogramBounds {
                    min: query.time_range.from,
                    max: query.time_range.to,
                },
                format: "epoch_millis".to_string(),
            })),

            BucketAggKind::Histogram => Ok(BucketDef::Histogram(HistogramDef {
                field: Self::require_field(query, agg)?,
                interval: settings
                    .interval
                    .as_ref()
                    .and_then(StringOrNumber::as_f64)
                    .unwrap_or(DEFAULT_HISTOGRAM_INTERVAL),
                min_doc_count: settings
                    .min_doc_count
                    .as_ref()
                    .and_then(StringOrNumber::as_u64)
                    .unwrap_or(0),
            })),

            BucketAggKind::Terms => {
                let field = Self::require_field(query, agg)?;
                let size = match settings.size.as_ref().and_then(StringOrNumber::as_u64) {
                    Some(0) | None => DEFAULT_TERMS_SIZE,
                    Some(n) => n,
                } as usize;

                let mut order = BTreeMap::new();
                if let Some(order_by) = settings.order_by.as_deref() {
                    let direction = settings
                        .order
                        .clone()
                        .unwrap_or_else(|| "desc".to_string());
                    let target = Self::order_target(query, order_by, metrics, children)?;
                    order.insert(target, direction);
                }

                Ok(BucketDef::Terms(TermsDef {
                    field,
                    size,
                    order,
                    min_doc_count: settings
                        .min_doc_count
                        .as_ref()
                        .and_then(StringOrNumber::as_u64),
                }))
            }

            BucketAggKind::Filters => {
                let entries = settings
                    .filters
                    .as_deref()
                    .filter(|f| !f.is_empty())
                    .ok_or_else(|| {
                        ElasticError::invalid_query(
                            &query.ref_id,
                            "filters aggregation requires at least one filter",
                        )
                    })?;
                let mut filters = BTreeMap::new();
                for entry in entries {
                    filters.insert(entry.key().to_string(), FilterClause::lucene(&entry.query));
                }
                Ok(BucketDef::Filters(FiltersDef { filters }))
            }

            BucketAggKind::GeohashGrid => Ok(BucketDef::GeohashGrid(GeohashGridDef {
                field: Self::require_field(query, agg)?,
                precision: settings
                    .precision
                    .as_ref()
                    .and_then(StringOrNumber::as_u64)
                    .unwrap_or(DEFAULT_GEOHASH_PRECISION as u64) as u32,
            })),
        }
    }

    /// Resolve a terms `orderBy` to its wire order target. Ordering by a
    /// metric id requires that metric as a direct sub-aggregation of the
    /// terms node, so it is attached here when not already present.
    fn order_target(
        query: &Query,
        order_by: &str,
        metrics: &[(&Metric, MetricKind)],
        children: &mut BTreeMap<String, ChildAgg>,
    ) -> Result<String> {
        match order_by {
            "_term" | "_key" => return Ok("_key".to_string()),
            "_count" => return Ok("_count".to_string()),
            _ => {}
        }
        match metrics.iter().find(|(m, _)| m.id == order_by) {
            Some((_, MetricKind::Count)) => Ok("_count".to_string()),
            Some((metric, kind)) if kind.has_wire_agg() => {
                if let Some(def) = Self::metric_def(metric, *kind) {
                    children
                        .entry(agg_wire_name(&metric.id))
                        .or_insert(ChildAgg::Metric(def));
                }
                Ok(order_by.to_string())
            }
            _ => Err(ElasticError::invalid_query(
                &query.ref_id,
                format!("orderBy references unknown metric id: {order_by}"),
            )),
        }
    }

    /// Wire aggregation for a metric; count and raw kinds emit none.
    fn metric_def(metric: &Metric, kind: MetricKind) -> Option<MetricDef> {
        let field = metric.field_or_empty().to_string();
        Some(match kind {
            MetricKind::Avg => MetricDef::Avg(FieldMetric { field }),
            MetricKind::Sum => MetricDef::Sum(FieldMetric { field }),
            MetricKind::Min => MetricDef::Min(FieldMetric { field }),
            MetricKind::Max => MetricDef::Max(FieldMetric { field }),
            MetricKind::ExtendedStats => MetricDef::ExtendedStats(FieldMetric { field }),
            MetricKind::Cardinality => MetricDef::Cardinality(CardinalityDef {
                field,
                precision_threshold: metric
                    .settings
                    .precision_threshold
                    .as_ref()
                    .and_then(StringOrNumber::as_u64),
            }),
            MetricKind::Percentiles => MetricDef::Percentiles(PercentilesDef {
                field,
                percents: resolve_percents(metric),
            }),
            MetricKind::Count | MetricKind::RawData | MetricKind::RawDocument => return None,
        })
    }

    fn date_interval(query: &Query, agg: &BucketAgg) -> String {
        if let Some(interval) = &agg.settings.interval {
            let text = interval.to_text();
            if !text.is_empty() && text != "auto" {
                return text;
            }
        }
        match query.interval_ms {
            Some(ms) if ms > 0 => format!("{ms}ms"),
            _ => "1m".to_string(),
        }
    }

    fn require_field(query: &Query, agg: &BucketAgg) -> Result<String> {
        agg.field
            .clone()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                ElasticError::invalid_query(
                    &query.ref_id,
                    format!("{} aggregation requires a field", agg.agg_type),
                )
            })
    }
}
