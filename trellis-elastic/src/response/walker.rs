//! Response walker: recursive depth-first descent over the returned
//! bucket tree.
//!
//! The walker follows the same wire names the builder assigned, so a
//! subtree that cannot be located is a malformed response, while a metric
//! sub-result a backend omitted (zero docs) is just a null cell. Walk
//! mode is decided by the innermost bucket agg: a date-histogram leaf
//! accumulates one series group per outer bucket path, any other leaf
//! accumulates flat table rows.

use crate::error::ElasticError;
use crate::query::builder::resolve_percents;
use crate::query::types::agg_wire_name;
use crate::response::types::{
    BucketList, BucketsData, ExtendedStat, ResponseBucket, SubAggData,
};
use crate::Result;
use std::collections::HashMap;
use trellis::{BucketAgg, BucketAggKind, Metric, MetricKind, Query};

/// One exploded value column for a metric. Percentiles and extended
/// statistics contribute one column per percentile / selected stat.
#[derive(Debug, Clone)]
pub struct MetricColumn {
    pub metric_id: String,
    pub label: String,
    pub hidden: bool,
    pub values: Vec<Option<f64>>,
}

/// Accumulated series for one outer bucket path (date-histogram leaf).
#[derive(Debug, Clone)]
pub struct SeriesGroup {
    /// Ordered (dimension, value) labels from the outer bucket aggs.
    pub path: Vec<(String, String)>,
    pub times: Vec<Option<i64>>,
    pub columns: Vec<MetricColumn>,
}

/// Accumulated table rows: leaf buckets flattened across outer paths.
#[derive(Debug, Clone)]
pub struct TableOutput {
    pub key_columns: Vec<KeyColumn>,
    pub columns: Vec<MetricColumn>,
}

#[derive(Debug, Clone)]
pub struct KeyColumn {
    pub name: String,
    pub values: KeyValues,
}

#[derive(Debug, Clone)]
pub enum KeyValues {
    String(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
}

impl KeyValues {
    fn push_string(&mut self, value: Option<String>) {
        if let KeyValues::String(v) = self {
            v.push(value);
        }
    }

    fn push_number(&mut self, value: Option<f64>) {
        if let KeyValues::Number(v) = self {
            v.push(value);
        }
    }
}

#[derive(Debug)]
pub enum WalkOutput {
    Series(Vec<SeriesGroup>),
    Table(TableOutput),
}

/// Extraction strategy per exploded metric component.
#[derive(Debug, Clone, Copy)]
enum Extractor {
    DocCount,
    Value,
    Percentile(f64),
    Stat(ExtendedStat),
}

struct ComponentPlan<'a> {
    metric: &'a Metric,
    extractor: Extractor,
    label: String,
}

impl ComponentPlan<'_> {
    fn extract(&self, bucket: &ResponseBucket) -> Result<Option<f64>> {
        if let Extractor::DocCount = self.extractor {
            return Ok(Some(bucket.doc_count as f64));
        }
        let data = match bucket.sub.get(&agg_wire_name(&self.metric.id)) {
            // backend omitted the sub-result entirely; a null cell, not a failure
            None => return Ok(None),
            Some(SubAggData::Metric(m)) => m,
            Some(SubAggData::Buckets(_)) => {
                return Err(ElasticError::malformed(format!(
                    "expected metric result under aggregation {}",
                    self.metric.id
                )))
            }
        };
        Ok(match self.extractor {
            Extractor::Value => data.value(),
            Extractor::Percentile(pct) => data.percentile(pct),
            Extractor::Stat(stat) => data.stat(stat),
            Extractor::DocCount => None,
        })
    }
}

pub struct Walker<'a> {
    query: &'a Query,
    buckets: Vec<(&'a BucketAgg, BucketAggKind)>,
    metrics: Vec<(&'a Metric, MetricKind)>,
}

impl<'a> Walker<'a> {
    pub fn new(query: &'a Query) -> Result<Self> {
        let buckets = query
            .bucket_aggs
            .iter()
            .map(|agg| {
                agg.kind()
                    .map(|kind| (agg, kind))
                    .ok_or_else(|| ElasticError::unsupported_agg(&query.ref_id, &agg.agg_type))
            })
            .collect::<Result<Vec<_>>>()?;

        let metrics = query
            .metrics
            .iter()
            .map(|m| {
                m.kind()
                    .map(|kind| (m, kind))
                    .ok_or_else(|| ElasticError::unsupported_agg(&query.ref_id, &m.metric_type))
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .filter(|(_, kind)| !kind.is_raw())
            .collect();

        Ok(Self {
            query,
            buckets,
            metrics,
        })
    }

    pub fn walk(&self, aggs: &HashMap<String, SubAggData>) -> Result<WalkOutput> {
        let plans = self.component_plans();

        if self.buckets.is_empty() {
            return Ok(WalkOutput::Table(self.top_level_table(aggs, &plans)?));
        }

        let leaf_is_time = matches!(
            self.buckets[self.buckets.len() - 1].1,
            BucketAggKind::DateHistogram
        );

        if leaf_is_time {
            let mut groups = Vec::new();
            self.walk_series(aggs, 0, &mut Vec::new(), &plans, &mut groups)?;
            Ok(WalkOutput::Series(groups))
        } else {
            let mut table = self.empty_table(&plans);
            self.walk_table(aggs, 0, &mut Vec::new(), &plans, &mut table)?;
            Ok(WalkOutput::Table(table))
        }
    }

    fn walk_series(
        &self,
        aggs: &HashMap<String, SubAggData>,
        depth: usize,
        path: &mut Vec<(String, String)>,
        plans: &[ComponentPlan],
        out: &mut Vec<SeriesGroup>,
    ) -> Result<()> {
        let (agg, kind) = self.buckets[depth];
        let data = self.bucket_data(aggs, agg)?;

        if depth + 1 == self.buckets.len() {
            let buckets = match &data.buckets {
                BucketList::Ordered(v) => v,
                BucketList::Keyed(_) => {
                    return Err(ElasticError::malformed(format!(
                        "date histogram aggregation {} returned keyed buckets",
                        agg.id
                    )))
                }
            };

            let mut times = Vec::with_capacity(buckets.len());
            let mut columns: Vec<MetricColumn> = plans
                .iter()
                .map(|plan| MetricColumn {
                    metric_id: plan.metric.id.clone(),
                    label: plan.label.clone(),
                    hidden: plan.metric.hide,
                    values: Vec::with_capacity(buckets.len()),
                })
                .collect();

            for bucket in buckets {
                times.push(bucket.key_millis());
                for (plan, column) in plans.iter().zip(columns.iter_mut()) {
                    column.values.push(plan.extract(bucket)?);
                }
            }

            out.push(SeriesGroup {
                path: path.clone(),
                times,
                columns,
            });
            return Ok(());
        }

        let dimension = self.dimension_name(agg, kind);
        for (label, bucket) in self.iter_buckets(agg, kind, data) {
            path.push((dimension.clone(), label));
            self.walk_series(&bucket.sub, depth + 1, path, plans, out)?;
            path.pop();
        }
        Ok(())
    }

    fn walk_table(
        &self,
        aggs: &HashMap<String, SubAggData>,
        depth: usize,
        path: &mut Vec<String>,
        plans: &[ComponentPlan],
        table: &mut TableOutput,
    ) -> Result<()> {
        let (agg, kind) = self.buckets[depth];
        let data = self.bucket_data(aggs, agg)?;

        if depth + 1 == self.buckets.len() {
            let numeric_leaf = matches!(kind, BucketAggKind::Histogram);
            for (label, bucket) in self.iter_buckets(agg, kind, data) {
                for (i, value) in path.iter().enumerate() {
                    table.key_columns[i].values.push_string(Some(value.clone()));
                }
                if let Some(leaf) = table.key_columns.last_mut() {
                    if numeric_leaf {
                        leaf.values.push_number(bucket.key_number());
                    } else {
                        leaf.values.push_string(Some(label));
                    }
                }
                for (plan, column) in plans.iter().zip(table.columns.iter_mut()) {
                    column.values.push(plan.extract(bucket)?);
                }
            }
            return Ok(());
        }

        for (label, bucket) in self.iter_buckets(agg, kind, data) {
            path.push(label);
            self.walk_table(&bucket.sub, depth + 1, path, plans, table)?;
            path.pop();
        }
        Ok(())
    }

    /// Queries with aggregating metrics but no bucket chain: the metric
    /// results sit at the top level and form a single row.
    fn top_level_table(
        &self,
        aggs: &HashMap<String, SubAggData>,
        plans: &[ComponentPlan],
    ) -> Result<TableOutput> {
        let root = ResponseBucket {
            key: None,
            key_as_string: None,
            doc_count: 0,
            sub: aggs.clone(),
        };
        let mut columns = Vec::with_capacity(plans.len());
        for plan in plans {
            columns.push(MetricColumn {
                metric_id: plan.metric.id.clone(),
                label: plan.label.clone(),
                hidden: plan.metric.hide,
                values: vec![plan.extract(&root)?],
            });
        }
        Ok(TableOutput {
            key_columns: Vec::new(),
            columns,
        })
    }

    fn empty_table(&self, plans: &[ComponentPlan]) -> TableOutput {
        let mut key_columns = Vec::with_capacity(self.buckets.len());
        for (i, (agg, kind)) in self.buckets.iter().enumerate() {
            let leaf = i + 1 == self.buckets.len();
            let values = if leaf && matches!(kind, BucketAggKind::Histogram) {
                KeyValues::Number(Vec::new())
            } else {
                KeyValues::String(Vec::new())
            };
            key_columns.push(KeyColumn {
                name: self.dimension_name(agg, *kind),
                values,
            });
        }
        let columns = plans
            .iter()
            .map(|plan| MetricColumn {
                metric_id: plan.metric.id.clone(),
                label: plan.label.clone(),
                hidden: plan.metric.hide,
                values: Vec::new(),
            })
            .collect();
        TableOutput {
            key_columns,
            columns,
        }
    }

    fn bucket_data<'b>(
        &self,
        aggs: &'b HashMap<String, SubAggData>,
        agg: &BucketAgg,
    ) -> Result<&'b BucketsData> {
        let sub = aggs.get(&agg_wire_name(&agg.id)).ok_or_else(|| {
            ElasticError::malformed(format!("missing aggregation {} in response", agg.id))
        })?;
        sub.as_buckets().ok_or_else(|| {
            ElasticError::malformed(format!("expected buckets under aggregation {}", agg.id))
        })
    }

    /// Buckets with their display labels, in deterministic order: arrival
    /// order for ordered lists, the request's filter order for keyed
    /// filters buckets.
    fn iter_buckets<'b>(
        &self,
        agg: &BucketAgg,
        kind: BucketAggKind,
        data: &'b BucketsData,
    ) -> Vec<(String, &'b ResponseBucket)> {
        match &data.buckets {
            BucketList::Ordered(v) => v
                .iter()
                .map(|b| (b.key_text().unwrap_or_default(), b))
                .collect(),
            BucketList::Keyed(map) => {
                if kind == BucketAggKind::Filters {
                    let configured = agg.settings.filters.as_deref().unwrap_or(&[]);
                    configured
                        .iter()
                        .filter_map(|f| {
                            map.get(f.key()).map(|bucket| (f.key().to_string(), bucket))
                        })
                        .collect()
                } else {
                    let mut keys: Vec<&String> = map.keys().collect();
                    keys.sort();
                    keys.into_iter()
                        .map(|k| (k.clone(), &map[k]))
                        .collect()
                }
            }
        }
    }

    fn dimension_name(&self, agg: &BucketAgg, kind: BucketAggKind) -> String {
        match kind {
            BucketAggKind::Filters => "filter".to_string(),
            BucketAggKind::DateHistogram => agg
                .field
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| self.query.time_field.clone()),
            _ => agg
                .field
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| agg.agg_type.clone()),
        }
    }

    /// Explode metrics into extraction plans: one per metric for simple
    /// kinds, one per percentile / selected stat for exploding kinds.
    fn component_plans(&self) -> Vec<ComponentPlan<'a>> {
        let mut plans = Vec::new();
        for &(metric, kind) in &self.metrics {
            let field = metric.field_or_empty();
            match kind {
                MetricKind::Count => plans.push(ComponentPlan {
                    metric,
                    extractor: Extractor::DocCount,
                    label: "Count".to_string(),
                }),
                MetricKind::Percentiles => {
                    for pct in resolve_percents(metric) {
                        plans.push(ComponentPlan {
                            metric,
                            extractor: Extractor::Percentile(pct),
                            label: compose_label(&format!("p{}", format_percent(pct)), field),
                        });
                    }
                }
                MetricKind::ExtendedStats => {
                    for stat in ExtendedStat::selected(&metric.meta) {
                        plans.push(ComponentPlan {
                            metric,
                            extractor: Extractor::Stat(stat),
                            label: compose_label(stat.label(), field),
                        });
                    }
                }
                MetricKind::Avg
                | MetricKind::Sum
                | MetricKind::Min
                | MetricKind::Max
                | MetricKind::Cardinality => plans.push(ComponentPlan {
                    metric,
                    extractor: Extractor::Value,
                    label: compose_label(kind.label(), field),
                }),
                MetricKind::RawData | MetricKind::RawDocument => {}
            }
        }
        plans
    }
}

fn compose_label(base: &str, field: &str) -> String {
    if field.is_empty() {
        base.to_string()
    } else {
        format!("{base} {field}")
    }
}

pub(crate) fn format_percent(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{pct}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query_from(value: serde_json::Value) -> Query {
        serde_json::from_value(value).unwrap()
    }

    fn aggs_from(value: serde_json::Value) -> HashMap<String, SubAggData> {
        serde_json::from_value(value).unwrap()
    }

    fn walk(query: serde_json::Value, aggs: serde_json::Value) -> Result<WalkOutput> {
        let query = query_from(query);
        let walker = Walker::new(&query)?;
        walker.walk(&aggs_from(aggs))
    }

    // ===================================================================
    // Series mode
    // ===================================================================

    #[test]
    fn test_count_series() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [{ "type": "date_histogram", "field": "@timestamp", "id": "2" }]
            }),
            json!({
                "2": {
                    "buckets": [
                        { "doc_count": 10, "key": 1000 },
                        { "doc_count": 15, "key": 2000 }
                    ]
                }
            }),
        )
        .unwrap();

        let groups = match output {
            WalkOutput::Series(g) => g,
            _ => panic!("expected series output"),
        };
        assert_eq!(groups.len(), 1);
        assert!(groups[0].path.is_empty());
        assert_eq!(groups[0].times, vec![Some(1000), Some(2000)]);
        assert_eq!(groups[0].columns.len(), 1);
        assert_eq!(groups[0].columns[0].label, "Count");
        assert_eq!(groups[0].columns[0].values, vec![Some(10.0), Some(15.0)]);
    }

    #[test]
    fn test_count_and_avg_columns_stay_aligned() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [
                    { "type": "count", "id": "1" },
                    { "type": "avg", "field": "value", "id": "2" }
                ],
                "bucketAggs": [{ "type": "date_histogram", "field": "@timestamp", "id": "3" }]
            }),
            json!({
                "3": {
                    "buckets": [
                        { "2": { "value": 88 }, "doc_count": 10, "key": 1000 },
                        { "2": { "value": 99 }, "doc_count": 15, "key": 2000 }
                    ]
                }
            }),
        )
        .unwrap();

        let groups = match output {
            WalkOutput::Series(g) => g,
            _ => panic!("expected series output"),
        };
        assert_eq!(groups[0].columns.len(), 2);
        assert_eq!(groups[0].columns[0].values, vec![Some(10.0), Some(15.0)]);
        assert_eq!(groups[0].columns[1].label, "Average value");
        assert_eq!(groups[0].columns[1].values, vec![Some(88.0), Some(99.0)]);
    }

    #[test]
    fn test_terms_path_produces_group_per_term() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [
                    { "type": "terms", "field": "host", "id": "2" },
                    { "type": "date_histogram", "id": "3" }
                ]
            }),
            json!({
                "2": {
                    "buckets": [
                        {
                            "key": "server1",
                            "doc_count": 10,
                            "3": { "buckets": [{ "doc_count": 10, "key": 1000 }] }
                        },
                        {
                            "key": "server2",
                            "doc_count": 12,
                            "3": { "buckets": [{ "doc_count": 12, "key": 1000 }] }
                        }
                    ]
                }
            }),
        )
        .unwrap();

        let groups = match output {
            WalkOutput::Series(g) => g,
            _ => panic!("expected series output"),
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0].path,
            vec![("host".to_string(), "server1".to_string())]
        );
        assert_eq!(
            groups[1].path,
            vec![("host".to_string(), "server2".to_string())]
        );
    }

    #[test]
    fn test_percentiles_explode_into_columns() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [
                    { "type": "percentiles", "field": "latency",
                      "settings": { "percents": ["75", "90"] }, "id": "p_1" }
                ],
                "bucketAggs": [{ "type": "date_histogram", "id": "p_3" }]
            }),
            json!({
                "p_3": {
                    "buckets": [
                        { "p_1": { "values": { "75": 3.3, "90": 5.5 } }, "doc_count": 10, "key": 1000 },
                        { "p_1": { "values": { "75": 2.3, "90": 4.5 } }, "doc_count": 15, "key": 2000 }
                    ]
                }
            }),
        )
        .unwrap();

        let groups = match output {
            WalkOutput::Series(g) => g,
            _ => panic!("expected series output"),
        };
        assert_eq!(groups[0].columns.len(), 2);
        assert_eq!(groups[0].columns[0].label, "p75 latency");
        assert_eq!(groups[0].columns[0].values, vec![Some(3.3), Some(2.3)]);
        assert_eq!(groups[0].columns[1].label, "p90 latency");
        assert_eq!(groups[0].columns[1].values, vec![Some(5.5), Some(4.5)]);
    }

    #[test]
    fn test_missing_metric_sub_result_is_null() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "avg", "field": "value", "id": "2" }],
                "bucketAggs": [{ "type": "date_histogram", "id": "3" }]
            }),
            json!({
                "3": {
                    "buckets": [
                        { "2": { "value": 88 }, "doc_count": 10, "key": 1000 },
                        { "doc_count": 0, "key": 2000 }
                    ]
                }
            }),
        )
        .unwrap();

        let groups = match output {
            WalkOutput::Series(g) => g,
            _ => panic!("expected series output"),
        };
        assert_eq!(groups[0].columns[0].values, vec![Some(88.0), None]);
    }

    #[test]
    fn test_empty_bucket_list_yields_no_rows() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [{ "type": "date_histogram", "id": "2" }]
            }),
            json!({ "2": { "buckets": [] } }),
        )
        .unwrap();
        let groups = match output {
            WalkOutput::Series(g) => g,
            _ => panic!("expected series output"),
        };
        assert_eq!(groups.len(), 1);
        assert!(groups[0].times.is_empty());
    }

    // ===================================================================
    // Malformed responses
    // ===================================================================

    #[test]
    fn test_missing_bucket_subtree_is_malformed() {
        let err = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [{ "type": "date_histogram", "id": "2" }]
            }),
            json!({ "9": { "buckets": [] } }),
        )
        .unwrap_err();
        assert!(matches!(err, ElasticError::MalformedResponse(_)));
    }

    #[test]
    fn test_metric_result_where_buckets_expected_is_malformed() {
        let err = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [{ "type": "date_histogram", "id": "2" }]
            }),
            json!({ "2": { "value": 3.0 } }),
        )
        .unwrap_err();
        assert!(matches!(err, ElasticError::MalformedResponse(_)));
    }

    // ===================================================================
    // Table mode
    // ===================================================================

    #[test]
    fn test_histogram_leaf_builds_table() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [{ "type": "histogram", "field": "bytes", "id": "2" }]
            }),
            json!({
                "2": {
                    "buckets": [
                        { "doc_count": 1, "key": 1000 },
                        { "doc_count": 3, "key": 2000 }
                    ]
                }
            }),
        )
        .unwrap();

        let table = match output {
            WalkOutput::Table(t) => t,
            _ => panic!("expected table output"),
        };
        assert_eq!(table.key_columns.len(), 1);
        assert_eq!(table.key_columns[0].name, "bytes");
        match &table.key_columns[0].values {
            KeyValues::Number(v) => assert_eq!(v, &vec![Some(1000.0), Some(2000.0)]),
            _ => panic!("expected numeric leaf column"),
        }
        assert_eq!(table.columns[0].values, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_terms_leaf_builds_string_table() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [
                    { "type": "count", "id": "1" },
                    { "type": "avg", "field": "value", "id": "2" }
                ],
                "bucketAggs": [{ "type": "terms", "field": "host", "id": "3" }]
            }),
            json!({
                "3": {
                    "buckets": [
                        { "key": "a", "doc_count": 4, "2": { "value": 1.5 } },
                        { "key": "b", "doc_count": 6, "2": { "value": 2.5 } }
                    ]
                }
            }),
        )
        .unwrap();

        let table = match output {
            WalkOutput::Table(t) => t,
            _ => panic!("expected table output"),
        };
        match &table.key_columns[0].values {
            KeyValues::String(v) => {
                assert_eq!(v, &vec![Some("a".to_string()), Some("b".to_string())])
            }
            _ => panic!("expected string leaf column"),
        }
        assert_eq!(table.columns[0].values, vec![Some(4.0), Some(6.0)]);
        assert_eq!(table.columns[1].values, vec![Some(1.5), Some(2.5)]);
    }

    #[test]
    fn test_keyed_filters_follow_request_order() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [
                    { "type": "filters", "id": "2", "settings": {
                        "filters": [
                            { "query": "status:500", "label": "errors" },
                            { "query": "status:200", "label": "ok" }
                        ]
                    } }
                ]
            }),
            json!({
                "2": {
                    "buckets": {
                        "ok": { "doc_count": 20 },
                        "errors": { "doc_count": 3 }
                    }
                }
            }),
        )
        .unwrap();

        let table = match output {
            WalkOutput::Table(t) => t,
            _ => panic!("expected table output"),
        };
        assert_eq!(table.key_columns[0].name, "filter");
        match &table.key_columns[0].values {
            KeyValues::String(v) => assert_eq!(
                v,
                &vec![Some("errors".to_string()), Some("ok".to_string())]
            ),
            _ => panic!("expected string leaf column"),
        }
        assert_eq!(table.columns[0].values, vec![Some(3.0), Some(20.0)]);
    }

    #[test]
    fn test_metrics_without_buckets_form_single_row() {
        let output = walk(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [{ "type": "max", "field": "value", "id": "1" }],
                "bucketAggs": []
            }),
            json!({ "1": { "value": 42.5 } }),
        )
        .unwrap();

        let table = match output {
            WalkOutput::Table(t) => t,
            _ => panic!("expected table output"),
        };
        assert!(table.key_columns.is_empty());
        assert_eq!(table.columns[0].label, "Max value");
        assert_eq!(table.columns[0].values, vec![Some(42.5)]);
    }

    // ===================================================================
    // Percent formatting
    // ===================================================================

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(75.0), "75");
        assert_eq!(format_percent(99.9), "99.9");
    }
}
