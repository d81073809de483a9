//! Frame assembler: pivots walker output into flat frames.
//!
//! Series mode emits one frame per (outer bucket path x exploded metric
//! component); table mode emits exactly one frame per query. Row order is
//! the walker's traversal order, which is bucket arrival order.

use crate::response::walker::{KeyValues, SeriesGroup, TableOutput, WalkOutput};
use chrono::{DateTime, Utc};
use trellis::{Field, Frame, Query};

pub struct FrameAssembler;

impl FrameAssembler {
    /// Pivot walked values into the query's frames, tagged with its
    /// ref-id. Hidden metrics are dropped here, after their rows were
    /// walked, so sibling columns stay aligned.
    pub fn assemble(query: &Query, output: WalkOutput) -> Vec<Frame> {
        match output {
            WalkOutput::Series(groups) => Self::series_frames(query, groups),
            WalkOutput::Table(table) => vec![Self::table_frame(query, table)],
        }
    }

    fn series_frames(query: &Query, groups: Vec<SeriesGroup>) -> Vec<Frame> {
        let mut frames = Vec::new();
        for group in groups {
            let times: Vec<Option<DateTime<Utc>>> = group
                .times
                .iter()
                .map(|t| t.and_then(DateTime::from_timestamp_millis))
                .collect();
            for column in group.columns {
                if column.hidden {
                    continue;
                }
                let name = Self::series_name(&group.path, &column.label);
                frames.push(Frame::with_fields(
                    name,
                    query.ref_id.clone(),
                    vec![
                        Field::time("Time", times.clone()),
                        Field::number("Value", column.values),
                    ],
                ));
            }
        }
        frames
    }

    /// `"<outer labels> <metric label>"`, the metric label alone for an
    /// unsegmented query.
    fn series_name(path: &[(String, String)], label: &str) -> String {
        if path.is_empty() {
            return label.to_string();
        }
        let mut parts: Vec<&str> = path.iter().map(|(_, value)| value.as_str()).collect();
        parts.push(label);
        parts.join(" ")
    }

    fn table_frame(query: &Query, table: TableOutput) -> Frame {
        let mut fields = Vec::new();
        for key in table.key_columns {
            fields.push(match key.values {
                KeyValues::String(values) => Field::string(key.name, values),
                KeyValues::Number(values) => Field::number(key.name, values),
            });
        }
        for column in table.columns {
            if column.hidden {
                continue;
            }
            fields.push(Field::number(column.label, column.values));
        }
        Frame::with_fields(query.ref_id.clone(), query.ref_id.clone(), fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::walker::Walker;
    use chrono::TimeZone;
    use serde_json::json;
    use trellis::{FieldKind, FieldValues};

    fn assemble(query: serde_json::Value, aggs: serde_json::Value) -> Vec<Frame> {
        let query: Query = serde_json::from_value(query).unwrap();
        let walker = Walker::new(&query).unwrap();
        let output = walker.walk(&serde_json::from_value(aggs).unwrap()).unwrap();
        FrameAssembler::assemble(&query, output)
    }

    fn number_values(frame: &Frame) -> &Vec<Option<f64>> {
        match &frame.field_by_kind(FieldKind::Number).unwrap().values {
            FieldValues::Number(v) => v,
            _ => panic!("expected number column"),
        }
    }

    // ===================================================================
    // Series frames
    // ===================================================================

    #[test]
    fn test_count_yields_one_frame_two_rows() {
        let frames = assemble(
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
        );
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.name, "Count");
        assert_eq!(frame.ref_id, "A");
        assert_eq!(frame.row_len(), Ok(2));

        match &frame.field_by_kind(FieldKind::Time).unwrap().values {
            FieldValues::Time(times) => {
                assert_eq!(times[0], Some(Utc.timestamp_millis_opt(1000).unwrap()));
                assert_eq!(times[1], Some(Utc.timestamp_millis_opt(2000).unwrap()));
            }
            _ => panic!("expected time column"),
        }
        assert_eq!(number_values(frame), &vec![Some(10.0), Some(15.0)]);
    }

    #[test]
    fn test_count_and_avg_yield_two_frames() {
        let frames = assemble(
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
        );
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].name, "Count");
        assert_eq!(frames[1].name, "Average value");
        assert_eq!(frames[0].row_len(), Ok(2));
        assert_eq!(frames[1].row_len(), Ok(2));
        assert_eq!(number_values(&frames[0]), &vec![Some(10.0), Some(15.0)]);
        assert_eq!(number_values(&frames[1]), &vec![Some(88.0), Some(99.0)]);
    }

    #[test]
    fn test_percentiles_yield_one_frame_per_percentile() {
        let frames = assemble(
            json!({
                "refId": "P",
                "timeField": "t",
                "metrics": [
                    { "type": "percentiles", "settings": { "percents": ["75", "90"] }, "id": "p_1" }
                ],
                "bucketAggs": [{ "type": "date_histogram", "field": "@timestamp", "id": "p_3" }]
            }),
            json!({
                "p_3": {
                    "buckets": [
                        { "p_1": { "values": { "75": 3.3, "90": 5.5 } }, "doc_count": 10, "key": 1000 },
                        { "p_1": { "values": { "75": 2.3, "90": 4.5 } }, "doc_count": 15, "key": 2000 }
                    ]
                }
            }),
        );
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].name, "p75");
        assert_eq!(frames[1].name, "p90");
        assert_eq!(frames[0].row_len(), Ok(2));
        assert_eq!(frames[1].row_len(), Ok(2));
        assert_eq!(number_values(&frames[0]), &vec![Some(3.3), Some(2.3)]);
        assert_eq!(number_values(&frames[1]), &vec![Some(5.5), Some(4.5)]);
    }

    #[test]
    fn test_extended_stats_explode_per_series_and_stat() {
        let frames = assemble(
            json!({
                "refId": "E",
                "timeField": "t",
                "metrics": [
                    { "type": "extended_stats",
                      "meta": { "max": true, "std_deviation_bounds_upper": true },
                      "id": "e_1" }
                ],
                "bucketAggs": [
                    { "type": "terms", "field": "host", "id": "e_3" },
                    { "type": "date_histogram", "id": "e_4" }
                ]
            }),
            json!({
                "e_3": {
                    "buckets": [
                        {
                            "key": "server1",
                            "doc_count": 10,
                            "e_4": {
                                "buckets": [
                                    { "e_1": { "max": 10.2, "min": 5.5,
                                               "std_deviation_bounds": { "upper": 3, "lower": -2 } },
                                      "doc_count": 10, "key": 1000 }
                                ]
                            }
                        },
                        {
                            "key": "server2",
                            "doc_count": 10,
                            "e_4": {
                                "buckets": [
                                    { "e_1": { "max": 10.2, "min": 5.5,
                                               "std_deviation_bounds": { "upper": 3, "lower": -2 } },
                                      "doc_count": 10, "key": 1000 }
                                ]
                            }
                        }
                    ]
                }
            }),
        );
        assert_eq!(frames.len(), 4);
        let names: Vec<&str> = frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "server1 Max",
                "server1 Std Dev Upper",
                "server2 Max",
                "server2 Std Dev Upper"
            ]
        );
        assert_eq!(number_values(&frames[0]), &vec![Some(10.2)]);
        assert_eq!(number_values(&frames[1]), &vec![Some(3.0)]);
    }

    #[test]
    fn test_hidden_metric_produces_no_frame() {
        let frames = assemble(
            json!({
                "refId": "A",
                "timeField": "t",
                "metrics": [
                    { "type": "count", "id": "1", "hide": true },
                    { "type": "avg", "field": "value", "id": "2" }
                ],
                "bucketAggs": [{ "type": "date_histogram", "id": "3" }]
            }),
            json!({
                "3": {
                    "buckets": [
                        { "2": { "value": 88 }, "doc_count": 10, "key": 1000 }
                    ]
                }
            }),
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name, "Average value");
    }

    // ===================================================================
    // Table frames
    // ===================================================================

    #[test]
    fn test_histogram_leaf_yields_one_table_frame() {
        let frames = assemble(
            json!({
                "refId": "H",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "h_3" }],
                "bucketAggs": [{ "type": "histogram", "field": "bytes", "id": "h_4" }]
            }),
            json!({
                "h_4": { "buckets": [{ "doc_count": 1, "key": 1000 }] }
            }),
        );
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.ref_id, "H");
        assert_eq!(frame.fields.len(), 2);
        assert_eq!(frame.fields[0].name, "bytes");
        assert_eq!(frame.fields[1].name, "Count");
        assert_eq!(frame.row_len(), Ok(1));
    }

    #[test]
    fn test_terms_table_includes_outer_dimension_columns() {
        let frames = assemble(
            json!({
                "refId": "T",
                "timeField": "t",
                "metrics": [{ "type": "count", "id": "1" }],
                "bucketAggs": [
                    { "type": "terms", "field": "datacenter", "id": "2" },
                    { "type": "terms", "field": "host", "id": "3" }
                ]
            }),
            json!({
                "2": {
                    "buckets": [
                        {
                            "key": "eu",
                            "doc_count": 3,
                            "3": { "buckets": [
                                { "key": "a", "doc_count": 1 },
                                { "key": "b", "doc_count": 2 }
                            ] }
                        },
                        {
                            "key": "us",
                            "doc_count": 4,
                            "3": { "buckets": [{ "key": "c", "doc_count": 4 }] }
                        }
                    ]
                }
            }),
        );
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.fields[0].name, "datacenter");
        assert_eq!(frame.fields[1].name, "host");
        assert_eq!(frame.row_len(), Ok(3));
        match &frame.fields[0].values {
            FieldValues::String(v) => assert_eq!(
                v,
                &vec![
                    Some("eu".to_string()),
                    Some("eu".to_string()),
                    Some("us".to_string())
                ]
            ),
            _ => panic!("expected string column"),
        }
        assert_eq!(number_values(frame), &vec![Some(1.0), Some(2.0), Some(4.0)]);
    }
}
