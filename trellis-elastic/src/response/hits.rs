//! Hit projector: raw-document and raw-data queries bypass the bucket
//! walker and flatten search hits straight into a single frame.

use crate::response::types::HitsSection;
use serde_json::Value;
use std::collections::HashMap;
use trellis::{Field, Frame, Query};

pub struct HitProjector;

impl HitProjector {
    /// One frame, one row per hit in arrival order. Columns are the union
    /// of keys across the stored document body (`_source`) and any
    /// requested script / doc-value fields, in first-encounter order;
    /// documents lacking a column get a null cell.
    pub fn project(query: &Query, hits: &HitsSection) -> Frame {
        let mut names: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<Option<Value>>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row, hit) in hits.hits.iter().enumerate() {
            for (key, value) in hit.source.iter().chain(hit.fields.iter()) {
                let col = *index.entry(key.clone()).or_insert_with(|| {
                    names.push(key.clone());
                    columns.push(vec![None; row]);
                    columns.len() - 1
                });
                let column = &mut columns[col];
                if column.len() == row {
                    column.push(Some(value.clone()));
                } else if let Some(cell) = column.last_mut() {
                    // same key in _source and fields; the requested field wins
                    *cell = Some(value.clone());
                }
            }
            for column in &mut columns {
                if column.len() == row {
                    column.push(None);
                }
            }
        }

        let fields = names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Field::json(name, values))
            .collect();
        Frame::with_fields(query.ref_id.clone(), query.ref_id.clone(), fields)
    }
}
