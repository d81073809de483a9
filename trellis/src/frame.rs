//! Column-oriented data frames.
//!
//! A frame is an ordered sequence of named, typed columns of equal length,
//! tagged with the producing query's ref-id. Cells are nullable: a bucket
//! with no metric sub-result becomes `None`, not a parse failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame fields have differing lengths ({0} vs {1})")]
    MisalignedFields(usize, usize),
}

/// Column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Time,
    Number,
    String,
    Json,
}

/// Typed column storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum FieldValues {
    Time(Vec<Option<DateTime<Utc>>>),
    Number(Vec<Option<f64>>),
    String(Vec<Option<String>>),
    Json(Vec<Option<Value>>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(v) => v.len(),
            FieldValues::Number(v) => v.len(),
            FieldValues::String(v) => v.len(),
            FieldValues::Json(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValues::Time(_) => FieldKind::Time,
            FieldValues::Number(_) => FieldKind::Number,
            FieldValues::String(_) => FieldKind::String,
            FieldValues::Json(_) => FieldKind::Json,
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub values: FieldValues,
}

impl Field {
    pub fn time(name: impl Into<String>, values: Vec<Option<DateTime<Utc>>>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Time(values),
        }
    }

    pub fn number(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Number(values),
        }
    }

    pub fn string(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::String(values),
        }
    }

    pub fn json(name: impl Into<String>, values: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Json(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn kind(&self) -> FieldKind {
        self.values.kind()
    }
}

/// A flat result table. Multiple frames may share a ref-id (one per
/// metric, percentile or extended statistic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Human-readable name, e.g. `"server1 Max bytes"`.
    pub name: String,
    /// Ref-id of the query that produced this frame.
    pub ref_id: String,
    pub fields: Vec<Field>,
}

impl Frame {
    pub fn new(name: impl Into<String>, ref_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ref_id: ref_id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(
        name: impl Into<String>,
        ref_id: impl Into<String>,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            name: name.into(),
            ref_id: ref_id.into(),
            fields,
        }
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Row count, or an error when columns are misaligned. An empty frame
    /// has zero rows.
    pub fn row_len(&self) -> Result<usize, FrameError> {
        let mut rows = None;
        for field in &self.fields {
            match rows {
                None => rows = Some(field.len()),
                Some(n) if n != field.len() => {
                    return Err(FrameError::MisalignedFields(n, field.len()))
                }
                Some(_) => {}
            }
        }
        Ok(rows.unwrap_or(0))
    }

    /// First field of the given kind, if any.
    pub fn field_by_kind(&self, kind: FieldKind) -> Option<&Field> {
        self.fields.iter().find(|f| f.kind() == kind)
    }
}
