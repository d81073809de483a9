//! Wire-level response types from the search backend.
//!
//! The aggregation reply is a recursive heterogeneous tree: every named
//! slot under a bucket holds either a nested bucket list or a metric
//! result. [`SubAggData`] keeps that distinction as a tagged variant so
//! the walker's recursion is checked instead of probing dynamic fields.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Top-level multi-search reply, positionally aligned with the submitted
/// queries.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiSearchResponse {
    #[serde(default)]
    pub responses: Vec<ResponseEntry>,
}

/// One entry of the reply: a search result or a per-query error object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseEntry {
    Failure(FailureEntry),
    Search(SearchResponse),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailureEntry {
    pub error: BackendError,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Error payload; older backends report a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BackendError {
    Message(String),
    Detail {
        #[serde(rename = "type", default)]
        error_type: Option<String>,
        #[serde(default)]
        reason: Option<String>,
    },
}

impl BackendError {
    pub fn error_type(&self) -> &str {
        match self {
            BackendError::Message(_) => "unknown",
            BackendError::Detail { error_type, .. } => {
                error_type.as_deref().unwrap_or("unknown")
            }
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            BackendError::Message(msg) => msg,
            BackendError::Detail { reason, .. } => reason.as_deref().unwrap_or("unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub aggregations: Option<HashMap<String, SubAggData>>,
    #[serde(default)]
    pub hits: Option<HitsSection>,
}

/// A sub-aggregation slot: nested buckets or a metric result.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubAggData {
    Buckets(BucketsData),
    Metric(MetricData),
}

impl SubAggData {
    pub fn as_buckets(&self) -> Option<&BucketsData> {
        match self {
            SubAggData::Buckets(b) => Some(b),
            SubAggData::Metric(_) => None,
        }
    }

    pub fn as_metric(&self) -> Option<&MetricData> {
        match self {
            SubAggData::Metric(m) => Some(m),
            SubAggData::Buckets(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketsData {
    pub buckets: BucketList,
}

/// Bucket lists arrive ordered (histograms, terms) or keyed by label
/// (filters).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BucketList {
    Ordered(Vec<ResponseBucket>),
    Keyed(HashMap<String, ResponseBucket>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBucket {
    #[serde(default)]
    pub key: Option<Value>,

    #[serde(default)]
    pub key_as_string: Option<String>,

    #[serde(default)]
    pub doc_count: u64,

    /// Remaining named slots: deeper buckets or metric results, keyed by
    /// the wire names assigned at build time.
    #[serde(flatten)]
    pub sub: HashMap<String, SubAggData>,
}

impl ResponseBucket {
    /// Bucket key as epoch milliseconds (histogram keys are numeric).
    pub fn key_millis(&self) -> Option<i64> {
        match &self.key {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Bucket key as display text, preferring `key_as_string`.
    pub fn key_text(&self) -> Option<String> {
        if let Some(s) = &self.key_as_string {
            return Some(s.clone());
        }
        match &self.key {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(match n.as_i64() {
                Some(i) => i.to_string(),
                None => n.to_string(),
            }),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }

    /// Numeric form of the bucket key (histogram leaf columns).
    pub fn key_number(&self) -> Option<f64> {
        match &self.key {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Raw metric sub-result; extraction is metric-kind specific. Absent or
/// null fields extract as `None` rather than failing the parse.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricData {
    #[serde(flatten)]
    pub values: serde_json::Map<String, Value>,
}

impl MetricData {
    /// Single-value metrics (`avg`, `sum`, ...): the `value` field.
    pub fn value(&self) -> Option<f64> {
        self.values.get("value").and_then(Value::as_f64)
    }

    /// Percentile lookup; response keys are matched numerically so `"75"`
    /// and `"75.0"` are the same percentile.
    pub fn percentile(&self, pct: f64) -> Option<f64> {
        let values = self.values.get("values")?.as_object()?;
        for (key, value) in values {
            match key.parse::<f64>() {
                Ok(p) if (p - pct).abs() < 1e-9 => return value.as_f64(),
                _ => {}
            }
        }
        None
    }

    /// Extended-stats lookup, including the nested deviation bounds.
    pub fn stat(&self, stat: ExtendedStat) -> Option<f64> {
        match stat {
            ExtendedStat::StdDeviationBoundsUpper => self
                .values
                .get("std_deviation_bounds")?
                .get("upper")?
                .as_f64(),
            ExtendedStat::StdDeviationBoundsLower => self
                .values
                .get("std_deviation_bounds")?
                .get("lower")?
                .as_f64(),
            other => self.values.get(other.key()).and_then(Value::as_f64),
        }
    }
}

/// Selectable extended-stats sub-fields, in canonical emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedStat {
    Avg,
    Count,
    Max,
    Min,
    Sum,
    StdDeviation,
    StdDeviationBoundsUpper,
    StdDeviationBoundsLower,
    Variance,
}

impl ExtendedStat {
    pub const ALL: [ExtendedStat; 9] = [
        ExtendedStat::Avg,
        ExtendedStat::Count,
        ExtendedStat::Max,
        ExtendedStat::Min,
        ExtendedStat::Sum,
        ExtendedStat::StdDeviation,
        ExtendedStat::StdDeviationBoundsUpper,
        ExtendedStat::StdDeviationBoundsLower,
        ExtendedStat::Variance,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ExtendedStat::Avg => "avg",
            ExtendedStat::Count => "count",
            ExtendedStat::Max => "max",
            ExtendedStat::Min => "min",
            ExtendedStat::Sum => "sum",
            ExtendedStat::StdDeviation => "std_deviation",
            ExtendedStat::StdDeviationBoundsUpper => "std_deviation_bounds_upper",
            ExtendedStat::StdDeviationBoundsLower => "std_deviation_bounds_lower",
            ExtendedStat::Variance => "variance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtendedStat::Avg => "Average",
            ExtendedStat::Count => "Count",
            ExtendedStat::Max => "Max",
            ExtendedStat::Min => "Min",
            ExtendedStat::Sum => "Sum",
            ExtendedStat::StdDeviation => "Std Dev",
            ExtendedStat::StdDeviationBoundsUpper => "Std Dev Upper",
            ExtendedStat::StdDeviationBoundsLower => "Std Dev Lower",
            ExtendedStat::Variance => "Variance",
        }
    }

    /// Stats selected by a metric's meta flags. An empty meta selects the
    /// deviation bounds pair, matching the query editor's defaults.
    pub fn selected(meta: &BTreeMap<String, bool>) -> Vec<ExtendedStat> {
        if meta.is_empty() {
            return vec![
                ExtendedStat::StdDeviationBoundsUpper,
                ExtendedStat::StdDeviationBoundsLower,
            ];
        }
        Self::ALL
            .iter()
            .copied()
            .filter(|stat| meta.get(stat.key()).copied().unwrap_or(false))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitsSection {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Hit totals: a bare count on older backends, an object on newer ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) => *n,
            TotalHits::Object { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,

    #[serde(rename = "_index", default)]
    pub index: Option<String>,

    #[serde(rename = "_source", default)]
    pub source: serde_json::Map<String, Value>,

    /// Requested script / doc-value fields.
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}
