//! Datasource orchestration: compile a batch, dispatch it through the
//! transport collaborator, shape the reply into per-ref-id frames.
//!
//! Errors stay scoped to their query: a query that fails to compile is
//! dropped from the payload (its slot in the result map carries the
//! error), and a response entry that fails to parse does not disturb its
//! siblings. The batch and the reply's `responses` array correspond
//! positionally.

use crate::error::ElasticError;
use crate::index_pattern::{indices_for_range, IndexInterval};
use crate::query::builder::QueryCompiler;
use crate::query::msearch::render_payload;
use crate::query::types::{CompiledQuery, IndexSpec};
use crate::response::frames::FrameAssembler;
use crate::response::hits::HitProjector;
use crate::response::types::{MultiSearchResponse, ResponseEntry, SearchResponse};
use crate::response::walker::Walker;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};
use trellis::{Frame, Query};

/// Transport collaborator: ships the rendered payload, returns the raw
/// reply bytes. Connection pooling, retries and timeouts live behind
/// this seam; the core never retries.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn send(
        &self,
        payload: &[u8],
    ) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone)]
pub struct DatasourceConfig {
    /// Index name, or a rotation pattern when `interval` is set.
    pub index: String,
    pub interval: IndexInterval,
}

impl DatasourceConfig {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            interval: IndexInterval::NoInterval,
        }
    }

    pub fn with_interval(mut self, interval: IndexInterval) -> Self {
        self.interval = interval;
        self
    }
}

/// Frames and/or error for one ref-id.
#[derive(Debug, Default)]
pub struct QueryResult {
    pub frames: Vec<Frame>,
    pub error: Option<ElasticError>,
}

impl QueryResult {
    fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            error: None,
        }
    }

    fn from_error(error: ElasticError) -> Self {
        Self {
            frames: Vec::new(),
            error: Some(error),
        }
    }
}

/// Result map for one batch, keyed by ref-id.
#[derive(Debug, Default)]
pub struct BatchResponse {
    pub responses: HashMap<String, QueryResult>,
}

/// A compiled wire pair still attached to its logical query, so the
/// parse half can interpret the matching response entry.
pub struct CompiledItem<'a> {
    pub wire: CompiledQuery,
    pub query: &'a Query,
}

pub struct ElasticDatasource<T> {
    config: DatasourceConfig,
    transport: T,
}

impl<T: SearchTransport> ElasticDatasource<T> {
    pub fn new(config: DatasourceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// End-to-end batch: compile, serialize, dispatch, parse.
    pub async fn query(&self, queries: &[Query]) -> BatchResponse {
        let (items, compile_errors) = self.compile_batch(queries);
        let mut responses: HashMap<String, QueryResult> = compile_errors
            .into_iter()
            .map(|(ref_id, err)| (ref_id, QueryResult::from_error(err)))
            .collect();

        if items.is_empty() {
            return BatchResponse { responses };
        }

        let payload = match render_payload(items.iter().map(|item| &item.wire)) {
            Ok(payload) => payload,
            Err(err) => {
                let reason = err.to_string();
                for item in &items {
                    responses.insert(
                        item.wire.ref_id.clone(),
                        QueryResult::from_error(ElasticError::malformed(format!(
                            "failed to serialize request: {reason}"
                        ))),
                    );
                }
                return BatchResponse { responses };
            }
        };
        debug!(queries = items.len(), bytes = payload.len(), "dispatching multi-search");

        match self.transport.send(&payload).await {
            Ok(body) => {
                responses.extend(self.parse_batch(&items, &body));
            }
            Err(err) => {
                warn!(error = %err, "multi-search transport failed");
                let reason = err.to_string();
                for item in &items {
                    responses.insert(
                        item.wire.ref_id.clone(),
                        QueryResult::from_error(ElasticError::Transport {
                            reason: reason.clone(),
                        }),
                    );
                }
            }
        }

        BatchResponse { responses }
    }

    /// Pure compile half: wire pairs for the healthy queries, errors for
    /// the rest. Pair order follows input order.
    pub fn compile_batch<'a>(
        &self,
        queries: &'a [Query],
    ) -> (Vec<CompiledItem<'a>>, Vec<(String, ElasticError)>) {
        let mut items = Vec::new();
        let mut errors = Vec::new();
        for query in queries {
            let names = indices_for_range(&self.config.index, self.config.interval, &query.time_range);
            match QueryCompiler::compile(query, IndexSpec::from_names(names)) {
                Ok(wire) => items.push(CompiledItem { wire, query }),
                Err(err) => {
                    warn!(ref_id = %query.ref_id, error = %err, "dropping query from batch");
                    errors.push((query.ref_id.clone(), err));
                }
            }
        }
        (items, errors)
    }

    /// Pure parse half: align reply entries positionally with the
    /// compiled pairs and shape each into frames.
    pub fn parse_batch(
        &self,
        items: &[CompiledItem<'_>],
        body: &[u8],
    ) -> HashMap<String, QueryResult> {
        let mut responses = HashMap::with_capacity(items.len());

        let reply: MultiSearchResponse = match serde_json::from_slice(body) {
            Ok(reply) => reply,
            Err(err) => {
                for item in items {
                    responses.insert(
                        item.wire.ref_id.clone(),
                        QueryResult::from_error(ElasticError::malformed(format!(
                            "undecodable multi-search response: {err}"
                        ))),
                    );
                }
                return responses;
            }
        };

        for (i, item) in items.iter().enumerate() {
            let result = match reply.responses.get(i) {
                None => QueryResult::from_error(ElasticError::malformed(
                    "missing response entry".to_string(),
                )),
                Some(ResponseEntry::Failure(failure)) => {
                    warn!(ref_id = %item.wire.ref_id, "backend reported query failure");
                    QueryResult::from_error(ElasticError::Backend {
                        error_type: failure.error.error_type().to_string(),
                        reason: failure.error.reason().to_string(),
                    })
                }
                Some(ResponseEntry::Search(search)) => {
                    match Self::parse_entry(item.query, search) {
                        Ok(frames) => QueryResult::from_frames(frames),
                        Err(err) => QueryResult::from_error(err),
                    }
                }
            };
            responses.insert(item.wire.ref_id.clone(), result);
        }
        responses
    }

    fn parse_entry(query: &Query, response: &SearchResponse) -> Result<Vec<Frame>> {
        let raw = query
            .metrics
            .iter()
            .any(|m| m.kind().is_some_and(|kind| kind.is_raw()));

        if raw {
            let hits = response
                .hits
                .as_ref()
                .ok_or_else(|| ElasticError::malformed("expected hits for raw query"))?;
            return Ok(vec![HitProjector::project(query, hits)]);
        }

        let aggs = response
            .aggregations
            .as_ref()
            .ok_or_else(|| ElasticError::malformed("missing aggregations in response"))?;
        let walker = Walker::new(query)?;
        let output = walker.walk(aggs)?;
        Ok(FrameAssembler::assemble(query, output))
    }
}
