//! Multi-search payload rendering.
//!
//! The backend's bulk search format is newline-delimited JSON: for every
//! query a header object on one line followed by the body object on the
//! next. Responses come back in the same order, so pair order here is the
//! correlation contract.

use crate::query::types::CompiledQuery;
use crate::Result;

/// Render compiled queries as the newline-delimited multi-search payload.
pub fn render_payload<'a, I>(queries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a CompiledQuery>,
{
    let mut payload = Vec::new();
    for query in queries {
        serde_json::to_writer(&mut payload, &query.header)?;
        payload.push(b'\n');
        serde_json::to_writer(&mut payload, &query.body)?;
        payload.push(b'\n');
    }
    Ok(payload)
}
