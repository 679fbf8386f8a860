//! Retrieval module: ranked hits to typed case records

use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::models::RetrievedCase;
use crate::rag::Searcher;

/// Adapter from searcher output to [`RetrievedCase`]
///
/// Rows with missing fields become empty strings; a missing or non-finite score
/// becomes `0.0`. Hit order is preserved.
#[derive(Debug, Clone)]
pub struct Retriever {
    searcher: Arc<Searcher>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(searcher: Arc<Searcher>) -> Self {
        Self { searcher }
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn retrieve(&self, query: &str, topk: usize) -> Result<Vec<RetrievedCase>> {
        debug!("Retrieving top {} cases", topk);
        let hits = self.searcher.query(query, topk)?;
        Ok(hits.iter().map(RetrievedCase::from).collect())
    }
}
