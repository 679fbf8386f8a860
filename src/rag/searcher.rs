//! Similarity search over the frozen index

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::default_fact_max_chars;
use crate::errors::CaseRagError;
use crate::errors::Result;
use crate::index::IndexArtifact;
use crate::models::RawRow;
use crate::models::SearchHit;

/// Searcher over a loaded [`IndexArtifact`]
///
/// Holding an artifact means it already passed the backend and consistency checks, so
/// a `Searcher` can never be built on an unsupported index.
#[derive(Debug, Clone)]
pub struct Searcher {
    artifact: Arc<IndexArtifact>,
    fact_max_chars: usize,
}

impl Searcher {
    /// Create a searcher with the default `fact` bound
    pub fn new(artifact: Arc<IndexArtifact>) -> Self {
        Self::with_fact_limit(artifact, default_fact_max_chars())
    }

    /// Create a searcher truncating `fact` to `fact_max_chars` characters
    ///
    /// A limit of 0 is raised to 1. Configuration rejects 0 before it gets here.
    pub fn with_fact_limit(artifact: Arc<IndexArtifact>, fact_max_chars: usize) -> Self {
        Self {
            artifact,
            fact_max_chars: fact_max_chars.max(1),
        }
    }

    /// Load the artifact at `path` and wrap it
    pub fn open<P: AsRef<Path>>(path: P, fact_max_chars: usize) -> Result<Self> {
        let artifact = IndexArtifact::load(path)?;
        Ok(Self::with_fact_limit(Arc::new(artifact), fact_max_chars))
    }

    pub fn artifact(&self) -> &Arc<IndexArtifact> {
        &self.artifact
    }

    pub const fn fact_max_chars(&self) -> usize {
        self.fact_max_chars
    }

    /// Rank rows by similarity to `text`
    ///
    /// Returns `min(topk, rows)` hits with ranks `1..` and `score = 1 - distance`
    /// rounded to 3 decimals. Scores are not clamped: see
    /// [`crate::index::DistanceMetric`] for the range of each metric.
    pub fn query(&self, text: &str, topk: usize) -> Result<Vec<SearchHit>> {
        if text.trim().is_empty() {
            return Err(CaseRagError::InvalidQuery("query text is empty".to_string()));
        }
        if topk == 0 {
            return Err(CaseRagError::InvalidQuery("topk must be at least 1".to_string()));
        }

        let query_vector = self.artifact.vectorizer().transform(text);
        debug!(
            "Query vectorized: {} known terms, topk {}",
            query_vector.indices.len(),
            topk
        );

        let rows = self.artifact.rows();
        let hits = self
            .artifact
            .neighbors()
            .kneighbors(&query_vector, topk)
            .into_iter()
            .enumerate()
            .map(|(position, (row_index, distance))| SearchHit {
                rank: position + 1,
                score: round_score(1.0 - distance),
                row_index,
                row: self.display_row(&rows[row_index]),
            })
            .collect::<Vec<_>>();

        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }

    fn display_row(&self, row: &RawRow) -> RawRow {
        RawRow {
            fact: row
                .fact
                .as_deref()
                .map(|fact| truncate_chars(fact, self.fact_max_chars)),
            ..row.clone()
        }
    }
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Cut `s` to at most `max_chars` characters, on a character boundary
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => s[..byte_index].to_string(),
        None => s.to_string(),
    }
}
