//! Complete RAG pipeline: Search -> Retrieve -> Answer

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::index::IndexArtifact;
use crate::models::AskReport;
use crate::models::RetrievedCase;
use crate::models::SearchHit;
use crate::rag::Answerer;
use crate::rag::Retriever;
use crate::rag::Searcher;

/// Handle owning the loaded index and the three pipeline stages
///
/// Built once per process and shared; nothing in it is mutated after construction.
#[derive(Debug, Clone)]
pub struct CaseRag {
    artifact: Arc<IndexArtifact>,
    searcher: Arc<Searcher>,
    retriever: Retriever,
    answerer: Answerer,
}

impl CaseRag {
    /// Load the index and build every stage from configuration
    ///
    /// # Errors
    /// - Index file errors (missing file, invalid JSON, unsupported backend tag, corrupt artifact)
    /// - Unsupported answer backend
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let artifact = Arc::new(IndexArtifact::load(config.index_path())?);
        let answerer = Answerer::from_config(config)?;
        Ok(Self::from_parts(artifact, config.search.fact_max_chars, answerer))
    }

    /// Create from an already loaded artifact
    #[must_use]
    pub fn from_parts(
        artifact: Arc<IndexArtifact>,
        fact_max_chars: usize,
        answerer: Answerer,
    ) -> Self {
        let searcher = Arc::new(Searcher::with_fact_limit(Arc::clone(&artifact), fact_max_chars));
        let retriever = Retriever::new(Arc::clone(&searcher));

        Self {
            artifact,
            searcher,
            retriever,
            answerer,
        }
    }

    pub fn artifact(&self) -> &IndexArtifact {
        &self.artifact
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub const fn answerer(&self) -> &Answerer {
        &self.answerer
    }

    pub fn search(&self, query: &str, topk: usize) -> Result<Vec<SearchHit>> {
        self.searcher.query(query, topk)
    }

    pub fn retrieve(&self, query: &str, topk: usize) -> Result<Vec<RetrievedCase>> {
        self.retriever.retrieve(query, topk)
    }

    /// Retrieve the `topk` closest cases and answer over them
    ///
    /// # Errors
    /// - Invalid query (empty text, `topk == 0`)
    /// - Generation errors in generated mode (API failures, network errors, timeout)
    pub async fn ask(&self, query: &str, topk: usize) -> Result<AskReport> {
        info!("Processing query: {}", query);

        debug!("Step 1: Retrieving cases");
        let cases = self.retriever.retrieve(query, topk)?;
        debug!("Retrieved {} cases", cases.len());

        debug!("Step 2: Composing {} answer", self.answerer.backend());
        let answer = self.answerer.answer(query, &cases).await?;

        info!("Query answered in {} mode", answer.mode());
        Ok(AskReport {
            query: query.to_string(),
            cases,
            answer,
            generated_at: Utc::now(),
        })
    }
}
