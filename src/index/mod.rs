//! Index artifact produced by the offline build step
//!
//! The artifact bundles a frozen vectorizer, the row vectors it produced and the rows
//! themselves. It is loaded once, checked for consistency and never mutated, so it can
//! be shared across threads behind an `Arc`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use caserag::index::IndexArtifact;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let artifact = IndexArtifact::load("./index/artifacts.json")?;
//!     println!("{} cases indexed", artifact.len());
//!     Ok(())
//! }
//! ```

pub mod neighbors;
pub mod vectorizer;

use std::path::Path;

pub use neighbors::DistanceMetric;
pub use neighbors::NeighborIndex;
pub use neighbors::SparseVector;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
pub use vectorizer::Norm;
pub use vectorizer::TfidfVectorizer;

use crate::errors::CaseRagError;
use crate::models::RawRow;
use crate::Result;

/// Vectorization strategy recorded in the artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendTag {
    TermFrequency,
}

impl BackendTag {
    /// Accepts the tag written by the offline builder and its long form.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "tfidf" | "term-frequency" => Ok(Self::TermFrequency),
            other => Err(CaseRagError::UnsupportedIndexBackend(other.to_string())),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TermFrequency => "tfidf",
        }
    }
}

/// On-disk layout
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactFile {
    backend: String,
    vectorizer: TfidfVectorizer,
    neighbors: NeighborsFile,
    rows: Vec<RawRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NeighborsFile {
    #[serde(default)]
    metric: DistanceMetric,
    vectors: Vec<SparseVector>,
}

/// Only the tag is read before committing to the full layout
#[derive(Deserialize)]
struct BackendHeader {
    backend: String,
}

#[derive(Debug, Clone)]
pub struct IndexArtifact {
    backend: BackendTag,
    vectorizer: TfidfVectorizer,
    neighbors: NeighborIndex,
    rows: Vec<RawRow>,
}

impl IndexArtifact {
    /// Assemble an artifact from its parts, rejecting unknown backends and
    /// inconsistent parts.
    pub fn from_parts(
        backend: &str,
        vectorizer: TfidfVectorizer,
        neighbors: NeighborIndex,
        rows: Vec<RawRow>,
    ) -> Result<Self> {
        let backend = BackendTag::parse(backend)?;
        vectorizer.validate()?;

        if neighbors.len() != rows.len() {
            return Err(CaseRagError::CorruptIndex(format!(
                "{} row vectors for {} rows",
                neighbors.len(),
                rows.len()
            )));
        }
        let dimension = vectorizer.dimension();
        if let Some(column) = neighbors.max_column() {
            if column >= dimension {
                return Err(CaseRagError::CorruptIndex(format!(
                    "row vector references column {column}, dimension is {dimension}"
                )));
            }
        }

        Ok(Self {
            backend,
            vectorizer,
            neighbors,
            rows,
        })
    }

    /// Load an artifact from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading index artifact from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let artifact = Self::from_json(&content)?;
        info!(
            rows = artifact.len(),
            dimension = artifact.vectorizer.dimension(),
            metric = artifact.neighbors.metric().as_str(),
            "Index artifact loaded from {}",
            path.display()
        );
        Ok(artifact)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        // Reject foreign backends before their (different) layout fails to parse
        let header: BackendHeader = serde_json::from_str(content)?;
        BackendTag::parse(&header.backend)?;

        let file: ArtifactFile = serde_json::from_str(content)?;
        let neighbors = NeighborIndex::new(file.neighbors.metric, file.neighbors.vectors)?;
        Self::from_parts(&file.backend, file.vectorizer, neighbors, file.rows)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = ArtifactFile {
            backend: self.backend.as_str().to_string(),
            vectorizer: self.vectorizer.clone(),
            neighbors: NeighborsFile {
                metric: self.neighbors.metric(),
                vectors: self.neighbors.vectors().to_vec(),
            },
            rows: self.rows.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub const fn backend(&self) -> BackendTag {
        self.backend
    }

    pub const fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub const fn neighbors(&self) -> &NeighborIndex {
        &self.neighbors
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            backend: self.backend.as_str().to_string(),
            metric: self.neighbors.metric().as_str().to_string(),
            rows: self.rows.len(),
            dimension: self.vectorizer.dimension(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
            ngram_range: self.vectorizer.ngram_range,
        }
    }
}

/// Shape of a loaded artifact, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub backend: String,
    pub metric: String,
    pub rows: usize,
    pub dimension: usize,
    pub vocabulary_size: usize,
    pub ngram_range: (usize, usize),
}
