//! Frozen TF-IDF vectorizer
//!
//! Vocabulary and IDF weights are fixed by the offline build; `transform` never
//! refits, so terms outside the vocabulary are dropped.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::CaseRagError;
use crate::index::SparseVector;
use crate::Result;

/// Output normalization applied after weighting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// term -> column
    pub vocabulary: HashMap<String, usize>,
    /// Per-column inverse document frequency; its length is the vector dimension
    pub idf: Vec<f64>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    /// Inclusive word n-gram range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
    #[serde(default = "default_min_token_chars")]
    pub min_token_chars: usize,
}

const fn default_lowercase() -> bool {
    true
}

const fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

const fn default_min_token_chars() -> usize {
    2
}

impl TfidfVectorizer {
    /// Vectorizer with default tokenization settings
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Self {
        Self {
            vocabulary,
            idf,
            lowercase: default_lowercase(),
            ngram_range: default_ngram_range(),
            sublinear_tf: false,
            norm: Norm::L2,
            min_token_chars: default_min_token_chars(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(CaseRagError::CorruptIndex(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if self.min_token_chars == 0 {
            return Err(CaseRagError::CorruptIndex(
                "min_token_chars must be at least 1".to_string(),
            ));
        }
        if let Some(bad) = self.idf.iter().position(|w| !w.is_finite()) {
            return Err(CaseRagError::CorruptIndex(format!(
                "idf weight at column {bad} is not finite"
            )));
        }
        let dimension = self.dimension();
        if let Some((term, column)) = self.vocabulary.iter().find(|(_, &c)| c >= dimension) {
            return Err(CaseRagError::CorruptIndex(format!(
                "vocabulary term {term:?} maps to column {column}, dimension is {dimension}"
            )));
        }
        Ok(())
    }

    /// Split text into tokens: runs of alphanumerics or `_` of at least
    /// `min_token_chars` characters.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= self.min_token_chars)
            .map(str::to_string)
            .collect()
    }

    fn terms(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                terms.extend(tokens.iter().cloned());
            } else {
                terms.extend(tokens.windows(n).map(|window| window.join(" ")));
            }
        }
        terms
    }

    /// Map text into the frozen vector space
    pub fn transform(&self, text: &str) -> SparseVector {
        let tokens = self.tokenize(text);

        // Column order keeps the output deterministic
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms(&tokens) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut indices = Vec::with_capacity(counts.len());
        let mut values = Vec::with_capacity(counts.len());
        for (column, count) in counts {
            let tf = if self.sublinear_tf {
                1.0 + count.ln()
            } else {
                count
            };
            indices.push(column);
            values.push(tf * self.idf[column]);
        }

        let mut vector = SparseVector { indices, values };
        if self.norm == Norm::L2 {
            vector.l2_normalize();
        }
        vector
    }
}
