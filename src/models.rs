use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::ser::SerializeStruct;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Case row as stored in the index artifact
///
/// Every field is optional. Rows come from spreadsheet exports, so numeric ids and
/// stray booleans are accepted and rendered to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub law: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub article: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub penalty: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fact: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_url: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        // Arrays and objects carry no usable text for a case field
        Some(_) => None,
    })
}

/// One ranked row returned by the searcher
///
/// Serializes flat, with absent row fields written as `""`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    /// 1-based rank
    pub rank: usize,
    /// `1 - distance`, rounded to 3 decimals, never clamped
    pub score: f64,
    /// Position of the row in the artifact
    pub row_index: usize,
    /// Row content with `fact` already truncated
    #[serde(flatten)]
    pub row: RawRow,
}

fn text_or_empty(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

impl Serialize for SearchHit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SearchHit", 9)?;
        state.serialize_field("rank", &self.rank)?;
        state.serialize_field("score", &self.score)?;
        state.serialize_field("row_index", &self.row_index)?;
        state.serialize_field("id", text_or_empty(&self.row.id))?;
        state.serialize_field("law", text_or_empty(&self.row.law))?;
        state.serialize_field("article", text_or_empty(&self.row.article))?;
        state.serialize_field("penalty", text_or_empty(&self.row.penalty))?;
        state.serialize_field("fact", text_or_empty(&self.row.fact))?;
        state.serialize_field("source_url", text_or_empty(&self.row.source_url))?;
        state.end()
    }
}

/// Typed case record handed to the answerer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedCase {
    pub id: String,
    pub law: String,
    pub article: String,
    pub penalty: String,
    pub fact: String,
    pub source_url: String,
    pub score: f64,
}

impl RetrievedCase {
    /// Build a case from a raw row, defaulting anything missing
    pub fn from_raw(row: &RawRow, score: Option<f64>) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();
        Self {
            id: text(&row.id),
            law: text(&row.law),
            article: text(&row.article),
            penalty: text(&row.penalty),
            fact: text(&row.fact),
            source_url: text(&row.source_url),
            score: score.filter(|s| s.is_finite()).unwrap_or(0.0),
        }
    }
}

impl From<&SearchHit> for RetrievedCase {
    fn from(hit: &SearchHit) -> Self {
        Self::from_raw(&hit.row, Some(hit.score))
    }
}

/// Structured answer
///
/// `disclaimer` is a dedicated field in both variants and always holds
/// [`crate::rag::prompts::DISCLAIMER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Answer {
    Template {
        summary: String,
        guidance: String,
        citations: Vec<String>,
        disclaimer: String,
        /// Set when a generated answer was requested but the generator was unavailable
        degraded: bool,
    },
    Generated {
        text: String,
        disclaimer: String,
    },
}

impl Answer {
    pub fn disclaimer(&self) -> &str {
        match self {
            Self::Template { disclaimer, .. } | Self::Generated { disclaimer, .. } => disclaimer,
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Template { degraded: true, .. })
    }

    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Template { .. } => "template",
            Self::Generated { .. } => "generated",
        }
    }
}

/// Everything produced for one question, ready for a presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskReport {
    pub query: String,
    pub cases: Vec<RetrievedCase>,
    pub answer: Answer,
    pub generated_at: DateTime<Utc>,
}
