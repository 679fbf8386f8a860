#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use caserag::index::IndexArtifact;
use caserag::rag::Searcher;
use caserag::Result;

/// Query whose closest fixture cases are known
pub const BANNER_QUERY: &str = "campaign banner distributed 20 days before election day";

/// Ten-row fixture index
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("index")
        .join("artifacts.json")
}

pub fn fixture_json() -> String {
    std::fs::read_to_string(fixture_path()).expect("fixture index is readable")
}

pub fn load_fixture() -> Result<Arc<IndexArtifact>> {
    Ok(Arc::new(IndexArtifact::load(fixture_path())?))
}

pub fn fixture_searcher() -> Result<Searcher> {
    Ok(Searcher::new(load_fixture()?))
}

/// Fixture JSON with the top-level value at `key` replaced
pub fn fixture_with(key: &str, value: serde_json::Value) -> String {
    let mut artifact: serde_json::Value =
        serde_json::from_str(&fixture_json()).expect("fixture index is valid JSON");
    artifact[key] = value;
    artifact.to_string()
}
