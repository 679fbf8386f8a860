//! CLI command handlers

use tracing::info;

use crate::cli::output::print_config;
use crate::cli::output::print_index_summary;
use crate::cli::output::print_info;
use crate::cli::output::print_report;
use crate::cli::output::print_search_header;
use crate::cli::output::print_search_hits;
use crate::cli::output::print_warning;
use crate::index::ArtifactSummary;
use crate::index::IndexArtifact;
use crate::models::AskReport;
use crate::models::SearchHit;
use crate::rag::Searcher;
use crate::AppConfig;
use crate::CaseRag;
use crate::Result;

/// Answer overrides given on the command line
#[derive(Debug, Default, Clone)]
pub struct AskOverrides {
    pub backend: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl AskOverrides {
    /// Apply to a copy of `config` and re-validate it
    pub fn apply(&self, config: &AppConfig) -> Result<AppConfig> {
        let mut config = config.clone();
        if let Some(backend) = &self.backend {
            config.answer.backend.clone_from(backend);
        }
        if let Some(model) = &self.model {
            config.answer.model = Some(model.clone());
        }
        if let Some(temperature) = self.temperature {
            config.answer.temperature = Some(temperature);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Case count for a command: the `-k` value or `search.default_topk`
pub fn resolve_topk(config: &AppConfig, topk: Option<usize>) -> usize {
    topk.unwrap_or_else(|| config.default_topk())
}

/// Rank the cases of the configured index against `query`
pub fn search_hits(config: &AppConfig, query: &str, topk: usize) -> Result<Vec<SearchHit>> {
    let searcher = Searcher::open(config.index_path(), config.search.fact_max_chars)?;
    searcher.query(query, topk)
}

/// Build the pipeline from `config` and answer `query`
pub async fn ask_report(config: &AppConfig, query: &str, topk: usize) -> Result<AskReport> {
    let rag = CaseRag::from_config(config)?;
    let report = rag.ask(query, topk).await?;
    info!(
        "Answered with {} cases in {} mode",
        report.cases.len(),
        report.answer.mode()
    );
    Ok(report)
}

pub fn index_summary(config: &AppConfig) -> Result<ArtifactSummary> {
    Ok(IndexArtifact::load(config.index_path())?.summary())
}

pub fn handle_search_command(
    config: &AppConfig,
    query: &str,
    topk: Option<usize>,
    json: bool,
) -> Result<()> {
    let topk = resolve_topk(config, topk);
    let hits = search_hits(config, query, topk)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    print_search_header(query, topk);
    if hits.is_empty() {
        print_warning("The index holds no cases");
    } else {
        print_search_hits(&hits);
    }
    Ok(())
}

pub async fn handle_ask_command(
    config: &AppConfig,
    query: &str,
    topk: Option<usize>,
    overrides: &AskOverrides,
    json: bool,
) -> Result<()> {
    let config = overrides.apply(config)?;
    let topk = resolve_topk(&config, topk);

    if !json {
        print_info(&format!("🤖 Query: \"{query}\" (top {topk})"));
        println!();
    }

    let report = ask_report(&config, query, topk).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

pub fn handle_inspect_command(config: &AppConfig) -> Result<()> {
    let summary = index_summary(config)?;
    print_index_summary(&config.index_path().display().to_string(), &summary);
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::CaseRagError;

    const QUERY: &str = "campaign banner distributed 20 days before election day";

    fn fixture_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.index.path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("index")
            .join("artifacts.json");
        config
    }

    fn missing_index_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.index.path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("index")
            .join("absent.json");
        config
    }

    #[test]
    fn test_resolve_topk_falls_back_to_default() {
        let mut config = fixture_config();
        config.search.default_topk = 4;
        assert_eq!(resolve_topk(&config, None), 4);
        assert_eq!(resolve_topk(&config, Some(2)), 2);
    }

    #[test]
    fn test_search_command_uses_default_topk() -> Result<()> {
        let config = fixture_config();
        let topk = resolve_topk(&config, None);
        assert_eq!(topk, 6);

        let hits = search_hits(&config, QUERY, topk)?;
        assert_eq!(hits.len(), 6);
        assert_eq!(hits[0].row.id.as_deref(), Some("NEC-2022-014"));
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));

        handle_search_command(&config, QUERY, None, false)?;
        handle_search_command(&config, QUERY, Some(2), true)?;
        Ok(())
    }

    #[test]
    fn test_search_command_missing_index() {
        assert!(matches!(
            handle_search_command(&missing_index_config(), QUERY, None, false),
            Err(CaseRagError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_ask_command_degrades_without_key() -> Result<()> {
        let mut config = fixture_config();
        config.llm.api_key = String::new();
        config.llm.api_key_env = "CASERAG_HANDLERS_TEST_NO_KEY".to_string();
        let overrides = AskOverrides {
            backend: Some("generated".to_string()),
            ..AskOverrides::default()
        };

        let applied = overrides.apply(&config)?;
        let topk = resolve_topk(&applied, None);
        let report = ask_report(&applied, QUERY, topk).await?;
        assert_eq!(report.cases.len(), 6);
        assert_eq!(report.cases[0].id, "NEC-2022-014");
        assert_eq!(report.answer.mode(), "template");
        assert!(report.answer.is_degraded());

        handle_ask_command(&config, QUERY, None, &overrides, false)
            .await?;
        handle_ask_command(&config, QUERY, Some(1), &overrides, true)
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_ask_command_rejects_unknown_backend() {
        let overrides = AskOverrides {
            backend: Some("local-llama".to_string()),
            ..AskOverrides::default()
        };
        let config = fixture_config();
        let result = handle_ask_command(&config, QUERY, None, &overrides, true);
        assert!(matches!(result.await, Err(CaseRagError::UnsupportedBackend(_))));
    }

    #[test]
    fn test_inspect_command_summarizes_fixture() -> Result<()> {
        let config = fixture_config();
        let summary = index_summary(&config)?;
        assert_eq!(summary.backend, "tfidf");
        assert_eq!(summary.metric, "cosine");
        assert_eq!(summary.rows, 10);
        assert!(summary.dimension > 0);

        handle_inspect_command(&config)?;
        assert!(matches!(
            handle_inspect_command(&missing_index_config()),
            Err(CaseRagError::Io(_))
        ));
        Ok(())
    }

    #[test]
    fn test_overrides_replace_answer_settings() {
        let overrides = AskOverrides {
            backend: Some("generated".to_string()),
            model: Some("gpt-4o".to_string()),
            temperature: Some(0.7),
        };
        let config = overrides.apply(&AppConfig::default()).unwrap();
        assert_eq!(config.answer.backend, "generated");
        assert_eq!(config.answer.model_or_default(), "gpt-4o");
        assert!((config.answer.temperature_or_default() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overrides_are_validated() {
        let overrides = AskOverrides {
            temperature: Some(3.5),
            ..AskOverrides::default()
        };
        assert!(matches!(
            overrides.apply(&AppConfig::default()),
            Err(CaseRagError::ConfigError(_))
        ));
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let base = AppConfig::default();
        let config = AskOverrides::default().apply(&base).unwrap();
        assert_eq!(config.answer.backend, base.answer.backend);
        assert_eq!(config.answer.model, None);
    }
}
