//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `caserag` CLI

use crate::index::ArtifactSummary;
use crate::models::Answer;
use crate::models::AskReport;
use crate::models::RetrievedCase;
use crate::models::SearchHit;
use crate::AppConfig;

/// Truncate a preview at a character boundary, adding "..." when cut
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "N/A",
    }
}

/// Print search header
pub fn print_search_header(query: &str, topk: usize) {
    println!("🔍 Searching cases for: \"{query}\" (top {topk})");
    println!();
}

/// Print ranked search hits
pub fn print_search_hits(hits: &[SearchHit]) {
    println!("Found {} cases:", hits.len());
    for hit in hits {
        println!();
        println!(
            "  #{} [{:.3}] {}",
            hit.rank,
            hit.score,
            or_na(hit.row.id.as_deref())
        );
        println!(
            "  ⚖️  {} {} | {}",
            or_na(hit.row.law.as_deref()),
            hit.row.article.as_deref().unwrap_or(""),
            or_na(hit.row.penalty.as_deref())
        );
        if let Some(fact) = hit.row.fact.as_deref().filter(|f| !f.is_empty()) {
            println!("  📝 {fact}");
        }
        if let Some(url) = hit.row.source_url.as_deref().filter(|u| !u.is_empty()) {
            println!("  🔗 {url}");
        }
    }
}

/// Print retrieved cases
pub fn print_cases(cases: &[RetrievedCase]) {
    println!("📚 Similar cases ({}):", cases.len());
    for (i, case) in cases.iter().enumerate() {
        println!(
            "  {}. [{:.3}] {} | {} {} | {}",
            i + 1,
            case.score,
            or_na(Some(case.id.as_str())),
            or_na(Some(case.law.as_str())),
            case.article,
            or_na(Some(case.penalty.as_str()))
        );
        if !case.fact.is_empty() {
            println!("     {}", truncate_str(&case.fact, 100));
        }
    }
}

/// Print an answer, section by section
pub fn print_answer(answer: &Answer) {
    match answer {
        Answer::Template {
            summary,
            guidance,
            citations,
            disclaimer,
            degraded,
        } => {
            if *degraded {
                print_warning("Generation unavailable, showing the template answer");
            }
            println!("📋 {summary}");
            println!();
            println!("🧭 Guidance:");
            for line in guidance.lines() {
                println!("  {line}");
            }
            println!();
            println!("📑 Citations:");
            if citations.is_empty() {
                println!("  (no similar cases found)");
            }
            for citation in citations {
                println!("  - {citation}");
            }
            println!();
            println!("⚠️  {disclaimer}");
        }
        Answer::Generated { text, disclaimer } => {
            println!("💡 Answer:");
            println!("{text}");
            println!();
            println!("⚠️  {disclaimer}");
        }
    }
}

/// Print a full ask report
pub fn print_report(report: &AskReport) {
    print_cases(&report.cases);
    println!();
    print_answer(&report.answer);
    println!();
    println!(
        "🕒 Generated at {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Print index summary
pub fn print_index_summary(path: &str, summary: &ArtifactSummary) {
    println!("🗂️  Index: {path}");
    println!("  Backend: {}", summary.backend);
    println!("  Metric: {}", summary.metric);
    println!("  Rows: {}", summary.rows);
    println!("  Dimension: {}", summary.dimension);
    println!("  Vocabulary size: {}", summary.vocabulary_size);
    println!(
        "  N-gram range: {}..={}",
        summary.ngram_range.0, summary.ngram_range.1
    );
}

pub fn print_config(config: &AppConfig) {
    println!("📋 caserag Configuration:");
    println!();

    println!("🗂️  Index:");
    println!("  Path: {}", config.index_path().display());
    println!();

    println!("🔍 Search:");
    println!("  Default topk: {}", config.default_topk());
    println!("  Fact max chars: {}", config.search.fact_max_chars);
    println!();

    println!("💬 Answer:");
    println!("  Backend: {}", config.answer.backend);
    println!("  Model: {}", config.answer.model_or_default());
    println!("  Temperature: {}", config.answer.temperature_or_default());
    println!("  Timeout: {}s", config.answer.timeout_secs);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!(
        "  Key: {}",
        mask_api_key(config.llm.resolve_api_key().as_deref())
    );
    println!("  Key env: {}", config.llm.api_key_env);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!("  Dir: {}", config.logging.dir.display());
}

/// Mask an API key for display (keep a short prefix)
fn mask_api_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) if key.chars().count() <= 8 => "***masked***".to_string(),
        Some(key) => {
            let prefix: String = key.chars().take(3).collect();
            format!("{prefix}***")
        }
    }
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}
