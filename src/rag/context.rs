//! Context and citation assembly from retrieved cases

use crate::models::RetrievedCase;

/// Separator placed between case blocks in a prompt
pub const BLOCK_SEPARATOR: &str = "\n---\n";

/// Assembler for case context blocks and citation lines
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// One block per case, input order, joined by [`BLOCK_SEPARATOR`]
    #[must_use]
    pub fn assemble(&self, cases: &[RetrievedCase]) -> String {
        cases
            .iter()
            .map(|case| self.format_case(case))
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    /// Format a single case for context
    fn format_case(&self, case: &RetrievedCase) -> String {
        format!(
            "[Case ID] {}\n[Article] {} {}\n[Penalty] {}\n[Summary] {}\n[Source] {}\n",
            case.id, case.law, case.article, case.penalty, case.fact, case.source_url
        )
    }

    /// `<law> <article> / <id> — <penalty>`
    #[must_use]
    pub fn citation(&self, case: &RetrievedCase) -> String {
        format!(
            "{} {} / {} — {}",
            case.law, case.article, case.id, case.penalty
        )
    }

    #[must_use]
    pub fn citations(&self, cases: &[RetrievedCase]) -> Vec<String> {
        cases.iter().map(|case| self.citation(case)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str) -> RetrievedCase {
        RetrievedCase {
            id: id.to_string(),
            law: "Public Official Election Act".to_string(),
            article: "Art. 90".to_string(),
            penalty: "Warning".to_string(),
            fact: "Banner posted early".to_string(),
            source_url: format!("https://example.org/{id}"),
            score: 0.5,
        }
    }

    #[test]
    fn test_citation_format() {
        assert_eq!(
            ContextAssembler::new().citation(&case("C-1")),
            "Public Official Election Act Art. 90 / C-1 — Warning"
        );
    }

    #[test]
    fn test_blocks_keep_order_and_separator() {
        let context = ContextAssembler::new().assemble(&[case("C-1"), case("C-2")]);
        let blocks: Vec<&str> = context.split(BLOCK_SEPARATOR).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("[Case ID] C-1\n"));
        assert!(blocks[1].starts_with("[Case ID] C-2\n"));
        assert!(blocks[1].contains("[Source] https://example.org/C-2\n"));
    }

    #[test]
    fn test_empty_cases() {
        let assembler = ContextAssembler::new();
        assert_eq!(assembler.assemble(&[]), "");
        assert!(assembler.citations(&[]).is_empty());
    }

    #[test]
    fn test_missing_fields_still_format() {
        let blank = RetrievedCase::default();
        assert_eq!(ContextAssembler::new().citation(&blank), "  /  — ");
    }
}
