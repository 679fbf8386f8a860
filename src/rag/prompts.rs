//! Fixed texts and prompts for answer composition

/// Canonical compliance line attached to every answer
pub const DISCLAIMER: &str = "This guidance is not legal advice. It is reference information \
based on past cases, court rulings and election commission materials. Consult a legal \
professional for a final determination.";

/// Summary label of template answers
pub const TEMPLATE_SUMMARY: &str = "Reference guidance based on similar cases.";

/// Advisory bullets of template answers; independent of the query and the cases
pub const TEMPLATE_GUIDANCE: &str = "• When relying on similar cases, pin down the timing \
(before or after election day), the channel (online or offline), the audience (constituents \
or supporters) and whether money or goods were provided before running an internal review.\n\
• Soften the wording once the facts are confirmed, and re-check whether a prohibition period \
applies before publishing or distributing anything.\n";

/// System instruction constraining the external model
pub fn build_system_instruction() -> String {
    format!(
        r"You are an election-law case reference assistant. You do not provide legal advice.
Always follow these rules:
1) Never give a definitive legal judgement. Do not say that something 'is a violation' or 'is legal'.
2) Present past similar cases and statutory articles for reference only.
3) Every conclusion must list its sources (case ID / article / URL).
4) The last line of the response must be this disclaimer: {DISCLAIMER}
"
    )
}

/// Build the user prompt from the literal query and the assembled case context
pub fn build_case_rag_prompt(query: &str, context: &str) -> String {
    format!(
        r"User input: {query}

Related cases (for reference only):
{context}

Requirements:
- Based on the cases and articles above, summarize risk signals, cautions and alternative guidance.
- Keep the wording at the level of reference guidance and avoid definitive legal judgements.
- Always end with a list of citations/sources followed by the disclaimer.
"
    )
}
