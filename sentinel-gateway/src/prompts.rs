//! Enrichment prompts
//!
//! Every prompt asks for a single JSON object so the response can be checked
//! against the expected output shape.

/// System prompt shared by all enrichment calls
pub const OSINT_ANALYST_SYSTEM_PROMPT: &str = r#"
You are an expert OSINT (Open Source Intelligence) analyst.

You help investigators plan and consolidate research on a subject using only
publicly available sources: social media, public records, news coverage,
professional profiles, forums and similar open material.

Always answer with a single JSON object and nothing else. Do not wrap the JSON
in Markdown and do not add commentary before or after it.
"#;

/// Prompt for the initial search queries of a new investigation
pub fn create_initial_queries_prompt(subject: &str) -> String {
    format!(
        r#"Your task is to generate a list of initial search queries based on the provided subject.
These queries will be used to gather information from various open sources.

Subject: {subject}

Instructions:
1. Generate diverse search queries to uncover a wide range of information related to the subject.
2. Consider different aspects of the subject, such as personal details, professional background, interests, and potential online presence.
3. Include queries that could reveal social media accounts, public records, news articles, and other relevant online content.
4. Focus on specific and actionable search queries rather than broad or generic terms.

Respond with JSON in exactly this shape:
{{"queries": ["first query", "second query"]}}"#
    )
}

/// Prompt for new search terms derived from existing findings
pub fn create_suggest_terms_prompt(existing_data: &str) -> String {
    format!(
        r#"Analyze the existing OSINT data below and suggest new search terms that can broaden the investigation.

Existing Data:
{existing_data}

Based on this data, suggest 5 new search terms that could uncover additional relevant information.
Consider related names, locations, organizations, activities, or any other relevant keywords.

Respond with JSON in exactly this shape:
{{"suggestedSearchTerms": ["term one", "term two"]}}"#
    )
}

/// Prompt for the profile summary of aggregated findings
pub fn create_summary_prompt(aggregated_data: &str) -> String {
    format!(
        r#"Summarize the following aggregated data to create a comprehensive profile of the target.
Keep the summary concise and factual, and mention only what the data supports.

Data:
{aggregated_data}

Respond with JSON in exactly this shape:
{{"summary": "concise profile summary"}}"#
    )
}
