//! Instruction templates for the two completion stages.
//!
//! Placeholders (`{query}`, `{article}`, `{outline}`) are substituted with
//! plain string replacement; the templates themselves contain no other
//! braces.

const FACT_EXTRACTION_TEMPLATE: &str = r#"Objective: Extract relevant, unbiased, and factual bullet points from a news article related to the user's search query: {query}. Include significant quotes if relevant.

Instructions:
1. Read the article and identify the who, what, when, where, and why.
2. Select only information that directly relates to the search query: facts, findings, data points, and relevant statistics.
3. If data metrics are mentioned in the article, include them as a bullet point along with their explanation.
4. If a direct quote is particularly relevant, include it as one of the bullet points, clearly marked with quotation marks and attributed to the speaker, identifying who the speaker is where possible.
5. Present every bullet point in a neutral tone. Report what is known and verified; avoid opinion or biased language unless it is an attributed quote that adds factual value.
6. Each bullet point must stand alone in conveying a complete piece of information, so the story can be reconstructed from the bullets later.

Reply with the extracted bullet points and quotes only, one per line, each starting with "- ".
---
News article to analyse:
{article}"#;

const SYNTHESIS_TEMPLATE: &str = r#"Objective: Act as a clear, expert journalist covering topics related to the following query: {query}. Synthesize the bullet points below, which were extracted from multiple articles, into a single cohesive article. The tone should be professional, objective, and unbiased, emulating the writing style of The Economist.

Input format: for each source name, a list of articles, each with its URL, title, and extracted bullet points.

Instructions:
1. Group the bullet points by thematic relevance across all sources, not by source, and arrange the themes so the article flows logically.
2. Structure the article with an engaging introduction summarizing the overarching theme, a body divided into thematic sections, and a conclusion reflecting on the significance of the information.
3. When a statement paraphrases or quotes a specific source, immediately follow it with a Markdown reference link formatted exactly as [**_Source Name_**](ARTICLE_URL), where Source Name and ARTICLE_URL come from the source that supplied the statement. Use only source names and URLs that appear in the input.
4. Present information without speculation or personal opinion, keeping to high journalistic standards.
---
Input bullet points:
{outline}"#;

/// Prompt asking for the neutral bullet-point distillation of one article.
pub fn fact_extraction(query: &str, article_body: &str) -> String {
    FACT_EXTRACTION_TEMPLATE
        .replace("{query}", query)
        .replace("{article}", article_body)
}

/// Prompt asking for the single synthesized, citation-annotated article.
pub fn synthesis(query: &str, outline: &str) -> String {
    SYNTHESIS_TEMPLATE
        .replace("{query}", query)
        .replace("{outline}", outline)
}
