//! Prompt templates for the investigation pipeline
//!
//! - System: expert analyst instructions stamped with the current time
//! - Planner: turns an inquiry into search queries
//! - Digest: extracts insights and follow-ups from scraped pages
//! - Report: synthesizes the final markdown report
//! - Feedback: analyzes reader feedback on a report

use chrono::{SecondsFormat, Utc};

/// Prompt templates for the investigation pipeline
pub struct InvestigationPrompts;

impl InvestigationPrompts {
    fn current_timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// System prompt shared by every generation call
    pub fn system() -> String {
        format!(
            r#"You are an expert knowledge synthesizer and research analyst.
Current timestamp: {timestamp}
Operating parameters:
- Process information beyond knowledge cutoff with user-provided context
- Target audience: Advanced analyst, maintain technical depth
- Emphasize structured analysis and organization
- Proactively identify novel approaches and solutions
- Anticipate analytical requirements and edge cases
- Treat all input as expert-level discourse
- Prioritize accuracy and thoroughness over simplification
- Provide comprehensive technical explanations
- Evaluate arguments based on merit rather than authority
- Consider emerging technologies and contrarian perspectives
- Flag speculative or predictive elements explicitly"#,
            timestamp = Self::current_timestamp()
        )
    }

    /// Query planning prompt.
    ///
    /// Previous insights are appended only when there are any, so the model
    /// can steer away from ground already covered.
    pub fn planner(inquiry: &str, query_count: usize, previous_insights: &[String]) -> String {
        let mut prompt = format!(
            "Given the following inquiry, generate strategic search queries to investigate \
             the topic. Return up to {query_count} queries, optimizing for unique \
             perspectives: <prompt>{inquiry}</prompt>"
        );

        if !previous_insights.is_empty() {
            prompt.push_str(&format!(
                "\n\nConsider these previous insights for more targeted queries: {}",
                previous_insights.join("\n")
            ));
        }

        prompt
    }

    /// Digest prompt over already-budgeted page contents
    pub fn digest(inquiry: &str, segments: &[String]) -> String {
        let content = segments
            .iter()
            .map(|segment| format!("<segment>\n{segment}\n</segment>"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Analyze these search results for the inquiry <inquiry>{inquiry}</inquiry>. \
             Extract key insights and generate follow-up questions. Focus on unique, \
             information-dense findings. Include specific entities, metrics, and dates when \
             available.\n\n<content>{content}</content>"
        )
    }

    /// Report prompt; `insights_block` is the joined `<insight>` blocks
    pub fn report(initial_query: &str, insights_block: &str) -> String {
        format!(
            "Synthesize a comprehensive analysis report based on the following research \
             prompt and gathered insights. Aim for extensive detail spanning 3+ pages, \
             incorporating ALL research findings:\n\n<prompt>{initial_query}</prompt>\n\n\
             Collated Research Insights:\n\n<insights>\n{insights_block}\n</insights>"
        )
    }

    pub fn feedback(feedback: &str, context: &str) -> String {
        format!(
            "Analyze this feedback in the context of the research results and suggest \
             improvements:\n\nContext:\n{context}\n\nFeedback:\n{feedback}"
        )
    }
}
