//! Prompt templates and response parsing for memo enrichment

use crate::memos::types::normalize_tags;

/// Prompt asking for a 2-3 sentence summary of a memo
pub fn summary_prompt(content: &str) -> String {
    format!(
        "Summarize the following memo concisely and clearly. \
         Keep only the key points, in 2-3 sentences, \
         written in the same language as the memo:\n\n{}",
        content
    )
}

/// Prompt asking for 3-5 comma-separated keywords
pub fn tags_prompt(content: &str) -> String {
    format!(
        "Analyze the following memo and extract 3 to 5 core keywords. \
         Separate the keywords with commas and write them in the same language \
         as the memo. Example: \"project, development, meeting, schedule, priority\"\
         \n\nMemo:\n{}",
        content
    )
}

/// Split a comma-separated keyword reply into normalized tags.
///
/// Entries are trimmed, empties dropped, lowercased, and deduplicated keeping
/// the first occurrence. An empty result means the reply was unusable.
pub fn parse_tags(reply: &str) -> Vec<String> {
    normalize_tags(reply.split(','))
}
