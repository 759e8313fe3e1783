use crate::models::Suggestion;

const TITLE: &str = "Title:";
const DESCRIPTION: &str = "Description:";

/// Splits a generated recommendation blob into suggestions.
///
/// Blocks are separated by a blank line and must carry both markers; prose
/// and half-finished blocks are dropped.
pub fn parse_suggestions(blob: &str) -> Vec<Suggestion> {
    let normalized = blob.replace("\r\n", "\n");
    normalized.split("\n\n").filter_map(parse_block).collect()
}

fn parse_block(block: &str) -> Option<Suggestion> {
    let title_at = block.find(TITLE)?;
    let description_at = block.find(DESCRIPTION)?;

    let after_title = &block[title_at + TITLE.len()..];
    let title = after_title.lines().next().unwrap_or_default().trim();
    let description = block[description_at + DESCRIPTION.len()..].trim();

    Some(Suggestion {
        title: title.to_string(),
        description: description.to_string(),
    })
}
