use itertools::Itertools;
use scraper::{Html, Node};

/// Upper bound on text handed to the LLM per page.
pub const MAX_CONTENT_CHARS: usize = 8000;

const SKIPPED_TAGS: [&str; 7] = [
    "script", "style", "nav", "footer", "header", "aside", "noscript",
];

/// Visible text of a page with boilerplate sections dropped and whitespace
/// collapsed, capped at [`MAX_CONTENT_CHARS`].
pub fn clean_html_content(html_content: &str) -> String {
    let document = Html::parse_document(html_content);

    let text: String = document
        .tree
        .nodes()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, text)),
            _ => None,
        })
        .filter(|(node, _)| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
            })
        })
        .map(|(_, text)| &**text)
        .collect();

    // Adjacent text nodes join as-is; inline tags must not split words.
    let content = text.split_whitespace().join(" ");

    truncate_chars(content, MAX_CONTENT_CHARS)
}

pub fn truncate_chars(content: String, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => content[..byte_index].to_string(),
        None => content,
    }
}
