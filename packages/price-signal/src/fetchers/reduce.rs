//! Document reduction - flatten markup into text blocks plus metadata.

use std::sync::LazyLock;

use indexmap::IndexMap;
use scraper::{Html, Selector};

use crate::types::document::ReducedDocument;

/// Blocks shorter than this many characters are dropped.
pub const MIN_BLOCK_CHARS: usize = 10;

/// How far into a body to look for an `<html>` opening.
const MARKUP_SNIFF_CHARS: usize = 1024;

static BLOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, li, h1, h2, h3, h4, td, th, caption").unwrap());

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").unwrap());

/// Whether a body looks like an HTML document rather than plain text.
pub fn is_markup(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(MARKUP_SNIFF_CHARS)
        .collect::<String>()
        .to_lowercase();
    head.contains("<!doctype html") || head.contains("<html")
}

/// Reduce a fetched body to text blocks, title, and date metadata.
///
/// Plain text (e.g. from the reader proxy) becomes a single block with no
/// title or metadata.
pub fn reduce(text: &str) -> ReducedDocument {
    if !is_markup(text) {
        return ReducedDocument::plain(text);
    }

    let document = Html::parse_document(text);

    ReducedDocument {
        blocks: extract_blocks(&document),
        title: extract_title(&document),
        date_metadata: extract_date_metadata(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Meta tags whose `name` (or `property`) mentions "published" or "date".
fn extract_date_metadata(document: &Html) -> IndexMap<String, String> {
    let mut metas = IndexMap::new();
    for el in document.select(&META_SELECTOR) {
        let attrs = el.value();
        let Some(name) = attrs.attr("name").or_else(|| attrs.attr("property")) else {
            continue;
        };
        let Some(content) = attrs.attr("content") else {
            continue;
        };
        let lower = name.to_lowercase();
        if lower.contains("published") || lower.contains("date") {
            metas.insert(name.to_string(), content.to_string());
        }
    }
    metas
}

fn extract_blocks(document: &Html) -> Vec<String> {
    document
        .select(&BLOCK_SELECTOR)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| t.chars().count() >= MIN_BLOCK_CHARS)
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title> iPhone Price History </title>
  <meta name="description" content="Launch prices by year">
  <meta property="article:published_time" content="2023-09-12T10:00:00Z">
  <meta name="last-updated-date" content="2024-01-05">
  <meta name="keywords">
</head>
<body>
  <h1>iPhone launch prices</h1>
  <p>The   original iPhone
     launched in June 2007 at $499.</p>
  <p>Short</p>
  <ul><li>iPhone 15 (2023): $799</li></ul>
  <table><tr><th>Year</th><td>Price was $999 in 2017</td></tr></table>
  <script>var price = "$1";</script>
</body>
</html>"#;

    #[test]
    fn test_markup_detection() {
        assert!(is_markup("<!doctype html><p>x</p>"));
        assert!(is_markup("\n  <HTML lang=\"en\">"));
        assert!(!is_markup("Title: iPhone prices\n\nIn 2020 it cost $999."));
    }

    #[test]
    fn test_plain_text_is_one_block() {
        let doc = reduce("In March 2020 it cost $50.");
        assert_eq!(doc.blocks, vec!["In March 2020 it cost $50."]);
        assert_eq!(doc.title, None);
        assert!(doc.date_metadata.is_empty());
    }

    #[test]
    fn test_title_extracted_and_trimmed() {
        let doc = reduce(PAGE);
        assert_eq!(doc.title.as_deref(), Some("iPhone Price History"));
    }

    #[test]
    fn test_date_metadata_by_name_or_property() {
        let doc = reduce(PAGE);
        let keys: Vec<_> = doc.date_metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["article:published_time", "last-updated-date"]);
        assert_eq!(doc.date_metadata["last-updated-date"], "2024-01-05");
    }

    #[test]
    fn test_blocks_collapsed_and_filtered() {
        let doc = reduce(PAGE);
        assert_eq!(
            doc.blocks,
            vec![
                "iPhone launch prices",
                "The original iPhone launched in June 2007 at $499.",
                "iPhone 15 (2023): $799",
                "Price was $999 in 2017",
            ]
        );
        assert!(!doc.joined_text().contains("var price"));
    }
}
