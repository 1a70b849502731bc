// ABOUTME: Locates the named semantic regions of a title page that field resolvers start from.
// ABOUTME: A missing region is None, never an error.

use crate::dom::{Document, DomNode, Node};

pub const HERO: &str = r#"section.ipc-page-section[data-testid="hero-parent"]"#;
pub const CAST: &str = r#"section.ipc-page-section[data-testid="title-cast"]"#;
pub const INFO_LIST: &str = r#"ul.ipc-inline-list[role="presentation"]"#;
const SUBNAV_LIST: &str = "hero-subnav-bar-topic-links";

/// The hero block holding title, rating, poster and the info list.
pub fn hero(doc: &Document) -> Option<Node<'_>> {
    doc.find_one(HERO)
}

/// The top cast block.
pub fn cast_block(doc: &Document) -> Option<Node<'_>> {
    doc.find_one(CAST)
}

/// Items of the hero info lists (year, certificate, runtime, "TV Series"),
/// in page order. The hero's sub-navigation list is skipped.
pub fn info_items(doc: &Document) -> Vec<Node<'_>> {
    let Some(hero) = hero(doc) else {
        return vec![];
    };
    hero.find(INFO_LIST)
        .into_iter()
        .filter(|list| list.attr("data-testid").as_deref() != Some(SUBNAV_LIST))
        .flat_map(|list| list.find("li"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_items_skip_subnav_and_keep_order() {
        let doc = Document::parse(
            r#"<section class="ipc-page-section" data-testid="hero-parent">
                <ul class="ipc-inline-list" role="presentation" data-testid="hero-subnav-bar-topic-links">
                    <li>Cast &amp; crew</li>
                </ul>
                <ul class="ipc-inline-list" role="presentation"><li>TV Series</li><li>2007–2019</li></ul>
            </section>"#,
        );
        let texts: Vec<String> = info_items(&doc).iter().map(|n| n.text()).collect();
        assert_eq!(texts, vec!["TV Series", "2007–2019"]);
    }

    #[test]
    fn missing_hero_gives_no_items() {
        let doc = Document::parse("<ul class='ipc-inline-list' role='presentation'><li>2014</li></ul>");
        assert!(hero(&doc).is_none());
        assert!(info_items(&doc).is_empty());
        assert!(cast_block(&doc).is_none());
    }
}
