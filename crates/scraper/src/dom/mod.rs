// ABOUTME: Thin capability layer over the scraper crate: queries, text, attributes and tree walks.
// ABOUTME: Field resolvers only talk to DomNode, never to the HTML library directly.

//! Document model used by the field extraction engine.
//!
//! [`Document`] owns a parsed page; [`Node`] borrows one element of it. All
//! queries go through the [`DomNode`] trait so the resolvers do not depend on
//! the parsing library's own types.

pub mod compiled;

use scraper::{ElementRef, Html};

use crate::dom::compiled::get_or_compile;

/// Query capability every element handle provides.
pub trait DomNode: Sized + Copy {
    /// All descendants matching `css`, in document order. An invalid selector
    /// matches nothing.
    fn find(&self, css: &str) -> Vec<Self>;

    /// First descendant matching `css`.
    fn find_one(&self, css: &str) -> Option<Self> {
        self.find(css).into_iter().next()
    }

    /// Concatenated text of every descendant text node.
    fn text(&self) -> String;

    /// Text of the element's direct text children only.
    fn own_text(&self) -> String;

    fn attr(&self, name: &str) -> Option<String>;

    /// Lower-case tag name.
    fn tag_name(&self) -> String;

    fn parent(&self) -> Option<Self>;

    /// Element siblings after this one, nearest first.
    fn following_siblings(&self) -> Vec<Self>;
}

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// The `<html>` element; queries on it search the whole page.
    pub fn root(&self) -> Node<'_> {
        Node(self.html.root_element())
    }

    pub fn find(&self, css: &str) -> Vec<Node<'_>> {
        self.root().find(css)
    }

    pub fn find_one(&self, css: &str) -> Option<Node<'_>> {
        self.root().find_one(css)
    }
}

/// Borrowed element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> DomNode for Node<'a> {
    fn find(&self, css: &str) -> Vec<Self> {
        match get_or_compile(css) {
            Some(selector) => self.0.select(&selector).map(Node).collect(),
            None => vec![],
        }
    }

    fn find_one(&self, css: &str) -> Option<Self> {
        let selector = get_or_compile(css)?;
        self.0.select(&selector).next().map(Node)
    }

    fn text(&self) -> String {
        self.0.text().collect()
    }

    fn own_text(&self) -> String {
        self.0
            .children()
            .filter_map(|child| child.value().as_text().map(|text| text.to_string()))
            .collect()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_string)
    }

    fn tag_name(&self) -> String {
        self.0.value().name().to_ascii_lowercase()
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent().and_then(ElementRef::wrap).map(Node)
    }

    fn following_siblings(&self) -> Vec<Self> {
        self.0.next_siblings().filter_map(ElementRef::wrap).map(Node).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <html><body>
            <section data-testid="hero-parent">
                <h1 data-testid="hero__pageTitle"><span>  Interstellar </span></h1>
                <ul role="presentation"><li>2014</li><li>2h 49m</li></ul>
                <a href="/title/tt0816692/?ref_=x">link</a>
            </section>
        </body></html>
    "#;

    #[test]
    fn find_returns_descendants_in_order() {
        let doc = Document::parse(SAMPLE_HTML);
        let items: Vec<String> = doc.find("ul li").iter().map(|n| n.text()).collect();
        assert_eq!(items, vec!["2014", "2h 49m"]);
    }

    #[test]
    fn nested_find_and_parent() {
        let doc = Document::parse(SAMPLE_HTML);
        let hero = doc.find_one("section[data-testid=\"hero-parent\"]").unwrap();
        let span = hero.find_one("h1 span").unwrap();
        assert_eq!(span.text().trim(), "Interstellar");
        let h1 = span.parent().unwrap();
        assert_eq!(h1.attr("data-testid").as_deref(), Some("hero__pageTitle"));
    }

    #[test]
    fn following_siblings_and_own_text() {
        let doc = Document::parse(
            r#"<div id="box"><p>before</p><h1>Heading</h1>text<div>One <b>bold</b></div><ul><li>x</li></ul></div>"#,
        );
        let heading = doc.find_one("#box h1").unwrap();
        let after: Vec<String> = heading
            .following_siblings()
            .iter()
            .map(|n| n.tag_name())
            .collect();
        assert_eq!(after, vec!["div", "ul"]);

        let div = heading.following_siblings()[0];
        assert_eq!(div.own_text(), "One ");
        assert_eq!(div.text(), "One bold");
    }

    #[test]
    fn attr_and_missing_nodes() {
        let doc = Document::parse(SAMPLE_HTML);
        let link = doc.find_one("a").unwrap();
        assert_eq!(link.attr("href").as_deref(), Some("/title/tt0816692/?ref_=x"));
        assert!(link.attr("title").is_none());
        assert!(doc.find_one("table").is_none());
        assert!(doc.find("[[[bad").is_empty());
    }
}
