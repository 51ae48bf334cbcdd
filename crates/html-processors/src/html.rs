//! HTML parsing support.
//!
//! This module parses HTML strings with scraper and converts the result to
//! the owned [`Node`] tree the processors work on.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::{attr_value, Attributes, Node};
use crate::processor::Processor;

/// Parse an HTML fragment into a document node.
///
/// The returned [`Node::Document`] holds the fragment's top-level nodes in
/// order. Comments and processing instructions are dropped.
///
/// # Depth
///
/// Conversion, the processors and serialization all recurse once per level
/// of nesting, so the depth a tree can have is bounded by the thread's
/// stack. A few thousand nested elements overflow the default 2 MiB stack of
/// a spawned thread; run untrusted input on a thread with a larger stack.
///
/// # Example
///
/// ```rust
/// use html_processors::parse_html;
///
/// let doc = parse_html("<p>Hello <em>World</em></p>");
/// assert_eq!(doc.outer_html(), "<p>Hello <em>World</em></p>");
/// ```
pub fn parse_html(html: &str) -> Node {
    let fragment = Html::parse_fragment(html);
    Node::document_with(convert_children(fragment.root_element()))
}

/// Parse a complete HTML document.
///
/// The returned document holds the `html` element, with `head` and `body`
/// filled in the way html5ever does.
pub fn parse_document(html: &str) -> Node {
    let document = Html::parse_document(html);
    Node::document_with(vec![scraper_to_node(document.root_element())])
}

/// Parse `html`, run `processor` over it and serialize what comes out.
///
/// Every node the processor returns is serialized, in order.
pub fn process_html(processor: &Processor, html: &str) -> String {
    let document = parse_html(html);
    let result = processor.apply(vec![document]);
    tracing::debug!(
        input_len = html.len(),
        output_nodes = result.len(),
        "processed html fragment"
    );
    result.iter().map(Node::outer_html).collect()
}

/// Convert a scraper ElementRef to our Node structure
fn scraper_to_node(element: ElementRef) -> Node {
    let value = element.value();

    let attributes: Attributes = value
        .attrs
        .iter()
        .map(|(name, v)| {
            let name = match &name.prefix {
                Some(prefix) => format!("{}:{}", prefix, name.local),
                None => name.local.to_string(),
            };
            let v = attr_value(&name, v);
            (name, v)
        })
        .collect();

    Node::Element {
        name: value.name().to_string(),
        attributes,
        children: convert_children(element),
    }
}

fn convert_children(element: ElementRef) -> Vec<Node> {
    let mut children = Vec::new();

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                children.push(Node::text(&text.text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    children.push(scraper_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    children
}
