//! Owned document tree used by predicates and processors.
//!
//! A tree is a single ownership hierarchy: every child lives in its parent's
//! `Vec<Node>`. Processors take nodes by value and hand back the nodes that
//! survive, so a removed subtree is simply dropped. Children are always
//! replaced as a whole sequence (see [`Node::set_children`]).

use std::fmt;

use indexmap::IndexMap;

/// Node variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Document root
    Document,
    /// Element (tag) node
    Element,
    /// Text node
    Text,
}

/// An attribute value: either a plain string or a list of tokens.
///
/// Multi-valued attributes such as `class` are stored as lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Single(String),
    List(Vec<String>),
}

impl AttrValue {
    /// All values, a single value being a one element slice
    pub fn values(&self) -> &[String] {
        match self {
            AttrValue::Single(value) => std::slice::from_ref(value),
            AttrValue::List(values) => values,
        }
    }

    /// Check whether any value equals `value`
    pub fn contains(&self, value: &str) -> bool {
        self.values().iter().any(|v| v == value)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Single(value) => f.write_str(value),
            AttrValue::List(values) => f.write_str(&values.join(" ")),
        }
    }
}

/// Ordered attribute map
pub type Attributes = IndexMap<String, AttrValue>;

/// Attributes that hold a whitespace separated list of tokens
const LIST_ATTRIBUTES: &[&str] = &["class", "rel", "rev", "accept-charset", "headers", "accesskey"];

/// Build an attribute value, splitting list attributes on whitespace
pub fn attr_value(name: &str, value: &str) -> AttrValue {
    if LIST_ATTRIBUTES.contains(&name) {
        AttrValue::List(value.split_whitespace().map(str::to_string).collect())
    } else {
        AttrValue::Single(value.to_string())
    }
}

/// A node of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Root container, no name and no attributes
    Document { children: Vec<Node> },
    /// A tag with its attributes and children
    Element {
        name: String,
        attributes: Attributes,
        children: Vec<Node>,
    },
    /// Literal text
    Text(String),
}

impl Node {
    /// Create an empty document node
    pub fn document() -> Self {
        Node::Document {
            children: Vec::new(),
        }
    }

    /// Create a document node holding `children`
    pub fn document_with(children: Vec<Node>) -> Self {
        Node::Document { children }
    }

    /// Create a new element node
    pub fn element(name: &str) -> Self {
        Node::Element {
            name: name.to_string(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let attributes = attrs
            .into_iter()
            .map(|(k, v)| (k.to_string(), attr_value(k, v)))
            .collect();

        Node::Element {
            name: name.to_string(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Document { .. } => NodeType::Document,
            Node::Element { .. } => NodeType::Element,
            Node::Text(_) => NodeType::Text,
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. })
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Check if this is a document node
    pub fn is_document(&self) -> bool {
        matches!(self, Node::Document { .. })
    }

    /// Element name, `None` for documents and text
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Rename an element; other variants are left alone
    pub fn set_name(&mut self, new_name: &str) {
        if let Node::Element { name, .. } = self {
            *name = new_name.to_string();
        }
    }

    /// Text content of a text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Node::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Node::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes()?.get(name)
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: AttrValue) {
        if let Some(attributes) = self.attributes_mut() {
            attributes.insert(name.to_string(), value);
        }
    }

    /// Class tokens of an element (empty for anything else)
    pub fn classes(&self) -> &[String] {
        self.attr("class").map(AttrValue::values).unwrap_or(&[])
    }

    /// Get all child nodes
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children } | Node::Element { children, .. } => children,
            Node::Text(_) => &[],
        }
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().iter().filter(|n| n.is_element())
    }

    /// Add a child node. Text nodes cannot hold children and ignore the call.
    pub fn add_child(&mut self, child: Node) {
        if let Node::Document { children } | Node::Element { children, .. } = self {
            children.push(child);
        }
    }

    /// Replace the whole children sequence at once
    pub fn set_children(&mut self, new_children: Vec<Node>) {
        if let Node::Document { children } | Node::Element { children, .. } = self {
            *children = new_children;
        }
    }

    /// Detach and return all children, leaving the node empty
    pub fn take_children(&mut self) -> Vec<Node> {
        match self {
            Node::Document { children } | Node::Element { children, .. } => {
                std::mem::take(children)
            }
            Node::Text(_) => Vec::new(),
        }
    }

    /// A copy of this node without its children
    pub fn shallow_clone(&self) -> Node {
        match self {
            Node::Document { .. } => Node::document(),
            Node::Element {
                name, attributes, ..
            } => Node::Element {
                name: name.clone(),
                attributes: attributes.clone(),
                children: Vec::new(),
            },
            Node::Text(text) => Node::Text(text.clone()),
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            _ => self
                .children()
                .iter()
                .map(|child| child.text_content())
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// Serialize the node and its subtree as HTML.
    ///
    /// Text is escaped, except inside raw text elements such as `script`
    /// and `style`, whose content is written as is.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    /// Serialize the children as HTML
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_children(&mut out);
        out
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self {
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => out.push_str(&escape_html_text(text)),
            Node::Element { name, .. } => {
                out.push('<');
                out.push_str(name);
                let attrs = self.attributes_string();
                if !attrs.is_empty() {
                    out.push(' ');
                    out.push_str(&attrs);
                }
                out.push('>');

                if is_void_element(name) && self.children().is_empty() {
                    return;
                }
                self.write_children(out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Node::Document { .. } => self.write_children(out),
        }
    }

    fn write_children(&self, out: &mut String) {
        let raw_text = self.name().is_some_and(is_raw_text_element);
        for child in self.children() {
            child.write_html(out, raw_text);
        }
    }

    /// Get attributes as a string for HTML output
    fn attributes_string(&self) -> String {
        let Some(attrs) = self.attributes() else {
            return String::new();
        };

        attrs
            .iter()
            .map(|(name, value)| {
                let value = value.to_string();
                if value.is_empty() && !matches!(name.as_str(), "class" | "id") {
                    name.clone()
                } else {
                    format!("{}=\"{}\"", name, escape_html_attr(&value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_html())
    }
}

/// Check if a tag is a void element
fn is_void_element(name: &str) -> bool {
    const VOID_ELEMENTS: &[&str] = &[
        "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen",
        "link", "meta", "param", "source", "track", "wbr",
    ];
    VOID_ELEMENTS.contains(&name)
}

/// Elements whose text children are serialized without escaping
fn is_raw_text_element(name: &str) -> bool {
    const RAW_TEXT_ELEMENTS: &[&str] = &[
        "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
    ];
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// Escape text content
fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
