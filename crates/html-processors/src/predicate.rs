//! Predicates over tree nodes.
//!
//! A [`Predicate`] is a cheap to clone, thread safe `Fn(&Node) -> bool`.
//! Every predicate is total: variants it does not apply to yield `false`.
//!
//! ```rust
//! use html_processors::predicate::{and, has_name, is_empty};
//! use html_processors::Node;
//!
//! let empty_font = and([has_name(["font"]), is_empty()]);
//! assert!(empty_font.test(&Node::element("font")));
//! assert!(!empty_font.test(&Node::element("div")));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::ops;
use std::sync::Arc;

use regex::Regex;

use crate::node::Node;
use crate::Result;

type PredicateFn = dyn Fn(&Node) -> bool + Send + Sync;

/// A boolean test over a single node
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wrap a closure as a predicate
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    /// Run the predicate on a node
    pub fn test(&self, node: &Node) -> bool {
        (self.0)(node)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        not(self)
    }
}

impl ops::BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        and([self, rhs])
    }
}

impl ops::BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        or([self, rhs])
    }
}

fn name_set<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Always true
pub fn always() -> Predicate {
    Predicate::new(|_| true)
}

/// Always false
pub fn never() -> Predicate {
    Predicate::new(|_| false)
}

/// Negate a predicate
pub fn not(predicate: Predicate) -> Predicate {
    Predicate::new(move |node| !predicate.test(node))
}

/// True when every predicate holds; stops at the first failure.
///
/// With no predicates the result is always true.
pub fn and<I>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = Predicate>,
{
    let predicates: Vec<Predicate> = predicates.into_iter().collect();
    Predicate::new(move |node| predicates.iter().all(|p| p.test(node)))
}

/// True when any predicate holds; stops at the first success.
///
/// With no predicates the result is always false.
pub fn or<I>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = Predicate>,
{
    let predicates: Vec<Predicate> = predicates.into_iter().collect();
    Predicate::new(move |node| predicates.iter().any(|p| p.test(node)))
}

/// Element or document
pub fn is_tag_or_document() -> Predicate {
    Predicate::new(|node| !node.is_text())
}

pub fn is_tag() -> Predicate {
    Predicate::new(Node::is_element)
}

pub fn is_document() -> Predicate {
    Predicate::new(Node::is_document)
}

pub fn is_text() -> Predicate {
    Predicate::new(Node::is_text)
}

/// Elements whose name is one of `names` (exact match)
pub fn has_name<I, S>(names: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names = name_set(names);
    Predicate::new(move |node| node.name().is_some_and(|name| names.contains(name)))
}

/// Elements whose name is one of `names`, ignoring ASCII case
pub fn has_name_ignore_case<I, S>(names: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: HashSet<String> = names
        .into_iter()
        .map(|n| n.into().to_ascii_lowercase())
        .collect();
    Predicate::new(move |node| {
        node.name()
            .is_some_and(|name| names.contains(&name.to_ascii_lowercase()))
    })
}

/// Elements whose whole name matches the regular expression `pattern`.
///
/// Fails when `pattern` does not compile.
pub fn has_name_matching(pattern: &str) -> Result<Predicate> {
    let re = Regex::new(&format!("^(?:{})$", pattern))?;
    Ok(Predicate::new(move |node| {
        node.name().is_some_and(|name| re.is_match(name))
    }))
}

/// Elements carrying at least one of `classes`
pub fn has_class<I, S>(classes: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let classes = name_set(classes);
    Predicate::new(move |node| node.classes().iter().any(|c| classes.contains(c)))
}

/// Elements with any attribute named in `names`
pub fn has_attribute<I, S>(names: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names = name_set(names);
    Predicate::new(move |node| {
        node.attributes()
            .is_some_and(|attrs| attrs.keys().any(|k| names.contains(k)))
    })
}

/// Elements with an attribute named in `names` holding a value in `values`.
///
/// List attributes match when any of their tokens is in `values`.
pub fn has_attribute_value<I, S, J, T>(names: I, values: J) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    J: IntoIterator<Item = T>,
    T: Into<String>,
{
    let names = name_set(names);
    let values = name_set(values);
    Predicate::new(move |node| {
        node.attributes().is_some_and(|attrs| {
            attrs.iter().any(|(name, value)| {
                names.contains(name) && value.values().iter().any(|v| values.contains(v))
            })
        })
    })
}

/// Elements or documents with a direct child element named in `names`
pub fn has_children_named<I, S>(names: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names = name_set(names);
    Predicate::new(move |node| {
        node.element_children()
            .any(|child| child.name().is_some_and(|n| names.contains(n)))
    })
}

/// Elements or documents with a descendant element, at any depth, named in `names`
pub fn has_descendants_named<I, S>(names: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn search(node: &Node, names: &HashSet<String>) -> bool {
        node.element_children().any(|child| {
            child.name().is_some_and(|n| names.contains(n)) || search(child, names)
        })
    }

    let names = name_set(names);
    Predicate::new(move |node| search(node, &names))
}

/// Whitespace-only text, or containers whose text is all whitespace
pub fn is_empty() -> Predicate {
    Predicate::new(node_is_empty)
}

pub(crate) fn node_is_empty(node: &Node) -> bool {
    match node {
        Node::Text(text) => text.trim().is_empty(),
        Node::Element { children, .. } | Node::Document { children } => {
            children.iter().all(node_is_empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn samples() -> Vec<Node> {
        let mut font = Node::element_with_attrs("font", vec![("class", "c1 c2"), ("id", "f")]);
        font.add_child(Node::text(" "));
        let mut div = Node::element("div");
        div.add_child(Node::text("text"));
        div.add_child(font.clone());
        vec![
            Node::document_with(vec![div.clone()]),
            div,
            font,
            Node::text("  \n  "),
            Node::text("a "),
        ]
    }

    fn counting(result: bool, counter: &Arc<AtomicUsize>) -> Predicate {
        let counter = Arc::clone(counter);
        Predicate::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    #[test]
    fn test_empty_combinators() {
        for node in samples() {
            assert!(and([]).test(&node));
            assert!(!or([]).test(&node));
        }
    }

    #[test]
    fn test_double_negation() {
        let predicates = [has_name(["font"]), is_empty(), has_class(["c2"]), is_text()];
        for p in predicates {
            let twice = not(not(p.clone()));
            for node in samples() {
                assert_eq!(twice.test(&node), p.test(&node));
            }
        }
    }

    #[test]
    fn test_and_short_circuits() {
        let counter = Arc::new(AtomicUsize::new(0));
        let p = and([counting(false, &counter), counting(true, &counter)]);
        assert!(!p.test(&Node::text("x")));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_or_short_circuits() {
        let counter = Arc::new(AtomicUsize::new(0));
        let p = or([counting(true, &counter), counting(false, &counter)]);
        assert!(p.test(&Node::text("x")));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_operators() {
        let font = Node::element("font");
        assert!((has_name(["font"]) & is_empty()).test(&font));
        assert!((never() | has_name(["font"])).test(&font));
        assert!(!(!always()).test(&font));
    }

    #[test]
    fn test_has_name_is_exact() {
        let p = has_name(["span", "a"]);
        assert!(p.test(&Node::element("span")));
        assert!(!p.test(&Node::element("SPAN")));
        assert!(!p.test(&Node::text("span")));
        assert!(!p.test(&Node::document()));
    }

    #[test]
    fn test_has_name_ignore_case() {
        let p = has_name_ignore_case(["Span"]);
        assert!(p.test(&Node::element("SPAN")));
        assert!(p.test(&Node::element("span")));
        assert!(!p.test(&Node::element("x")));
    }

    #[test]
    fn test_has_name_matching() {
        let p = has_name_matching("h[1-6]").unwrap();
        assert!(p.test(&Node::element("h3")));
        assert!(!p.test(&Node::element("h7")));
        assert!(!p.test(&Node::element("th1")));
        assert!(has_name_matching("(").is_err());
    }

    #[test]
    fn test_has_class() {
        let span = Node::element_with_attrs("span", vec![("class", "c1 c2 c3")]);
        let div = Node::element_with_attrs("div", vec![("id", "d1")]);
        assert!(has_class(["c2"]).test(&span));
        assert!(has_class(["c5", "c2"]).test(&span));
        assert!(!has_class(["c5", "c6"]).test(&span));
        assert!(!has_class(["c2"]).test(&div));
        assert!(!has_class(["c2"]).test(&Node::text("c2")));
    }

    #[test]
    fn test_has_attribute() {
        let span = Node::element_with_attrs("span", vec![("id", "s1"), ("class", "c1")]);
        let div = Node::element_with_attrs("div", vec![("data-x", "abc"), ("id", "d1")]);
        assert!(has_attribute(["id"]).test(&div));
        assert!(has_attribute(["class", "data-w"]).test(&span));
        assert!(!has_attribute(["class", "data-w"]).test(&div));

        assert!(has_attribute_value(["id"], ["s1"]).test(&span));
        assert!(!has_attribute_value(["id"], ["s1"]).test(&div));
        assert!(has_attribute_value(["id", "data-w"], ["s1", "d1"]).test(&div));
        assert!(has_attribute_value(["class"], ["c1"]).test(&span));
    }

    #[test]
    fn test_children_and_descendants() {
        let mut inner = Node::element("div");
        inner.add_child(Node::element("p"));
        let mut outer = Node::element("html");
        outer.add_child(Node::element("span"));
        outer.add_child(inner);

        assert!(has_children_named(["span"]).test(&outer));
        assert!(has_children_named(["div"]).test(&outer));
        assert!(!has_children_named(["p"]).test(&outer));
        assert!(has_descendants_named(["p"]).test(&outer));
        assert!(!has_descendants_named(["a"]).test(&outer));
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty().test(&Node::text("  \n  ")));
        assert!(is_empty().test(&Node::text("")));
        assert!(!is_empty().test(&Node::text("a ")));

        let mut font = Node::element("font");
        font.add_child(Node::text(" "));
        let mut outer = Node::element("div");
        outer.add_child(font);
        assert!(is_empty().test(&outer));

        outer.add_child(Node::text("x"));
        assert!(!is_empty().test(&outer));
    }

    #[test]
    fn test_variant_predicates() {
        let doc = Node::document();
        let el = Node::element("p");
        let text = Node::text("t");
        assert!(is_tag_or_document().test(&doc));
        assert!(is_tag_or_document().test(&el));
        assert!(!is_tag_or_document().test(&text));
        assert!(is_tag().test(&el) && !is_tag().test(&doc));
        assert!(is_document().test(&doc) && !is_document().test(&el));
        assert!(is_text().test(&text) && !is_text().test(&el));
    }
}
