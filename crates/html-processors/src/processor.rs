//! Processors: transforms from a list of nodes to a list of nodes.
//!
//! Processors take their input by value and return the nodes that come out,
//! which lets one node turn into zero, one or many nodes. Every factory here
//! walks the whole tree depth-first and rewrites a parent's children as one
//! sequence.

use std::fmt;
use std::sync::Arc;

use crate::modify::Modifier;
use crate::node::Node;
use crate::predicate::Predicate;

type ProcessorFn = dyn Fn(Vec<Node>) -> Vec<Node> + Send + Sync;

/// A transform over a sequence of nodes
#[derive(Clone)]
pub struct Processor(Arc<ProcessorFn>);

impl Processor {
    /// Wrap a closure as a processor
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Node>) -> Vec<Node> + Send + Sync + 'static,
    {
        Processor(Arc::new(f))
    }

    /// The processor that returns its input unchanged
    pub fn identity() -> Self {
        Processor::new(|nodes| nodes)
    }

    /// Run the processor
    pub fn apply(&self, nodes: Vec<Node>) -> Vec<Node> {
        (self.0)(nodes)
    }

    /// Run `next` on the output of this processor
    pub fn then(self, next: Processor) -> Processor {
        crate::compose::join([self, next])
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Processor(..)")
    }
}

/// Lift a one-node transform to a processor, concatenating results in order
pub fn single_to_multiple<F>(f: F) -> Processor
where
    F: Fn(Node) -> Vec<Node> + Send + Sync + 'static,
{
    Processor::new(move |nodes| nodes.into_iter().flat_map(&f).collect())
}

/// Replace the children of `node` with the concatenated results of `f`
fn process_children<F>(node: &mut Node, mut f: F)
where
    F: FnMut(Node) -> Vec<Node>,
{
    if node.is_text() {
        return;
    }
    let children = node.take_children();
    let mut new_children = Vec::with_capacity(children.len());
    for child in children {
        new_children.extend(f(child));
    }
    node.set_children(new_children);
}

fn label(node: &Node) -> &str {
    match node {
        Node::Element { name, .. } => name,
        Node::Text(_) => "#text",
        Node::Document { .. } => "#document",
    }
}

/// Remove every node matching `predicate`, together with its subtree.
///
/// A node is tested before its children; once it is removed its
/// descendants are never looked at.
pub fn filter_factory(predicate: Predicate) -> Processor {
    single_to_multiple(move |node| filter_node(&predicate, node))
}

fn filter_node(predicate: &Predicate, mut node: Node) -> Vec<Node> {
    if predicate.test(&node) {
        tracing::trace!(node = label(&node), "filtered");
        return Vec::new();
    }
    process_children(&mut node, |child| filter_node(predicate, child));
    vec![node]
}

/// Replace every element or document matching `predicate` by its children.
///
/// Children are unwrapped before their parent is tested, so nested wrappers
/// all disappear in one pass. Text nodes are never unwrapped.
pub fn unwrap_factory(predicate: Predicate) -> Processor {
    single_to_multiple(move |node| unwrap_node(&predicate, node))
}

fn unwrap_node(predicate: &Predicate, mut node: Node) -> Vec<Node> {
    process_children(&mut node, |child| unwrap_node(predicate, child));
    if node.is_text() || !predicate.test(&node) {
        return vec![node];
    }
    tracing::trace!(node = label(&node), "unwrapped");
    node.take_children()
}

/// Replace each `container` by its topmost descendants matching `promote`.
///
/// Everything in the container outside a promoted subtree is dropped. The
/// promoted subtrees and all non-container nodes are processed recursively.
pub fn flatten_factory(container: Predicate, promote: Predicate) -> Processor {
    single_to_multiple(move |node| flatten_node(&container, &promote, node))
}

fn flatten_node(container: &Predicate, promote: &Predicate, mut node: Node) -> Vec<Node> {
    if !node.is_text() && container.test(&node) {
        let mut promoted = Vec::new();
        for child in node.take_children() {
            collect_promoted(container, promote, child, &mut promoted);
        }
        tracing::trace!(
            node = label(&node),
            promoted = promoted.len(),
            "flattened"
        );
        return promoted;
    }
    process_children(&mut node, |child| flatten_node(container, promote, child));
    vec![node]
}

fn collect_promoted(
    container: &Predicate,
    promote: &Predicate,
    mut node: Node,
    out: &mut Vec<Node>,
) {
    if promote.test(&node) {
        process_children(&mut node, |child| flatten_node(container, promote, child));
        out.push(node);
        return;
    }
    for child in node.take_children() {
        collect_promoted(container, promote, child, out);
    }
}

/// Split elements around children that do not belong inside them.
///
/// Children are processed first. For an element matching `can_split`,
/// consecutive children matching `is_internal` stay grouped inside the
/// element, while the other children are lifted out next to it. The first
/// group stays in the original element; later groups get a fresh element
/// with the same name and no attributes.
pub fn split_factory(can_split: Predicate, is_internal: Predicate) -> Processor {
    single_to_multiple(move |node| split_node(&can_split, &is_internal, node))
}

fn split_node(can_split: &Predicate, is_internal: &Predicate, mut node: Node) -> Vec<Node> {
    process_children(&mut node, |child| split_node(can_split, is_internal, child));
    if !node.is_element() || !can_split.test(&node) {
        return vec![node];
    }

    let name = label(&node).to_string();
    let children = node.take_children();
    let mut result = Vec::new();
    let mut current = Some(node);

    for child in children {
        if is_internal.test(&child) {
            current
                .get_or_insert_with(|| Node::element(&name))
                .add_child(child);
        } else {
            result.extend(current.take());
            result.push(child);
        }
    }
    result.extend(current);
    result
}

/// Apply `modifier` to every node, parents before children
pub fn local_modify_factory(modifier: Modifier) -> Processor {
    single_to_multiple(move |mut node| {
        modify_node(&modifier, &mut node);
        vec![node]
    })
}

fn modify_node(modifier: &Modifier, node: &mut Node) {
    modifier.apply(node);
    let mut children = node.take_children();
    for child in &mut children {
        modify_node(modifier, child);
    }
    node.set_children(children);
}

/// Fold adjacent children pairwise through `joiner`.
///
/// `joiner` receives the last kept child and the next one and returns what
/// replaces them: one node to merge, both to keep them apart. Subtrees are
/// joined before their parent.
pub fn join_children_factory<F>(joiner: F) -> Processor
where
    F: Fn(Node, Node) -> Vec<Node> + Send + Sync + 'static,
{
    single_to_multiple(move |node| vec![join_node(&joiner, node)])
}

fn join_node<F>(joiner: &F, mut node: Node) -> Node
where
    F: Fn(Node, Node) -> Vec<Node>,
{
    let children = node.take_children();
    let mut joined: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        let child = join_node(joiner, child);
        match joined.pop() {
            Some(last) => joined.extend(joiner(last, child)),
            None => joined.push(child),
        }
    }
    node.set_children(joined);
    node
}

/// Joiner that concatenates adjacent text nodes
pub fn merge_text(left: Node, right: Node) -> Vec<Node> {
    match (left, right) {
        (Node::Text(mut l), Node::Text(r)) => {
            l.push_str(&r);
            vec![Node::Text(l)]
        }
        (l, r) => vec![l, r],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modify::{modify_if, set_class};
    use crate::predicate::{
        and, has_class, has_name, is_empty, is_tag_or_document, is_text, not, or,
    };

    fn el(name: &str, children: Vec<Node>) -> Node {
        let mut node = Node::element(name);
        node.set_children(children);
        node
    }

    fn text(s: &str) -> Node {
        Node::text(s)
    }

    fn html(nodes: &[Node]) -> String {
        nodes.iter().map(Node::outer_html).collect()
    }

    #[test]
    fn test_single_to_multiple() {
        let twice = single_to_multiple(|node| vec![node.clone(), node]);
        let out = twice.apply(vec![text("a"), text("b")]);
        assert_eq!(html(&out), "aabb");
    }

    #[test]
    fn test_filter_removes_subtree() {
        let input = el(
            "html",
            vec![
                el("div", vec![text("a"), el("span", vec![text("b")]), text(" ")]),
                el("p", vec![el("span", vec![text("x")])]),
                el("a", vec![]),
            ],
        );
        let out = filter_factory(has_name(["span", "a"])).apply(vec![input]);
        assert_eq!(html(&out), "<html><div>a </div><p></p></html>");
    }

    #[test]
    fn test_filter_top_level() {
        let out = filter_factory(has_name(["a"])).apply(vec![el("a", vec![]), text("t")]);
        assert_eq!(html(&out), "t");
    }

    #[test]
    fn test_filter_does_not_visit_removed_children() {
        let visited = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&visited);
        let p = Predicate::new(move |node| {
            if let Ok(mut seen) = seen.lock() {
                seen.push(label(node).to_string());
            }
            node.name() == Some("x")
        });
        filter_factory(p).apply(vec![el("root", vec![el("x", vec![el("inner", vec![])])])]);
        let visited = visited.lock().unwrap().clone();
        assert_eq!(visited, ["root", "x"]);
    }

    #[test]
    fn test_filter_idempotent() {
        let input = el(
            "div",
            vec![text("a"), el("font", vec![text(" ")]), el("font", vec![text("b")])],
        );
        let filter = filter_factory(and([has_name(["font"]), is_empty()]));
        let once = filter.apply(vec![input]);
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
        assert_eq!(html(&once), "<div>a<font>b</font></div>");
    }

    #[test]
    fn test_unwrap() {
        let input = el(
            "root",
            vec![
                el("x", vec![text("hello")]),
                text(" after x "),
                el("b", vec![text(" in b")]),
            ],
        );
        let out = unwrap_factory(has_name(["x"])).apply(vec![input]);
        assert_eq!(html(&out), "<root>hello after x <b> in b</b></root>");
    }

    #[test]
    fn test_unwrap_nested() {
        let input = el(
            "root",
            vec![
                el(
                    "x",
                    vec![
                        text("hello "),
                        el("a", vec![text(" in a "), el("x", vec![text("in x2")]), text(" after")]),
                    ],
                ),
                text(" 22 "),
            ],
        );
        let out = unwrap_factory(has_name(["x"])).apply(vec![input]);
        assert_eq!(html(&out), "<root>hello <a> in a in x2 after</a> 22 </root>");
    }

    #[test]
    fn test_unwrap_double_wrapper() {
        let input = el("font", vec![el("font", vec![text("text")])]);
        let unwrap = unwrap_factory(has_name(["font"]));
        let out = unwrap.apply(vec![input]);
        assert_eq!(out, vec![text("text")]);
        assert_eq!(unwrap.apply(out.clone()), out);
    }

    #[test]
    fn test_unwrap_mixed_wrappers() {
        let wrapper = or([has_name(["font"]), and([has_name(["div"]), has_class(["w"])])]);
        let mut div = Node::element_with_attrs("div", vec![("class", "w")]);
        div.set_children(vec![el("font", vec![text("a")]), text("b")]);
        let out = unwrap_factory(wrapper).apply(vec![el("p", vec![div, text("c")])]);
        assert_eq!(html(&out), "<p>abc</p>");
    }

    #[test]
    fn test_unwrap_keeps_text() {
        let out = unwrap_factory(is_text()).apply(vec![el("p", vec![text("t")])]);
        assert_eq!(html(&out), "<p>t</p>");
    }

    #[test]
    fn test_flatten_promotes_selected() {
        let input = el(
            "body",
            vec![
                text("before"),
                el(
                    "table",
                    vec![el(
                        "tr",
                        vec![
                            el("td", vec![el("p", vec![text("one")]), text("junk")]),
                            el("td", vec![el("p", vec![text("two")])]),
                        ],
                    )],
                ),
                text("after"),
            ],
        );
        let out = flatten_factory(has_name(["table"]), has_name(["p"])).apply(vec![input]);
        assert_eq!(html(&out), "<body>before<p>one</p><p>two</p>after</body>");
    }

    #[test]
    fn test_flatten_topmost_only_and_recursive() {
        let inner_table = el("table", vec![el("p", vec![text("deep")]), text("x")]);
        let input = el(
            "table",
            vec![el("p", vec![text("keep "), el("p", vec![text("nested")]), inner_table])],
        );
        let out = flatten_factory(has_name(["table"]), has_name(["p"])).apply(vec![input]);
        assert_eq!(html(&out), "<p>keep <p>nested</p><p>deep</p></p>");
    }

    #[test]
    fn test_flatten_without_matches_drops_container() {
        let input = el("div", vec![el("table", vec![text("gone")]), text("stay")]);
        let out = flatten_factory(has_name(["table"]), has_name(["p"])).apply(vec![input]);
        assert_eq!(html(&out), "<div>stay</div>");
    }

    fn block_split() -> Processor {
        let can_split = not(has_name(["a", "body", "html"])) & not(is_text());
        let is_internal = not(has_name(["div", "p", "br"]))
            & not(and([has_name(["a"]), has_class(["block_a"])]));
        split_factory(can_split, is_internal)
    }

    #[test]
    fn test_split_around_block() {
        let mut div = Node::element_with_attrs("div", vec![("id", "1")]);
        div.set_children(vec![
            text(" a "),
            Node::element_with_attrs("br", vec![("id", "2")]),
            text(" b"),
        ]);
        let out = block_split().apply(vec![div]);
        assert_eq!(html(&out), "<div id=\"1\"> a </div><br id=\"2\"><div> b</div>");
    }

    #[test]
    fn test_split_block_first() {
        let mut a = Node::element_with_attrs("a", vec![("class", "block_a")]);
        a.set_children(vec![el("div", vec![text("inside a")])]);
        let mut div = Node::element_with_attrs("div", vec![("id", "1")]);
        div.set_children(vec![a]);
        let out = block_split().apply(vec![div]);
        assert_eq!(
            html(&out),
            "<div id=\"1\"></div><a class=\"block_a\"><div>inside a</div></a>"
        );
    }

    #[test]
    fn test_split_keeps_document() {
        let doc = Node::document_with(vec![el("p", vec![text("x")])]);
        let out = split_factory(is_tag_or_document(), has_name(["none"])).apply(vec![doc.clone()]);
        assert_eq!(out, vec![doc]);
    }

    #[test]
    fn test_local_modify() {
        let modifier = modify_if(set_class("seen"), has_name(["span"]));
        let input = el("div", vec![el("span", vec![]), el("p", vec![el("span", vec![])])]);
        let out = local_modify_factory(modifier).apply(vec![input]);
        assert_eq!(
            html(&out),
            "<div><span class=\"seen\"></span><p><span class=\"seen\"></span></p></div>"
        );
    }

    #[test]
    fn test_merge_text() {
        let input = el(
            "p",
            vec![text("a"), text("b"), el("i", vec![text("c"), text("d")]), text("e")],
        );
        let out = join_children_factory(merge_text).apply(vec![input]);
        let p = &out[0];
        assert_eq!(p.children().len(), 3);
        assert_eq!(p.children()[0].as_text(), Some("ab"));
        assert_eq!(p.children()[1].children().len(), 1);
    }

    #[test]
    fn test_then_order() {
        let add_x = single_to_multiple(|node| vec![node, text("x")]);
        let drop_x = filter_factory(Predicate::new(|n| n.as_text() == Some("x")));
        assert_eq!(add_x.clone().then(drop_x.clone()).apply(vec![text("a")]), vec![text("a")]);
        assert_eq!(html(&drop_x.then(add_x).apply(vec![text("a")])), "ax");
    }
}
