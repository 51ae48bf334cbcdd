//! Ready-made predicates and processors for cleaning exported HTML.
//!
//! [`cleanup`] strings them together: block links are marked, `font`
//! wrappers are unwrapped, block elements are lifted out of inline
//! parents, empty paragraphs and line breaks are removed and consecutive
//! single-list paragraphs are joined.

use crate::compose::join;
use crate::modify::{modify_if, set_class, Modifier};
use crate::node::Node;
use crate::predicate::{
    and, has_class, has_descendants_named, has_name, is_empty, not, or, Predicate,
};
use crate::processor::{
    filter_factory, join_children_factory, local_modify_factory, split_factory, unwrap_factory,
    Processor,
};

/// Class marking an `a` that holds block content
pub const BLOCK_LINK_CLASS: &str = "block_a";

/// Elements that keep all of their children when blocks are split out
pub const HOLD_ALL_CHILDREN: &[&str] = &["html", "body", "header", "a"];

/// Block elements lifted out of their parent
pub const BLOCKS_THAT_POP_OUT: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "hr", "br",
];

/// Elements removed when they hold no text
pub const REMOVE_WHEN_EMPTY: &[&str] = &["p", "div"];

/// Elements removed whatever they hold
pub const ALWAYS_REMOVE: &[&str] = &["br"];

/// Wrapper elements replaced by their content
pub const UNWRAP_ELEMENTS: &[&str] = &["font"];

/// Elements whose children may be split out
pub fn should_split() -> Predicate {
    and([
        Predicate::new(Node::is_element),
        not(has_name(HOLD_ALL_CHILDREN.iter().copied())),
    ])
}

/// Nodes that stay inside their parent when it is split
pub fn is_internal() -> Predicate {
    not(or([
        has_name(BLOCKS_THAT_POP_OUT.iter().copied()),
        and([has_name(["a"]), has_class([BLOCK_LINK_CLASS])]),
    ]))
}

/// Mark `a` elements that contain a block element with [`BLOCK_LINK_CLASS`]
pub fn mark_block_links() -> Modifier {
    modify_if(
        set_class(BLOCK_LINK_CLASS),
        and([
            has_name(["a"]),
            has_descendants_named(BLOCKS_THAT_POP_OUT.iter().copied()),
        ]),
    )
}

/// Unwrap presentational wrappers such as `font`
pub fn unwrap_wrappers() -> Processor {
    unwrap_factory(has_name(UNWRAP_ELEMENTS.iter().copied()))
}

/// Remove line breaks and empty paragraphs
pub fn remove_unwanted() -> Processor {
    filter_factory(or([
        has_name(ALWAYS_REMOVE.iter().copied()),
        and([has_name(REMOVE_WHEN_EMPTY.iter().copied()), is_empty()]),
    ]))
}

/// Lift block elements out of the inline elements holding them
pub fn split_blocks() -> Processor {
    split_factory(should_split(), is_internal())
}

/// The single `ul` of a paragraph made of one list and whitespace
fn single_list(node: &Node) -> Option<&Node> {
    if node.name() != Some("p") {
        return None;
    }
    let mut elements = node.element_children();
    let list = elements.next()?;
    let only_whitespace = node
        .children()
        .iter()
        .filter(|child| child.is_text())
        .all(|child| child.text_content().trim().is_empty());
    (list.name() == Some("ul") && elements.next().is_none() && only_whitespace).then_some(list)
}

/// Joiner merging two adjacent paragraphs that each hold a single `ul`
/// into one paragraph with one list.
pub fn join_lists(left: Node, right: Node) -> Vec<Node> {
    let right_items = match (single_list(&left), single_list(&right)) {
        (Some(_), Some(list)) => Some(list.children().to_vec()),
        _ => None,
    };
    let Some(right_items) = right_items else {
        return vec![left, right];
    };

    let mut left = left;
    let mut children = left.take_children();
    if let Some(list) = children.iter_mut().find(|child| child.name() == Some("ul")) {
        let mut items = list.take_children();
        items.extend(right_items);
        list.set_children(items);
    }
    left.set_children(children);
    vec![left]
}

/// The complete cleanup pipeline
pub fn cleanup() -> Processor {
    join([
        local_modify_factory(mark_block_links()),
        unwrap_wrappers(),
        split_blocks(),
        remove_unwanted(),
        join_children_factory(join_lists),
    ])
}
