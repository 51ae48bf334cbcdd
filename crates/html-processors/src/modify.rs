//! In-place edits of a single node, run over a tree by
//! [`local_modify_factory`](crate::processor::local_modify_factory).
//!
//! Class and tag-name modifiers take a [`NameSource`]: a fixed string, or a
//! function computing the name from the node being edited. All of them
//! leave documents and text untouched.

use std::fmt;
use std::sync::Arc;

use crate::node::{AttrValue, Node};
use crate::predicate::Predicate;

type ModifierFn = dyn Fn(&mut Node) + Send + Sync;

/// An in-place edit of one node
#[derive(Clone)]
pub struct Modifier(Arc<ModifierFn>);

impl Modifier {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Node) + Send + Sync + 'static,
    {
        Modifier(Arc::new(f))
    }

    pub fn apply(&self, node: &mut Node) {
        (self.0)(node)
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Modifier(..)")
    }
}

/// Where a class or tag name comes from
#[derive(Clone)]
pub enum NameSource {
    Fixed(String),
    Computed(Arc<dyn Fn(&Node) -> String + Send + Sync>),
}

impl NameSource {
    /// Compute the name from the node
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Node) -> String + Send + Sync + 'static,
    {
        NameSource::Computed(Arc::new(f))
    }

    pub fn resolve(&self, node: &Node) -> String {
        match self {
            NameSource::Fixed(name) => name.clone(),
            NameSource::Computed(f) => f(node),
        }
    }
}

impl From<&str> for NameSource {
    fn from(name: &str) -> Self {
        NameSource::Fixed(name.to_string())
    }
}

impl From<String> for NameSource {
    fn from(name: String) -> Self {
        NameSource::Fixed(name)
    }
}

/// Run `modifier` only on nodes matching `predicate`
pub fn modify_if(modifier: Modifier, predicate: Predicate) -> Modifier {
    Modifier::new(move |node| {
        if predicate.test(node) {
            modifier.apply(node);
        }
    })
}

/// Rewrite the class list of an element through `edit`
fn edit_classes<F>(node: &mut Node, edit: F)
where
    F: FnOnce(Option<Vec<String>>) -> Vec<String>,
{
    if !node.is_element() {
        return;
    }
    let current = node.attr("class").map(|value| value.values().to_vec());
    let updated = edit(current);
    node.set_attr("class", AttrValue::List(updated));
}

/// Add the class when missing, remove it when present
pub fn toggle_class(class_name: impl Into<NameSource>) -> Modifier {
    let source = class_name.into();
    Modifier::new(move |node| {
        let class_name = source.resolve(node);
        edit_classes(node, |classes| match classes {
            None => vec![class_name],
            Some(classes) if classes.contains(&class_name) => {
                classes.into_iter().filter(|c| *c != class_name).collect()
            }
            Some(mut classes) => {
                classes.push(class_name);
                classes
            }
        });
    })
}

/// Remove every occurrence of the class; elements without a class
/// attribute are left as they are
pub fn remove_class(class_name: impl Into<NameSource>) -> Modifier {
    let source = class_name.into();
    Modifier::new(move |node| {
        if !node.has_attr("class") {
            return;
        }
        let class_name = source.resolve(node);
        edit_classes(node, |classes| {
            classes
                .unwrap_or_default()
                .into_iter()
                .filter(|c| *c != class_name)
                .collect()
        });
    })
}

/// Add the class unless already present
pub fn set_class(class_name: impl Into<NameSource>) -> Modifier {
    let source = class_name.into();
    Modifier::new(move |node| {
        let class_name = source.resolve(node);
        edit_classes(node, |classes| {
            let mut classes = classes.unwrap_or_default();
            if !classes.contains(&class_name) {
                classes.push(class_name);
            }
            classes
        });
    })
}

/// Append the class, even if already present
pub fn add_class(class_name: impl Into<NameSource>) -> Modifier {
    let source = class_name.into();
    Modifier::new(move |node| {
        let class_name = source.resolve(node);
        edit_classes(node, |classes| {
            let mut classes = classes.unwrap_or_default();
            classes.push(class_name);
            classes
        });
    })
}

/// Rename the element (e.g. `div` to `p`)
pub fn change_tag_name(tag_name: impl Into<NameSource>) -> Modifier {
    let source = tag_name.into();
    Modifier::new(move |node| {
        if node.is_element() {
            let name = source.resolve(node);
            node.set_name(&name);
        }
    })
}
