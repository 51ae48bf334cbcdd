//! # html-processors
//!
//! Composable predicates and processors for cleaning parsed HTML trees.
//!
//! ## Design
//!
//! A document is an owned [`Node`] tree. Two kinds of values work on it:
//!
//! - **Predicates** test a single node (`has_name`, `has_class`,
//!   `is_empty`, ...) and combine with `and`, `or` and `not`.
//! - **Processors** turn a list of nodes into a list of nodes. Factories
//!   build the usual rewrites out of predicates: `filter` removes subtrees,
//!   `unwrap` replaces a node by its children and `flatten` keeps only
//!   selected descendants of a container.
//!
//! Processors are chained with [`join`] into a single pipeline. Pipelines can
//! also be described in TOML, see [`PipelineConfig`].
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use html_processors::predicate::{and, has_name, is_empty};
//! use html_processors::processor::filter_factory;
//! use html_processors::Node;
//!
//! let mut div = Node::element("div");
//! div.add_child(Node::text("kept"));
//! div.add_child(Node::element("font"));
//!
//! let remove_empty_font = filter_factory(and([has_name(["font"]), is_empty()]));
//! let result = remove_empty_font.apply(vec![div]);
//! assert_eq!(result[0].outer_html(), "<div>kept</div>");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use html_processors::predicate::has_name;
//! use html_processors::processor::unwrap_factory;
//! use html_processors::process_html;
//!
//! let unwrap_font = unwrap_factory(has_name(["font"]));
//! let html = process_html(&unwrap_font, "<p><font><font>text</font></font></p>");
//! assert_eq!(html, "<p>text</p>");
//! ```

pub mod compose;
pub mod config;
#[cfg(feature = "html")]
pub mod html;
pub mod modify;
pub mod node;
pub mod predicate;
pub mod presets;
pub mod processor;

pub use compose::join;
pub use config::{PipelineConfig, PredicateConfig, StepConfig};
#[cfg(feature = "html")]
pub use html::{parse_document, parse_html, process_html};
pub use modify::{Modifier, NameSource};
pub use node::{AttrValue, Attributes, Node, NodeType};
pub use predicate::Predicate;
pub use processor::Processor;

/// Error type for building predicates and pipelines
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    #[error("Invalid step {index}: {source}")]
    InvalidStep {
        index: usize,
        source: Box<ProcessorError>,
    },

    #[error("Invalid pipeline config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
