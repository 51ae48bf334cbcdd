//! Declarative pipelines read from TOML.
//!
//! ```toml
//! [[step]]
//! action = "unwrap"
//! when = { any = [{ name = ["font"] }, { all = [{ name = ["div"] }, { class = ["useless"] }] }] }
//!
//! [[step]]
//! action = "filter"
//! when = { all = [{ name = ["font"] }, "empty"] }
//! ```
//!
//! [`PipelineConfig::build`] turns the steps into one [`Processor`] and
//! rejects descriptions that could never match anything.

use serde::Deserialize;

use crate::compose::join;
use crate::predicate::{self, Predicate};
use crate::presets;
use crate::processor::{
    filter_factory, flatten_factory, join_children_factory, local_modify_factory, merge_text,
    split_factory, unwrap_factory, Processor,
};
use crate::{ProcessorError, Result};

/// A whole pipeline: the steps run in file order
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default, rename = "step")]
    pub steps: Vec<StepConfig>,
}

/// One processor of the pipeline
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepConfig {
    Filter {
        when: PredicateConfig,
    },
    Unwrap {
        when: PredicateConfig,
    },
    Flatten {
        container: PredicateConfig,
        promote: PredicateConfig,
    },
    Split {
        container: PredicateConfig,
        internal: PredicateConfig,
    },
    MergeText,
    MarkBlockLinks,
    Cleanup,
}

/// A predicate description
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PredicateConfig {
    Always,
    Never,
    Empty,
    Tag,
    Document,
    Text,
    TagOrDocument,
    Name(Vec<String>),
    NameIgnoreCase(Vec<String>),
    NameMatches(String),
    Class(Vec<String>),
    Attribute(Vec<String>),
    AttributeValue { name: Vec<String>, value: Vec<String> },
    ChildrenNamed(Vec<String>),
    DescendantsNamed(Vec<String>),
    All(Vec<PredicateConfig>),
    Any(Vec<PredicateConfig>),
    Not(Box<PredicateConfig>),
}

fn non_empty(kind: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(ProcessorError::InvalidPredicate(format!(
            "`{}` needs at least one value",
            kind
        )));
    }
    Ok(())
}

impl PredicateConfig {
    /// Compile the description into a predicate
    pub fn build(&self) -> Result<Predicate> {
        let built = match self {
            PredicateConfig::Always => predicate::always(),
            PredicateConfig::Never => predicate::never(),
            PredicateConfig::Empty => predicate::is_empty(),
            PredicateConfig::Tag => predicate::is_tag(),
            PredicateConfig::Document => predicate::is_document(),
            PredicateConfig::Text => predicate::is_text(),
            PredicateConfig::TagOrDocument => predicate::is_tag_or_document(),
            PredicateConfig::Name(names) => {
                non_empty("name", names)?;
                predicate::has_name(names.iter().cloned())
            }
            PredicateConfig::NameIgnoreCase(names) => {
                non_empty("name_ignore_case", names)?;
                predicate::has_name_ignore_case(names.iter().cloned())
            }
            PredicateConfig::NameMatches(pattern) => predicate::has_name_matching(pattern)?,
            PredicateConfig::Class(classes) => {
                non_empty("class", classes)?;
                predicate::has_class(classes.iter().cloned())
            }
            PredicateConfig::Attribute(names) => {
                non_empty("attribute", names)?;
                predicate::has_attribute(names.iter().cloned())
            }
            PredicateConfig::AttributeValue { name, value } => {
                non_empty("attribute_value.name", name)?;
                non_empty("attribute_value.value", value)?;
                predicate::has_attribute_value(name.iter().cloned(), value.iter().cloned())
            }
            PredicateConfig::ChildrenNamed(names) => {
                non_empty("children_named", names)?;
                predicate::has_children_named(names.iter().cloned())
            }
            PredicateConfig::DescendantsNamed(names) => {
                non_empty("descendants_named", names)?;
                predicate::has_descendants_named(names.iter().cloned())
            }
            PredicateConfig::All(items) => predicate::and(build_all(items)?),
            PredicateConfig::Any(items) => predicate::or(build_all(items)?),
            PredicateConfig::Not(inner) => predicate::not(inner.build()?),
        };
        Ok(built)
    }
}

fn build_all(items: &[PredicateConfig]) -> Result<Vec<Predicate>> {
    items.iter().map(PredicateConfig::build).collect()
}

impl StepConfig {
    /// Compile the step into a processor
    pub fn build(&self) -> Result<Processor> {
        let processor = match self {
            StepConfig::Filter { when } => filter_factory(when.build()?),
            StepConfig::Unwrap { when } => unwrap_factory(when.build()?),
            StepConfig::Flatten { container, promote } => {
                flatten_factory(container.build()?, promote.build()?)
            }
            StepConfig::Split {
                container,
                internal,
            } => split_factory(container.build()?, internal.build()?),
            StepConfig::MergeText => join_children_factory(merge_text),
            StepConfig::MarkBlockLinks => local_modify_factory(presets::mark_block_links()),
            StepConfig::Cleanup => presets::cleanup(),
        };
        Ok(processor)
    }
}

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Compile every step and chain them in order
    pub fn build(&self) -> Result<Processor> {
        let processors = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                step.build().map_err(|err| ProcessorError::InvalidStep {
                    index,
                    source: Box::new(err),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(steps = processors.len(), "built pipeline");
        Ok(join(processors))
    }
}
