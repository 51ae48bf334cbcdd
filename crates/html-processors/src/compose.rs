//! Chaining processors into pipelines.

use crate::processor::Processor;

/// Build a processor applying each of `processors` in order, every one
/// consuming the output of the one before.
///
/// With no processors the result is the identity.
///
/// ```rust
/// use html_processors::compose::join;
/// use html_processors::predicate::has_name;
/// use html_processors::processor::{filter_factory, unwrap_factory};
///
/// let clean = join([
///     unwrap_factory(has_name(["font"])),
///     filter_factory(has_name(["script"])),
/// ]);
/// # let _ = clean;
/// ```
pub fn join<I>(processors: I) -> Processor
where
    I: IntoIterator<Item = Processor>,
{
    let processors: Vec<Processor> = processors.into_iter().collect();
    if processors.is_empty() {
        return Processor::identity();
    }
    Processor::new(move |nodes| {
        processors
            .iter()
            .fold(nodes, |nodes, processor| processor.apply(nodes))
    })
}
