//! The loader seam of the context pipeline.
use crate::context::{errors::ContextResult, value::Context};

/// One step of context assembly with static dependencies.
///
/// `load` receives the context built so far and returns the entries it adds;
/// the pipeline merges them. The returned context must hold every key in
/// `provides`. Implementations are deterministic given the context and their
/// collaborators, so rerunning a step yields the same entries.
pub trait ContextLoader: Send + Sync {
    fn name(&self) -> &'static str;

    fn provides(&self) -> &'static [&'static str];

    fn requires(&self) -> &'static [&'static str];

    /// # Errors
    /// Missing or mistyped inputs and collaborator failures.
    fn load(&self, context: &Context) -> ContextResult<Context>;
}
