//! context — dependency-ordered assembly of the question-selection context.
//!
//! Purpose
//! -------
//! Build, for one answered question, everything a selection strategy needs:
//! the scale tree, per-scale abilities and standard errors, the progress of
//! the attempt, the selectable and pilot questions, and the active scales.
//!
//! Key behaviors
//! -------------
//! - [`Pipeline`] orders [`ContextLoader`]s by their provides/requires keys
//!   once, at construction, and fails there on configuration errors.
//! - Loaders read persisted state only through injected collaborators
//!   ([`CatalogRepository`], [`AbilityRepository`], [`ProgressStore`]).
//! - [`ContextCache`] keeps resolved contexts between requests; entries are
//!   dropped by the [`CacheEvent`] contract.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every key is produced by exactly one loader or by the seed.
//! - Rerunning a loader on a context that already holds its outputs is a
//!   no-op; the pipeline skips it.
//! - Progress is derived state; concurrent writers for one attempt resolve
//!   by last write.
//!
//! Downstream usage
//! ----------------
//! - Seed with [`Context::seed`], resolve with
//!   [`standard_pipeline`](loaders::standard_pipeline), then read
//!   `active_scales`, `questions`, `pilot_questions` and `standard_errors`.
//! - After an answer: [`record_answer`] against the resolved context (it
//!   keeps the active scales and saves the progress), re-estimate the
//!   ability, then raise [`CacheEvent::ResponseRecorded`] and
//!   [`CacheEvent::AbilityUpdated`].
//! - Deactivated scales stay inactive for the rest of the attempt; the
//!   active-scales loader stores every change of the set.

pub mod cache;
pub mod errors;
pub mod loader;
pub mod loaders;
pub mod pipeline;
pub mod progress;
pub mod repository;
pub mod settings;
pub mod value;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cache::{CacheEvent, CacheKey, ContextCache, InMemoryContextCache, is_stale};
pub use self::errors::{ContextError, ContextResult};
pub use self::loader::ContextLoader;
pub use self::loaders::{standard_loaders, standard_pipeline};
pub use self::pipeline::{Pipeline, Resolution};
pub use self::progress::{Answer, Progress, record_answer};
pub use self::repository::{
    AbilityRepository, CatalogRepository, InMemoryAbilities, InMemoryCatalog,
    InMemoryProgressStore, ProgressStore, Question, ScaleNode, ScaleTree,
};
pub use self::settings::{CatSettings, ScaleStrategy};
pub use self::value::{Context, ContextValue, keys};

pub mod prelude {
    pub use super::cache::{CacheEvent, ContextCache};
    pub use super::errors::{ContextError, ContextResult};
    pub use super::loader::ContextLoader;
    pub use super::loaders::standard_pipeline;
    pub use super::pipeline::Pipeline;
    pub use super::settings::CatSettings;
    pub use super::value::{Context, ContextValue};
}
