//! The loaders that assemble a question-selection context.
//!
//! | loader                  | provides                              | requires                                                              |
//! |-------------------------|---------------------------------------|-----------------------------------------------------------------------|
//! | [`ScaleTreeLoader`]     | `scales`                              | `scale_id`                                                            |
//! | [`PersonAbilityLoader`] | `person_ability`                      | `user_id`, `context_id`, `scales`, `settings`                         |
//! | [`ProgressLoader`]      | `progress`, `is_first_question`       | `attempt_id`, `component_id`, `scale_id`, `person_ability`            |
//! | [`QuestionLoader`]      | `questions`                           | `context_id`, `scales`, `progress`                                    |
//! | [`PilotLoader`]         | `pilot_questions`                     | `questions`, `settings`                                               |
//! | [`StandardErrorLoader`] | `standard_errors`                     | `context_id`, `scales`, `person_ability`, `progress`, `settings`      |
//! | [`ActiveScalesLoader`]  | `active_scales`                       | `progress`, `scales`, `questions`, `pilot_questions`, `standard_errors`, `settings` |
use std::sync::Arc;

use crate::context::{
    errors::ContextResult,
    loader::ContextLoader,
    pipeline::Pipeline,
    repository::{AbilityRepository, CatalogRepository, ProgressStore},
    value::keys,
};

pub mod active_scales;
pub mod person_ability;
pub mod pilot;
pub mod progress;
pub mod questions;
pub mod scale_tree;
pub mod standard_error;

pub use self::active_scales::ActiveScalesLoader;
pub use self::person_ability::PersonAbilityLoader;
pub use self::pilot::{PilotLoader, is_pilot};
pub use self::progress::ProgressLoader;
pub use self::questions::QuestionLoader;
pub use self::scale_tree::ScaleTreeLoader;
pub use self::standard_error::StandardErrorLoader;

/// Every loader above, wired to the given collaborators.
pub fn standard_loaders(
    catalog: Arc<dyn CatalogRepository>, abilities: Arc<dyn AbilityRepository>,
    progress: Arc<dyn ProgressStore>,
) -> Vec<Box<dyn ContextLoader>> {
    vec![
        Box::new(ScaleTreeLoader::new(Arc::clone(&catalog))),
        Box::new(PersonAbilityLoader::new(abilities)),
        Box::new(ProgressLoader::new(Arc::clone(&progress))),
        Box::new(QuestionLoader::new(Arc::clone(&catalog))),
        Box::new(PilotLoader),
        Box::new(StandardErrorLoader::new(catalog)),
        Box::new(ActiveScalesLoader::new(progress)),
    ]
}

/// Pipeline over [`standard_loaders`] seeded with [`keys::SEED`].
///
/// # Errors
/// Only on a misconfigured loader set; the standard set is valid.
pub fn standard_pipeline(
    catalog: Arc<dyn CatalogRepository>, abilities: Arc<dyn AbilityRepository>,
    progress: Arc<dyn ProgressStore>,
) -> ContextResult<Pipeline> {
    Pipeline::new(standard_loaders(catalog, abilities, progress), &keys::SEED)
}
