//! Loads the progress record of the attempt, starting one on the first
//! question.
use std::sync::Arc;

use crate::context::{
    errors::{ContextError, ContextResult},
    loader::ContextLoader,
    progress::Progress,
    repository::ProgressStore,
    value::{Context, ContextValue, keys},
};

pub struct ProgressLoader {
    store: Arc<dyn ProgressStore>,
}

impl ProgressLoader {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }
}

impl ContextLoader for ProgressLoader {
    fn name(&self) -> &'static str {
        "progress"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[keys::PROGRESS, keys::IS_FIRST_QUESTION]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[keys::ATTEMPT_ID, keys::COMPONENT_ID, keys::SCALE_ID, keys::PERSON_ABILITY]
    }

    fn load(&self, context: &Context) -> ContextResult<Context> {
        let attempt_id = context.id(keys::ATTEMPT_ID)?;
        let component_id = context.id(keys::COMPONENT_ID)?;

        let progress = match self.store.load(attempt_id, component_id)? {
            Some(progress) => progress,
            None => {
                let scale_id = context.id(keys::SCALE_ID)?;
                let ability = context
                    .scalars(keys::PERSON_ABILITY)?
                    .get(&scale_id)
                    .copied()
                    .ok_or(ContextError::UnknownScale { scale_id })?;
                Progress::start(attempt_id, component_id, ability)
            }
        };
        let first = progress.first_question;
        Ok(Context::new()
            .with(keys::PROGRESS, ContextValue::Progress(progress))
            .with(keys::IS_FIRST_QUESTION, ContextValue::Flag(first)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{repository::InMemoryProgressStore, settings::CatSettings};
    use std::collections::BTreeMap;

    #[test]
    // Purpose
    // -------
    // A new attempt starts fresh; a stored attempt is resumed.
    //
    // Given
    // -----
    // - Ability 0.8 on the tested scale 3; an empty store, then a stored
    //   record with one answer.
    //
    // Expect
    // ------
    // - First pass: first question, ability_before_attempt 0.8.
    // - Second pass: the stored record, not first question.
    fn starts_or_resumes_progress() {
        let store = Arc::new(InMemoryProgressStore::new());
        let loader = ProgressLoader::new(store.clone());
        let context = Context::seed(1, 2, 5, 4, 3, CatSettings::default())
            .with(keys::PERSON_ABILITY, ContextValue::Scalars(BTreeMap::from([(3, 0.8)])));

        let fresh = loader.load(&context).expect("loads");
        assert_eq!(fresh.flag(keys::IS_FIRST_QUESTION), Ok(true));
        assert_eq!(fresh.progress(keys::PROGRESS).expect("progress").ability_before_attempt, 0.8);

        let mut stored = Progress::start(1, 5, 0.1);
        stored.record_response(40, 3, 1.0).expect("valid");
        store.save(&stored).expect("save");

        let resumed = loader.load(&context).expect("loads");
        assert_eq!(resumed.flag(keys::IS_FIRST_QUESTION), Ok(false));
        assert_eq!(resumed.progress(keys::PROGRESS), Ok(&stored));
    }
}
