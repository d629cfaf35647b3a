//! Chooses the scales the next question may come from.
//!
//! Candidates follow the scale strategy of the settings. After the first
//! question only scales that were still active stay candidates, so a scale
//! once measured or exhausted does not come back. A candidate stays active
//! while its standard error is at or above the threshold, its question cap
//! is not reached, and it still has a non-pilot question to offer.
//!
//! The result is written back into the stored progress whenever it differs
//! from the stored set, which is what the next request filters against.
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::context::{
    errors::ContextResult,
    loader::ContextLoader,
    repository::ProgressStore,
    settings::ScaleStrategy,
    value::{Context, ContextValue, keys},
};

pub struct ActiveScalesLoader {
    store: Arc<dyn ProgressStore>,
}

impl ActiveScalesLoader {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }
}

impl ContextLoader for ActiveScalesLoader {
    fn name(&self) -> &'static str {
        "active_scales"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[keys::ACTIVE_SCALES]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[
            keys::PROGRESS,
            keys::SCALES,
            keys::QUESTIONS,
            keys::PILOT_QUESTIONS,
            keys::STANDARD_ERRORS,
            keys::SETTINGS,
        ]
    }

    fn load(&self, context: &Context) -> ContextResult<Context> {
        let progress = context.progress(keys::PROGRESS)?;
        let tree = context.scales(keys::SCALES)?;
        let questions = context.questions(keys::QUESTIONS)?;
        let pilot = context.ids(keys::PILOT_QUESTIONS)?;
        let errors = context.scalars(keys::STANDARD_ERRORS)?;
        let settings = context.settings(keys::SETTINGS)?;

        let mut candidates: BTreeSet<u64> = match &settings.strategy {
            ScaleStrategy::ClassicalCat => BTreeSet::from([tree.root()]),
            ScaleStrategy::InferAllSubscales => {
                std::iter::once(tree.root()).chain(tree.descendants(tree.root())).collect()
            }
            ScaleStrategy::TeacherSelection { scales } => {
                scales.iter().copied().filter(|&id| tree.contains(id)).collect()
            }
        };
        if let (false, Some(previous)) = (progress.first_question, &progress.active_scales) {
            candidates.retain(|id| previous.contains(id));
        }

        let active: BTreeSet<u64> = candidates
            .into_iter()
            .filter(|scale_id| {
                let se = errors.get(scale_id).copied().unwrap_or(settings.default_standard_error);
                se >= settings.se_threshold
            })
            .filter(|&scale_id| {
                settings
                    .max_questions_per_scale
                    .map_or(true, |cap| progress.answered_in(tree, scale_id) < cap)
            })
            .filter(|scale_id| {
                questions
                    .get(scale_id)
                    .is_some_and(|qs| qs.iter().any(|q| !pilot.contains(&q.id)))
            })
            .collect();

        if progress.active_scales.as_ref() != Some(&active) {
            let mut updated = progress.clone();
            updated.set_active_scales(active.iter().copied());
            self.store.save(&updated)?;
        }
        Ok(Context::new().with(keys::ACTIVE_SCALES, ContextValue::Ids(active)))
    }
}
