//! Loads the selectable questions of every scale.
//!
//! A question attached to a subscale also belongs to each ancestor scale up
//! to the tested one. Questions already excluded by the progress record
//! (answered or skipped) and manually excluded items are left out.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::{
    errors::ContextResult,
    loader::ContextLoader,
    repository::{CatalogRepository, Question},
    value::{Context, ContextValue, keys},
};

pub struct QuestionLoader {
    catalog: Arc<dyn CatalogRepository>,
}

impl QuestionLoader {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

impl ContextLoader for QuestionLoader {
    fn name(&self) -> &'static str {
        "questions"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[keys::QUESTIONS]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[keys::CONTEXT_ID, keys::SCALES, keys::PROGRESS]
    }

    fn load(&self, context: &Context) -> ContextResult<Context> {
        let tree = context.scales(keys::SCALES)?;
        let progress = context.progress(keys::PROGRESS)?;
        let scale_ids: Vec<u64> = tree.ids().collect();

        let mut by_scale: BTreeMap<u64, Vec<Question>> =
            scale_ids.iter().map(|&id| (id, Vec::new())).collect();
        let questions = self.catalog.questions(context.id(keys::CONTEXT_ID)?, &scale_ids)?;
        for question in questions {
            if progress.excluded_questions.contains(&question.id)
                || question.is_excluded()
                || !tree.contains(question.scale_id)
            {
                continue;
            }
            for ancestor in tree.ancestors(question.scale_id) {
                by_scale.entry(ancestor).or_default().push(question.clone());
            }
            by_scale.entry(question.scale_id).or_default().push(question);
        }
        for questions in by_scale.values_mut() {
            questions.sort_by_key(|q| q.id);
        }
        Ok(Context::new().with(keys::QUESTIONS, ContextValue::Questions(by_scale)))
    }
}
