//! Standard error of the current ability on every scale.
//!
//! Uses the answered, non-pilot questions attached to a scale or its
//! subscales. Scales without such answers get the default standard error of
//! the settings.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    context::{
        errors::ContextResult,
        loader::ContextLoader,
        loaders::pilot::is_pilot,
        repository::CatalogRepository,
        value::{Context, ContextValue, keys},
    },
    statistics::{InformationItem, standard_error},
};

pub struct StandardErrorLoader {
    catalog: Arc<dyn CatalogRepository>,
}

impl StandardErrorLoader {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

impl ContextLoader for StandardErrorLoader {
    fn name(&self) -> &'static str {
        "standard_error"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[keys::STANDARD_ERRORS]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[keys::CONTEXT_ID, keys::SCALES, keys::PERSON_ABILITY, keys::PROGRESS, keys::SETTINGS]
    }

    fn load(&self, context: &Context) -> ContextResult<Context> {
        let tree = context.scales(keys::SCALES)?;
        let abilities = context.scalars(keys::PERSON_ABILITY)?;
        let progress = context.progress(keys::PROGRESS)?;
        let settings = context.settings(keys::SETTINGS)?;

        let scale_ids: Vec<u64> = tree.ids().collect();
        let answered: Vec<(u64, InformationItem)> = self
            .catalog
            .questions(context.id(keys::CONTEXT_ID)?, &scale_ids)?
            .into_iter()
            .filter(|question| progress.has_answered(question.id) && !is_pilot(question, settings))
            .filter_map(|question| question.information_item().map(|item| (question.scale_id, item)))
            .collect();

        let mut errors = BTreeMap::new();
        for scale_id in scale_ids {
            let items: Vec<InformationItem> = answered
                .iter()
                .filter(|(question_scale, _)| tree.is_within(*question_scale, scale_id))
                .map(|(_, item)| *item)
                .collect();
            let se = if items.is_empty() {
                settings.default_standard_error
            } else {
                let ability = abilities.get(&scale_id).copied().unwrap_or(settings.default_ability);
                standard_error(ability, &items)
            };
            errors.insert(scale_id, se);
        }
        Ok(Context::new().with(keys::STANDARD_ERRORS, ContextValue::Scalars(errors)))
    }
}
