//! Loads the stored ability of the user on every scale of the tree.
//!
//! Boundary sentinels and missing records become the default ability of the
//! settings, so downstream loaders only ever see usable abilities.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::{
    errors::ContextResult,
    loader::ContextLoader,
    repository::AbilityRepository,
    value::{Context, ContextValue, keys},
};

pub struct PersonAbilityLoader {
    abilities: Arc<dyn AbilityRepository>,
}

impl PersonAbilityLoader {
    pub fn new(abilities: Arc<dyn AbilityRepository>) -> Self {
        Self { abilities }
    }
}

impl ContextLoader for PersonAbilityLoader {
    fn name(&self) -> &'static str {
        "person_ability"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[keys::PERSON_ABILITY]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[keys::USER_ID, keys::CONTEXT_ID, keys::SCALES, keys::SETTINGS]
    }

    fn load(&self, context: &Context) -> ContextResult<Context> {
        let user_id = context.id(keys::USER_ID)?;
        let context_id = context.id(keys::CONTEXT_ID)?;
        let default = context.settings(keys::SETTINGS)?.default_ability;

        let mut abilities = BTreeMap::new();
        for scale_id in context.scales(keys::SCALES)?.ids() {
            let stored = self.abilities.person_parameter(user_id, scale_id, context_id)?;
            let ability = stored.map_or(default, |param| param.ability_or(default));
            abilities.insert(scale_id, ability);
        }
        Ok(Context::new().with(keys::PERSON_ABILITY, ContextValue::Scalars(abilities)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{
        repository::{InMemoryAbilities, ScaleNode, ScaleTree},
        settings::CatSettings,
    };
    use crate::estimation::{ABILITY_SENTINEL, EstimateStatus, PersonParameter};

    #[test]
    // Purpose
    // -------
    // Sentinels and gaps fall back to the default ability.
    //
    // Given
    // -----
    // - Scales 1 ⊃ {2, 3}; a real ability on 1, an upper sentinel on 2,
    //   nothing on 3; default ability 0.5.
    //
    // Expect
    // ------
    // - {1: 1.2, 2: 0.5, 3: 0.5}.
    fn sentinels_and_gaps_use_default() {
        let repo = InMemoryAbilities::new();
        let stored = |scale_id, ability| PersonParameter {
            person_id: 7,
            scale_id,
            context_id: 4,
            ability,
            standard_error: 0.4,
            status: EstimateStatus::Converged,
        };
        repo.save(stored(1, 1.2)).expect("save");
        repo.save(stored(2, ABILITY_SENTINEL)).expect("save");
        let tree = ScaleTree::from_nodes(
            1,
            [ScaleNode::new(1, None, "a"), ScaleNode::new(2, Some(1), "b"), ScaleNode::new(3, Some(1), "c")],
        )
        .expect("known root");
        let settings = CatSettings { default_ability: 0.5, ..CatSettings::default() };
        let context = Context::seed(1, 7, 9, 4, 1, settings)
            .with(keys::SCALES, ContextValue::Scales(tree));

        let out = PersonAbilityLoader::new(Arc::new(repo)).load(&context).expect("loads");

        let abilities = out.scalars(keys::PERSON_ABILITY).expect("scalars");
        assert_eq!(abilities, &BTreeMap::from([(1, 1.2), (2, 0.5), (3, 0.5)]));
    }
}
