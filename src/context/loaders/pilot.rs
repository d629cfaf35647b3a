//! Tags pilot questions.
//!
//! A question is pilot while it has no usable calibrated difficulty or has
//! fewer recorded attempts than the settings require. Pilot questions may
//! still be administered but carry no information for ability estimation.
use std::collections::BTreeSet;

use crate::context::{
    errors::ContextResult,
    loader::ContextLoader,
    repository::Question,
    settings::CatSettings,
    value::{Context, ContextValue, keys},
};

pub fn is_pilot(question: &Question, settings: &CatSettings) -> bool {
    question.calibrated_params().is_none() || question.attempts < settings.pilot_attempts_threshold
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PilotLoader;

impl ContextLoader for PilotLoader {
    fn name(&self) -> &'static str {
        "pilot"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[keys::PILOT_QUESTIONS]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[keys::QUESTIONS, keys::SETTINGS]
    }

    fn load(&self, context: &Context) -> ContextResult<Context> {
        let settings = context.settings(keys::SETTINGS)?;
        let pilot: BTreeSet<u64> = context
            .questions(keys::QUESTIONS)?
            .values()
            .flatten()
            .filter(|question| is_pilot(question, settings))
            .map(|question| question.id)
            .collect();
        Ok(Context::new().with(keys::PILOT_QUESTIONS, ContextValue::Ids(pilot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParamTree;
    use crate::models::{CalculationStatus, ItemParameter, ModelKind};
    use std::collections::BTreeMap;

    fn calibrated(id: u64, status: CalculationStatus) -> ItemParameter {
        let mut item = ItemParameter::new(
            id,
            "q",
            ModelKind::Rasch,
            ParamTree::map([("difficulty", 0.3)]),
            1,
        );
        item.status = status;
        item
    }

    #[test]
    // Purpose
    // -------
    // Missing calibration, unusable status and low attempts each make a
    // question pilot.
    //
    // Given
    // -----
    // - Threshold 20: an uncalibrated question, a not-calculated item, a
    //   calibrated item with 5 attempts, and a calibrated item with 25.
    //
    // Expect
    // ------
    // - The first three are pilot; the last is not.
    fn tags_pilot_questions() {
        let settings = CatSettings { pilot_attempts_threshold: 20, ..CatSettings::default() };
        let questions = vec![
            Question::new(1, 1, None, 100),
            Question::new(2, 1, Some(calibrated(2, CalculationStatus::NotCalculated)), 100),
            Question::new(3, 1, Some(calibrated(3, CalculationStatus::Calculated)), 5),
            Question::new(4, 1, Some(calibrated(4, CalculationStatus::ManuallyConfirmed)), 25),
        ];
        let context = Context::new()
            .with(keys::SETTINGS, ContextValue::Settings(settings))
            .with(keys::QUESTIONS, ContextValue::Questions(BTreeMap::from([(1, questions)])));

        let out = PilotLoader.load(&context).expect("loads");

        assert_eq!(out.ids(keys::PILOT_QUESTIONS), Ok(&BTreeSet::from([1, 2, 3])));
    }
}
