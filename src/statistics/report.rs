//! Per-scale precision reports handed to stopping and selection strategies.
use std::collections::{BTreeMap, HashMap};

use crate::statistics::information::{
    InformationItem, standard_error_from_information, test_information,
};

/// `{ability, standard_error, test_information}` of one scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleReport {
    pub scale_id: u64,
    pub ability: f64,
    pub standard_error: f64,
    pub test_information: f64,
    pub items_used: usize,
}

impl ScaleReport {
    pub fn build(scale_id: u64, ability: f64, items: &[InformationItem]) -> Self {
        let information = test_information(ability, items);
        Self {
            scale_id,
            ability,
            standard_error: standard_error_from_information(information),
            test_information: information,
            items_used: items.len(),
        }
    }

    /// Measurement is precise enough to stop testing this scale.
    pub fn is_precise(&self, se_threshold: f64) -> bool {
        self.standard_error <= se_threshold
    }
}

/// Reports for every scale that has an ability, ordered by scale id.
///
/// Scales without administered items get an empty item set (infinite SE).
pub fn build_reports(
    abilities: &HashMap<u64, f64>, items_by_scale: &HashMap<u64, Vec<InformationItem>>,
) -> BTreeMap<u64, ScaleReport> {
    abilities
        .iter()
        .map(|(&scale_id, &ability)| {
            let items = items_by_scale.get(&scale_id).map(Vec::as_slice).unwrap_or(&[]);
            (scale_id, ScaleReport::build(scale_id, ability, items))
        })
        .collect()
}
