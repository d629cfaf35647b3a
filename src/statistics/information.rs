//! statistics::information — Fisher information, standard errors and test
//! potential at a fixed ability.
//!
//! Purpose
//! -------
//! Turn an ability estimate and a set of calibrated items into the
//! precision signals a stopping rule or selection strategy consumes.
//!
//! Key behaviors
//! -------------
//! - [`fisher_information`] sums `p'(θ)² / (p(1 − p))` over items;
//!   [`test_information`] is the same quantity under its reporting name.
//! - [`standard_error`] is `1/√I`, `+∞` when `I = 0`.
//! - [`test_potential`] sums the information of the best `remaining_count`
//!   candidates at `θ`; asking for more than exist uses all of them.
//!
//! Invariants & assumptions
//! ------------------------
//! - Item information is non-negative, so adding an item never decreases
//!   the total and never increases the standard error.
//!
//! Testing notes
//! -------------
//! - Known-value regressions pin the 3PL standard errors; a grid test
//!   checks monotonicity under item addition.
use std::cmp::Ordering;

use crate::models::{ItemParameter, ItemParams, ModelKind, ModelResult};

/// A calibrated item as seen by the information functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InformationItem {
    pub id: u64,
    pub model: ModelKind,
    pub params: ItemParams,
}

impl InformationItem {
    pub fn new(id: u64, model: ModelKind, params: ItemParams) -> Self {
        Self { id, model, params }
    }

    /// # Errors
    /// Propagates parameter parsing errors of the record's model.
    pub fn from_parameter(record: &ItemParameter) -> ModelResult<Self> {
        Ok(Self { id: record.component_id, model: record.model, params: record.item_params()? })
    }
}

pub fn item_information(theta: f64, item: &InformationItem) -> f64 {
    item.model.model().item_information(theta, &item.params)
}

pub fn fisher_information(theta: f64, items: &[InformationItem]) -> f64 {
    items.iter().map(|item| item_information(theta, item)).sum()
}

/// Test information reported to stopping rules; equals [`fisher_information`].
pub fn test_information(theta: f64, items: &[InformationItem]) -> f64 {
    fisher_information(theta, items)
}

/// `1/√I`, or `+∞` when there is no information.
pub fn standard_error_from_information(information: f64) -> f64 {
    if information > 0.0 { 1.0 / information.sqrt() } else { f64::INFINITY }
}

pub fn standard_error(theta: f64, items: &[InformationItem]) -> f64 {
    standard_error_from_information(fisher_information(theta, items))
}

/// Item ids with their information at `θ`, most informative first.
/// Ties keep the lower id first.
pub fn rank_by_information(theta: f64, items: &[InformationItem]) -> Vec<(u64, f64)> {
    let mut ranked: Vec<(u64, f64)> =
        items.iter().map(|item| (item.id, item_information(theta, item))).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
    ranked
}

/// Information still obtainable from the best `remaining_count` of
/// `remaining_items` at `θ`.
pub fn test_potential(theta: f64, remaining_items: &[InformationItem], remaining_count: usize) -> f64 {
    rank_by_information(theta, remaining_items)
        .into_iter()
        .take(remaining_count)
        .map(|(_, info)| info)
        .sum()
}

/// Standard error after also administering the best `remaining_count`
/// candidates, assuming the ability stays at `θ`.
pub fn projected_standard_error(
    theta: f64, administered: &[InformationItem], remaining_items: &[InformationItem],
    remaining_count: usize,
) -> f64 {
    standard_error_from_information(
        fisher_information(theta, administered)
            + test_potential(theta, remaining_items, remaining_count),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The 3PL standard-error regressions (one and two items).
    // - Monotonicity of information under item addition.
    // - Ranking, test potential with an oversized count, and the empty set.
    // -------------------------------------------------------------------------

    fn three_pl(id: u64, difficulty: f64, discrimination: f64) -> InformationItem {
        InformationItem::new(
            id,
            ModelKind::MixedRaschBirnbaum,
            ItemParams::three_pl(difficulty, discrimination, 0.0),
        )
    }

    #[test]
    // Purpose
    // -------
    // Pin the known standard errors.
    //
    // Given
    // -----
    // - Item {b = 0.05, a = 5.95} at θ = -0.3945.
    // - Plus item {b = -0.35, a = 5.94} at θ = -0.7098.
    //
    // Expect
    // ------
    // - SE ≈ 0.68 and ≈ 0.52 (±0.01).
    fn standard_error_regression() {
        let first = three_pl(1, 0.05, 5.95);
        let second = three_pl(2, -0.35, 5.94);

        assert_relative_eq!(standard_error(-0.3945, &[first]), 0.68, epsilon = 0.01);
        assert_relative_eq!(standard_error(-0.7098, &[first, second]), 0.52, epsilon = 0.01);
    }

    #[test]
    // Purpose
    // -------
    // Adding items never decreases information.
    //
    // Given
    // -----
    // - Items added one at a time, evaluated on an ability grid.
    //
    // Expect
    // ------
    // - Non-decreasing information and non-increasing SE at every θ.
    fn information_is_monotone_in_items() {
        let pool = [
            three_pl(1, -1.0, 0.7),
            InformationItem::new(2, ModelKind::Rasch, ItemParams::rasch(0.3)),
            InformationItem::new(
                3,
                ModelKind::FourPLogistic,
                ItemParams { difficulty: 1.2, discrimination: 2.0, guessing: 0.2, upper: 0.9 },
            ),
            three_pl(4, 4.0, 3.0),
        ];
        for step in 0..=40 {
            let theta = -5.0 + 0.25 * step as f64;
            for n in 1..pool.len() {
                assert!(fisher_information(theta, &pool[..n + 1]) >= fisher_information(theta, &pool[..n]));
                assert!(standard_error(theta, &pool[..n + 1]) <= standard_error(theta, &pool[..n]));
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Rank candidates and bound the potential by what exists.
    //
    // Given
    // -----
    // - Three 2PL-like items at θ = 0; counts 1 and 10; no items.
    //
    // Expect
    // ------
    // - The item centered at θ ranks first.
    // - Count 10 equals the sum over all three items.
    // - No items: zero potential and infinite SE.
    fn ranking_and_potential() {
        let items = [three_pl(1, 2.0, 1.0), three_pl(2, 0.0, 1.0), three_pl(3, -1.0, 1.0)];

        let ranked = rank_by_information(0.0, &items);

        assert_eq!(ranked[0].0, 2);
        assert_relative_eq!(test_potential(0.0, &items, 1), ranked[0].1);
        assert_relative_eq!(test_potential(0.0, &items, 10), fisher_information(0.0, &items));
        assert_eq!(test_potential(0.0, &[], 3), 0.0);
        assert_eq!(standard_error(0.0, &[]), f64::INFINITY);
        assert!(
            projected_standard_error(0.0, &items[..1], &items[1..], 2) < standard_error(0.0, &items[..1])
        );
    }
}
