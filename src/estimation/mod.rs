//! estimation — person ability and item parameter estimation.
//!
//! Purpose
//! -------
//! Combine response models with the Newton solver: estimate a person's
//! ability with item parameters held fixed, and calibrate an item's
//! parameters with person abilities held fixed. Alternating the two is a
//! scheduling concern left to callers.
//!
//! Key behaviors
//! -------------
//! - [`estimate_person_ability`] sums ability derivatives across a person's
//!   responses ([`AbilityScore`]), optionally adds a Gaussian prior (MAP),
//!   and flags degenerate or bound-hitting results as
//!   [`EstimateStatus::Boundary`].
//! - [`calibrate_item`] / [`estimate_item_params`] sum parameter jacobians
//!   and hessians across persons ([`ItemScore`]) under a log-likelihood or
//!   least-squares objective, clamp to [`ItemBounds`], and fall back to
//!   L-BFGS when Newton does not converge.
//! - [`PersonParameter`] stores boundary abilities as
//!   `±ABILITY_SENTINEL`; readers replace them with a default.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every estimate carries an [`EstimateStatus`]; only `Converged` is
//!   reliable.
//! - Non-convergence is not an error; numerical faults and invalid inputs
//!   are ([`EstimatorError`]).
//!
//! Conventions
//! -----------
//! - Abilities live on the logit scale, bounded by
//!   [`EstimatorOptions::lower_bound`] / [`EstimatorOptions::upper_bound`].
//! - Item parameters use the free-parameter names of their model.
//!
//! Testing notes
//! -------------
//! - Unit tests check score roots, degenerate flags, MAP behavior, and
//!   parameter recovery from expected-fraction data; the end-to-end
//!   regression lives under `tests/`.

pub mod errors;
pub mod item;
pub mod options;
pub mod person;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{EstimatorError, EstimatorResult};
pub use self::item::{ItemScore, calibrate_item, estimate_item_params, pool_by_ability};
pub use self::options::{
    AbilityPrior, CalibrationOptions, EstimatorOptions, ItemBounds, ItemObjective,
};
pub use self::person::{
    ABILITY, AbilityScore, AbilityTerm, estimate_ability, estimate_person_ability,
};
pub use self::types::{
    ABILITY_SENTINEL, AbilityEstimate, BoundarySide, CalibrationResponse, EstimateStatus,
    ItemEstimate, PersonParameter, ResponseRecord, is_sentinel,
};

pub mod prelude {
    pub use super::errors::{EstimatorError, EstimatorResult};
    pub use super::item::{calibrate_item, estimate_item_params};
    pub use super::options::{AbilityPrior, CalibrationOptions, EstimatorOptions};
    pub use super::person::estimate_person_ability;
    pub use super::types::{AbilityEstimate, EstimateStatus, PersonParameter, ResponseRecord};
}
