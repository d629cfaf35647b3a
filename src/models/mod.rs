//! models — logistic item response models (1PL through 4PL).
//!
//! Purpose
//! -------
//! Provide the per-response probability, log-likelihood and derivative
//! functions that ability and item estimation sum over, plus the
//! information criteria used to compare fitted models.
//!
//! Key behaviors
//! -------------
//! - [`ResponseModel`] is implemented by [`Rasch`], [`Birnbaum`],
//!   [`ThreePl`] and [`FourPl`]; all of them evaluate the shared
//!   [`kernel::Logistic`] and differ only in which parameters are free.
//! - [`ModelKind`] maps stored model names to a `&'static dyn ResponseModel`.
//! - [`ItemParameter`] is the stored record (model, parameter map, status,
//!   context) and [`ItemParams`] the typed value the kernel evaluates.
//! - [`InformationCriteria`] / [`select_model`] rank fits by AIC, BIC,
//!   CAIC, AICc or SABIC.
//!
//! Invariants & assumptions
//! ------------------------
//! - Free parameters are always a prefix of
//!   `[difficulty, discrimination, guessing, upper]`; jacobians and
//!   hessians use that order.
//! - Observed fractions lie in `[0, 1]`; intermediate values are partial
//!   credit.
//!
//! Downstream usage
//! ----------------
//! - `estimation` wraps models in score functions for the Newton solver.
//! - `statistics` sums `item_information` into test information.
//!
//! Testing notes
//! -------------
//! - The kernel is checked against finite differences; each model file
//!   pins its closed forms and asymptotes.

pub mod birnbaum;
pub mod criteria;
pub mod errors;
pub mod four_pl;
pub mod kernel;
pub mod params;
pub mod rasch;
pub mod three_pl;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::birnbaum::Birnbaum;
pub use self::criteria::{Criterion, InformationCriteria, select_model};
pub use self::errors::{ModelError, ModelResult};
pub use self::four_pl::FourPl;
pub use self::params::{
    CalculationStatus, DIFFICULTY, DISCRIMINATION, GUESSING, ItemParameter, ItemParams,
    PARAMETER_ORDER, UPPER,
};
pub use self::rasch::Rasch;
pub use self::three_pl::ThreePl;
pub use self::traits::{ModelKind, ResponseModel};

pub mod prelude {
    pub use super::criteria::{Criterion, InformationCriteria, select_model};
    pub use super::errors::{ModelError, ModelResult};
    pub use super::params::{CalculationStatus, ItemParameter, ItemParams};
    pub use super::traits::{ModelKind, ResponseModel};
}
