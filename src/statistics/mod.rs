//! statistics — scale-level information and precision.
//!
//! - [`information`]: item and test information, standard errors, test
//!   potential and information ranking at a fixed ability.
//! - [`report`]: [`ScaleReport`] records keyed by scale id.

pub mod information;
pub mod report;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::information::{
    InformationItem, fisher_information, item_information, projected_standard_error,
    rank_by_information, standard_error, standard_error_from_information, test_information,
    test_potential,
};
pub use self::report::{ScaleReport, build_reports};

pub mod prelude {
    pub use super::information::{
        InformationItem, fisher_information, standard_error, test_information, test_potential,
    };
    pub use super::report::ScaleReport;
}
