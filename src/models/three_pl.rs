//! Three-parameter logistic ("mixed Rasch–Birnbaum") model:
//! `p = c + (1 − c)·σ(a(θ − b))`.
use crate::models::{
    params::{DIFFICULTY, DISCRIMINATION, GUESSING, ItemParams},
    traits::{ModelKind, ResponseModel},
};

/// Guessing value calibration starts from.
pub const INITIAL_GUESSING: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreePl;

impl ResponseModel for ThreePl {
    fn kind(&self) -> ModelKind {
        ModelKind::MixedRaschBirnbaum
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[DIFFICULTY, DISCRIMINATION, GUESSING]
    }

    fn initial_params(&self) -> ItemParams {
        ItemParams { guessing: INITIAL_GUESSING, ..ItemParams::default() }
    }
}
