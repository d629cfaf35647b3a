//! rust_irt — item response theory estimation for computerized adaptive testing.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and, with the `python-bindings`
//! feature, as the PyO3 bridge that exposes ability estimation and item
//! calibration to Python through the `_rust_irt` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: `codec` (parameter trees ↔ vectors),
//!   `optimization` (damped Newton solver and L-BFGS fallback), `models`
//!   (1PL–4PL response models), `estimation` (ability and item estimation),
//!   `statistics` (information and standard errors) and `context` (the
//!   loader pipeline that prepares each question-selection step).
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer that
//!   registers the `rust_irt.estimation` submodule.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input validation, and error mapping.
//! - Python inputs are validated into the same option types native callers
//!   use, so the invariants of the core modules hold after conversion.
//!
//! Conventions
//! -----------
//! - Abilities are on the logit scale; item parameters follow the canonical
//!   order difficulty, discrimination, guessing, upper asymptote.
//! - Errors from core Rust code convert into `ValueError` at the boundary.
//!
//! Downstream usage
//! ----------------
//! - Rust callers use the inner modules directly and can ignore the PyO3
//!   items guarded by `python-bindings`.
//! - The Python package imports `_rust_irt` and wraps its classes.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   the integration tests under `tests/`.

pub mod codec;
pub mod context;
pub mod estimation;
pub mod models;
pub mod optimization;
pub mod statistics;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    estimation::{
        AbilityEstimate, AbilityScore, AbilityTerm, CalibrationOptions, CalibrationResponse,
        EstimatorOptions, ItemEstimate, ItemObjective, calibrate_item, estimate_ability,
    },
    models::{ModelKind, PARAMETER_ORDER},
    utils::{
        extract_estimator_opts, extract_f64_vec, extract_item_params, extract_mle_opts,
        extract_model, extract_newton_opts,
    },
};

/// AbilityEstimator — Python-facing person ability estimation.
///
/// Purpose
/// -------
/// Hold validated estimator settings and a response model, and estimate an
/// ability from per-item parameter columns and observed fractions.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `AbilityEstimator(model="raschbirnbaum", lower=None, upper=None,
/// prior=None, tolerance=None, max_iter=None, max_step=None, verbose=False)`:
/// - `model`: one of `rasch`, `raschbirnbaum`, `mixedraschbirnbaum`,
///   `fourplogistic` (or `1pl`…`4pl`).
/// - `lower` / `upper`: ability bounds, default `±10`.
/// - `prior`: optional `(mean, sd)` for MAP estimation.
/// - `tolerance`, `max_iter`, `max_step`: Newton settings.
///
/// Notes
/// -----
/// - Native Rust code should call [`estimation::estimate_person_ability`]
///   directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_irt.estimation")]
pub struct AbilityEstimator {
    model: ModelKind,
    opts: EstimatorOptions,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AbilityEstimator {
    #[new]
    #[pyo3(
        signature = (
            model = None,
            lower = None,
            upper = None,
            prior = None,
            tolerance = None,
            max_iter = None,
            max_step = None,
            verbose = false,
        ),
        text_signature = "(model=None, lower=None, upper=None, prior=None, tolerance=None, \
                          max_iter=None, max_step=None, verbose=False)"
    )]
    pub fn new(
        model: Option<&str>, lower: Option<f64>, upper: Option<f64>, prior: Option<(f64, f64)>,
        tolerance: Option<f64>, max_iter: Option<usize>, max_step: Option<f64>, verbose: bool,
    ) -> PyResult<Self> {
        let model = extract_model(model)?;
        let newton = extract_newton_opts(tolerance, max_iter, max_step, verbose)?;
        let opts = extract_estimator_opts(lower, upper, prior, newton)?;
        Ok(AbilityEstimator { model, opts })
    }

    /// Estimate the ability behind `fractions` on items with the given
    /// parameter columns. Absent columns default to discrimination 1,
    /// guessing 0 and upper asymptote 1.
    #[pyo3(
        signature = (fractions, difficulty, discrimination = None, guessing = None, upper = None),
        text_signature = "(self, fractions, difficulty, /, discrimination=None, guessing=None, upper=None)"
    )]
    pub fn estimate<'py>(
        &self, py: Python<'py>, fractions: &Bound<'py, PyAny>, difficulty: &Bound<'py, PyAny>,
        discrimination: Option<&Bound<'py, PyAny>>, guessing: Option<&Bound<'py, PyAny>>,
        upper: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<AbilityFit> {
        let items = extract_item_params(py, difficulty, discrimination, guessing, upper)?;
        let fractions = extract_f64_vec(py, fractions, "fractions", Some(items.len()))?;
        let model = self.model.model();
        let terms = items
            .into_iter()
            .zip(fractions)
            .map(|(ip, fraction)| AbilityTerm { model, ip, fraction })
            .collect();
        let score = AbilityScore::new(terms, &self.opts)?;
        let inner = estimate_ability(&score, &self.opts)?;
        Ok(AbilityFit { inner })
    }

    #[getter]
    pub fn model(&self) -> &'static str {
        self.model.name()
    }
}

/// AbilityFit — result of [`AbilityEstimator::estimate`].
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_irt.estimation")]
pub struct AbilityFit {
    inner: AbilityEstimate,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AbilityFit {
    #[getter]
    pub fn ability(&self) -> f64 {
        self.inner.ability
    }

    #[getter]
    pub fn standard_error(&self) -> f64 {
        self.inner.standard_error
    }

    /// `"converged"`, `"unconverged"`, `"lower_boundary"` or `"upper_boundary"`.
    #[getter]
    pub fn status(&self) -> &'static str {
        status_name(&self.inner.status)
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn is_reliable(&self) -> bool {
        self.inner.is_reliable()
    }
}

/// ItemCalibrator — Python-facing item parameter calibration.
///
/// Parameters
/// ----------
/// Constructed via `ItemCalibrator(model="raschbirnbaum", objective="loglik",
/// tolerance=None, max_iter=None, fallback=True, tol_grad=None,
/// tol_cost=None, lbfgs_max_iter=None, line_searcher=None, lbfgs_mem=None,
/// verbose=False)`:
/// - `objective`: `"loglik"` (default) or `"lms"`.
/// - `fallback`: run L-BFGS when Newton does not converge (log-likelihood
///   objective only); the `tol_*`, `lbfgs_*` and `line_searcher` arguments
///   configure it.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_irt.estimation")]
pub struct ItemCalibrator {
    model: ModelKind,
    opts: CalibrationOptions,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl ItemCalibrator {
    #[new]
    #[pyo3(
        signature = (
            model = None,
            objective = None,
            tolerance = None,
            max_iter = None,
            fallback = true,
            tol_grad = None,
            tol_cost = None,
            lbfgs_max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
            verbose = false,
        ),
        text_signature = "(model=None, objective=None, tolerance=None, max_iter=None, \
                          fallback=True, tol_grad=None, tol_cost=None, lbfgs_max_iter=None, \
                          line_searcher=None, lbfgs_mem=None, verbose=False)"
    )]
    pub fn new(
        model: Option<&str>, objective: Option<&str>, tolerance: Option<f64>,
        max_iter: Option<usize>, fallback: bool, tol_grad: Option<f64>, tol_cost: Option<f64>,
        lbfgs_max_iter: Option<usize>, line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
        verbose: bool,
    ) -> PyResult<Self> {
        let model = extract_model(model)?;
        let objective = match objective.unwrap_or("loglik").to_lowercase().as_str() {
            "loglik" | "log_likelihood" => ItemObjective::LogLikelihood,
            "lms" | "least_mean_squares" => ItemObjective::LeastMeanSquares,
            other => {
                return Err(PyValueError::new_err(format!(
                    "invalid objective {other:?} (expected 'loglik' or 'lms')"
                )));
            }
        };
        let newton = extract_newton_opts(tolerance, max_iter, None, verbose)?;
        let fallback = if fallback {
            Some(extract_mle_opts(
                tol_grad,
                tol_cost,
                lbfgs_max_iter,
                line_searcher,
                lbfgs_mem,
                verbose,
            )?)
        } else {
            None
        };
        let opts = CalibrationOptions { objective, newton, fallback, ..CalibrationOptions::default() };
        Ok(ItemCalibrator { model, opts })
    }

    /// Calibrate one item from person abilities, observed fractions and
    /// optional weights (default 1).
    #[pyo3(
        signature = (abilities, fractions, weights = None),
        text_signature = "(self, abilities, fractions, /, weights=None)"
    )]
    pub fn calibrate<'py>(
        &self, py: Python<'py>, abilities: &Bound<'py, PyAny>, fractions: &Bound<'py, PyAny>,
        weights: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<ItemFit> {
        let abilities = extract_f64_vec(py, abilities, "abilities", None)?;
        let n = abilities.len();
        let fractions = extract_f64_vec(py, fractions, "fractions", Some(n))?;
        let weights = match weights {
            Some(raw) => extract_f64_vec(py, raw, "weights", Some(n))?,
            None => vec![1.0; n],
        };
        let responses: Vec<CalibrationResponse> = abilities
            .iter()
            .zip(&fractions)
            .zip(&weights)
            .map(|((&theta, &k), &w)| CalibrationResponse::new(theta, k, w))
            .collect();
        let inner = calibrate_item(&responses, self.model, None, &self.opts)?;
        Ok(ItemFit { inner })
    }
}

/// ItemFit — result of [`ItemCalibrator::calibrate`].
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_irt.estimation")]
pub struct ItemFit {
    inner: ItemEstimate,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl ItemFit {
    /// Free parameters of the model as `{name: value}`.
    #[getter]
    pub fn params(&self) -> Vec<(&'static str, f64)> {
        let free = self.inner.model.model().free_parameters();
        PARAMETER_ORDER
            .iter()
            .take(free)
            .enumerate()
            .map(|(index, &name)| (name, self.inner.item_params.get(index)))
            .collect()
    }

    #[getter]
    pub fn log_likelihood(&self) -> f64 {
        self.inner.log_likelihood
    }

    #[getter]
    pub fn aic(&self) -> f64 {
        self.inner.criteria.aic
    }

    #[getter]
    pub fn bic(&self) -> f64 {
        self.inner.criteria.bic
    }

    #[getter]
    pub fn status(&self) -> &'static str {
        status_name(&self.inner.status)
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn used_fallback(&self) -> bool {
        self.inner.used_fallback
    }
}

#[cfg(feature = "python-bindings")]
fn status_name(status: &estimation::EstimateStatus) -> &'static str {
    use estimation::{BoundarySide, EstimateStatus};

    match status {
        EstimateStatus::Converged => "converged",
        EstimateStatus::Unconverged => "unconverged",
        EstimateStatus::Boundary(BoundarySide::Lower) => "lower_boundary",
        EstimateStatus::Boundary(BoundarySide::Upper) => "upper_boundary",
    }
}

/// _rust_irt — PyO3 module initializer.
///
/// Creates the `estimation` submodule, attaches it to `_rust_irt`, and
/// registers it in `sys.modules` as `rust_irt.estimation` so dotted imports
/// work from Python.
///
/// Errors
/// ------
/// - `PyErr` if creating the submodule or touching `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_irt<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let estimation_mod = PyModule::new(_py, "estimation")?;
    estimation_module(_py, m, &estimation_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_irt.estimation", estimation_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn estimation_module<'py>(
    _py: Python, rust_irt: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<AbilityEstimator>()?;
    m.add_class::<AbilityFit>()?;
    m.add_class::<ItemCalibrator>()?;
    m.add_class::<ItemFit>()?;
    rust_irt.add_submodule(m)?;
    Ok(())
}
