#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    estimation::{AbilityPrior, EstimatorError, EstimatorOptions},
    models::{ItemParams, ModelKind},
    optimization::{
        loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
        newton::NewtonOptions,
    },
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy an array-like into a `Vec<f64>` of the expected length.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str, expected_len: Option<usize>,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    if let Some(len) = expected_len {
        if slice.len() != len {
            return Err(PyValueError::new_err(format!(
                "{name} has length {}, expected {len}",
                slice.len()
            )));
        }
    }
    Ok(slice.to_vec())
}

#[cfg(feature = "python-bindings")]
pub fn extract_model(model: Option<&str>) -> PyResult<ModelKind> {
    use std::str::FromStr;

    let kind = ModelKind::from_str(model.unwrap_or("raschbirnbaum")).map_err(EstimatorError::from)?;
    Ok(kind)
}

/// Item parameters from per-item columns; absent columns take their defaults.
#[cfg(feature = "python-bindings")]
pub fn extract_item_params<'py>(
    py: Python<'py>, difficulty: &Bound<'py, PyAny>, discrimination: Option<&Bound<'py, PyAny>>,
    guessing: Option<&Bound<'py, PyAny>>, upper: Option<&Bound<'py, PyAny>>,
) -> PyResult<Vec<ItemParams>> {
    let b = extract_f64_vec(py, difficulty, "difficulty", None)?;
    let n = b.len();
    let column = |raw: Option<&Bound<'py, PyAny>>, name: &str, default: f64| match raw {
        Some(raw) => extract_f64_vec(py, raw, name, Some(n)),
        None => Ok(vec![default; n]),
    };
    let a = column(discrimination, "discrimination", 1.0)?;
    let c = column(guessing, "guessing", 0.0)?;
    let d = column(upper, "upper", 1.0)?;

    let mut items = Vec::with_capacity(n);
    for i in 0..n {
        let ip = ItemParams { difficulty: b[i], discrimination: a[i], guessing: c[i], upper: d[i] };
        ip.validate().map_err(EstimatorError::from)?;
        items.push(ip);
    }
    Ok(items)
}

#[cfg(feature = "python-bindings")]
pub fn extract_newton_opts(
    tolerance: Option<f64>, max_iter: Option<usize>, max_step: Option<f64>, verbose: bool,
) -> PyResult<NewtonOptions> {
    let defaults = NewtonOptions::default();
    let opts = NewtonOptions::new(
        tolerance.unwrap_or(defaults.tolerance),
        max_iter.unwrap_or(defaults.max_iter),
        max_step.unwrap_or(defaults.max_step),
        defaults.max_halvings,
        defaults.ridge_floor,
        verbose,
    )
    .map_err(EstimatorError::from)?;
    Ok(opts)
}

#[cfg(feature = "python-bindings")]
pub fn extract_estimator_opts(
    lower: Option<f64>, upper: Option<f64>, prior: Option<(f64, f64)>, newton: NewtonOptions,
) -> PyResult<EstimatorOptions> {
    let defaults = EstimatorOptions::default();
    let prior = prior.map(|(mean, sd)| AbilityPrior::new(mean, sd)).transpose()?;
    let opts = EstimatorOptions::new(
        lower.unwrap_or(defaults.lower_bound),
        upper.unwrap_or(defaults.upper_bound),
        defaults.initial_ability,
        prior,
        defaults.degenerate_epsilon,
        newton,
    )?;
    Ok(opts)
}

#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, verbose: bool,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    // No tolerance given: keep the default stopping rules.
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        MLEOptions::default().tols
    } else {
        Tolerances::new(tol_grad, tol_cost, max_iter).map_err(EstimatorError::from)?
    };

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(EstimatorError::from)?,
        None => LineSearcher::MoreThuente,
    };

    let opts = MLEOptions::new(tols, ls, verbose, lbfgs_mem).map_err(EstimatorError::from)?;
    Ok(opts)
}
