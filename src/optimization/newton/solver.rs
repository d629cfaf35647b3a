//! Damped Newton–Raphson iteration over parameter trees.
use ndarray::Array1;

use crate::{
    codec::{Descriptor, ParamTree, try_decode, try_encode},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{types::Theta, validation::validate_hessian},
        newton::{
            options::NewtonOptions,
            score::{ScoreFunction, flatten_gradient},
            stabilize::{newton_direction, stabilize},
        },
        numerical_stability::GENERAL_TOL,
    },
};

/// Why the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonStatus {
    /// The gradient vanished (`max |g| ≤ GENERAL_TOL`).
    ZeroGradient,
    /// The accepted step satisfied `max |Δ| < tolerance`.
    StepTolerance,
    /// `max_iter` was exhausted; the estimate is the last iterate.
    MaxIterations,
}

/// Result of [`solve`], returned in the shape of the initial guess.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonOutcome {
    pub estimate: ParamTree,
    pub converged: bool,
    pub status: NewtonStatus,
    pub iterations: usize,
    /// `max |Δ|` of the last accepted step (0 when no step was taken).
    pub max_step_taken: f64,
    /// Euclidean norm of the last evaluated gradient.
    pub grad_norm: f64,
    /// Iterations whose Hessian needed the ridge shift or a gradient step.
    pub stabilized_steps: usize,
}

/// Maximize the objective behind `score` starting from `initial`.
///
/// Parameters
/// ----------
/// - `score`: `&S`
///   Gradient/curvature provider. Evaluated on decoded trees only.
/// - `initial`: `&ParamTree`
///   Starting point. Its shape fixes the shape of every iterate and of the
///   returned estimate.
/// - `opts`: `&NewtonOptions`
///   Iteration cap, step tolerance, damping and ridge settings.
///
/// Returns
/// -------
/// `OptResult<NewtonOutcome>`
///   - `converged = true` with `ZeroGradient` or `StepTolerance`.
///   - `converged = false` with `MaxIterations`; the best (last) iterate is
///     still returned so callers may decide to accept it.
///
/// Errors
/// ------
/// - `OptError::EncodingFailed` when `initial` (or a projected iterate) does
///   not encode, or the trusted-region projection changes its shape.
/// - Gradient/Hessian validation errors from the score function.
/// - `OptError::NonFiniteStep` when the step contains NaN or infinity.
///
/// Notes
/// -----
/// - Each iteration solves `H Δ = -g` after [`stabilize`] has made `H`
///   negative definite; when the Cholesky solve still fails the step falls
///   back to the gradient direction.
/// - Steps are scaled so that `max |Δ| ≤ max_step`. With
///   [`ScoreFunction::value`] available the step is halved (at most
///   `max_halvings` times) until the objective no longer decreases.
/// - A vanishing gradient at the start returns `initial` unchanged.
pub fn solve<S: ScoreFunction + ?Sized>(
    score: &S, initial: &ParamTree, opts: &NewtonOptions,
) -> OptResult<NewtonOutcome> {
    let encoded = try_encode(initial)?;
    let descriptor = encoded.descriptor;
    let mut x = encoded.vector;
    let dim = x.len();
    let mut stabilized_steps = 0;
    let mut max_step_taken = 0.0;
    let mut grad_norm = f64::NAN;
    #[cfg(feature = "obs_slog")]
    let log = opts.verbose.then(crate::optimization::logging::terminal_logger);

    for iter in 0..opts.max_iter {
        let point = try_decode(&x, &descriptor)?;
        let grad = flatten_gradient(&score.gradient(&point)?, dim)?;
        grad_norm = grad.dot(&grad).sqrt();
        if max_abs(&grad) <= GENERAL_TOL {
            let estimate = if iter == 0 { initial.clone() } else { point };
            return Ok(NewtonOutcome {
                estimate,
                converged: true,
                status: NewtonStatus::ZeroGradient,
                iterations: iter,
                max_step_taken,
                grad_norm,
                stabilized_steps,
            });
        }

        let hessian = score.hessian(&point)?;
        validate_hessian(&hessian, dim)?;
        let stabilized = stabilize(&hessian, opts.ridge_floor);
        let mut step = match newton_direction(&stabilized.matrix, &grad) {
            Some(delta) => {
                if stabilized.shifted {
                    stabilized_steps += 1;
                }
                delta
            }
            None => {
                stabilized_steps += 1;
                grad.clone()
            }
        };
        if let Some(index) = step.iter().position(|v| !v.is_finite()) {
            return Err(OptError::NonFiniteStep { index, value: step[index] });
        }
        let longest = max_abs(&step);
        if longest > opts.max_step {
            step *= opts.max_step / longest;
        }

        let next = damped_update(score, &x, &step, &descriptor, opts)?;
        max_step_taken = max_abs(&(&next - &x));
        x = next;

        #[cfg(feature = "obs_slog")]
        if let Some(log) = &log {
            slog::info!(log, "newton iteration";
                "iter" => iter + 1,
                "grad_norm" => grad_norm,
                "step" => max_step_taken,
                "max_eigenvalue" => stabilized.max_eigenvalue,
                "shifted" => stabilized.shifted);
        }

        if max_step_taken < opts.tolerance {
            return Ok(NewtonOutcome {
                estimate: try_decode(&x, &descriptor)?,
                converged: true,
                status: NewtonStatus::StepTolerance,
                iterations: iter + 1,
                max_step_taken,
                grad_norm,
                stabilized_steps,
            });
        }
    }

    Ok(NewtonOutcome {
        estimate: try_decode(&x, &descriptor)?,
        converged: false,
        status: NewtonStatus::MaxIterations,
        iterations: opts.max_iter,
        max_step_taken,
        grad_norm,
        stabilized_steps,
    })
}

// ---- Helper methods ----

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

/// Projected iterate `x + t Δ`, halving `t` while the objective decreases.
fn damped_update<S: ScoreFunction + ?Sized>(
    score: &S, x: &Theta, step: &Array1<f64>, descriptor: &Descriptor, opts: &NewtonOptions,
) -> OptResult<Theta> {
    let mut candidate = project(score, &(x + step), descriptor)?;
    let baseline = match score.value(&try_decode(x, descriptor)?).transpose()? {
        Some(v) => v,
        None => return Ok(candidate),
    };
    let mut t = 1.0;
    for _ in 0..opts.max_halvings {
        let trial = score.value(&try_decode(&candidate, descriptor)?).transpose()?;
        if matches!(trial, Some(v) if v.is_finite() && v >= baseline) {
            return Ok(candidate);
        }
        t *= 0.5;
        candidate = project(score, &(x + &(step * t)), descriptor)?;
    }
    Ok(candidate)
}

fn project<S: ScoreFunction + ?Sized>(
    score: &S, x: &Theta, descriptor: &Descriptor,
) -> OptResult<Theta> {
    let projected = try_encode(&score.trusted_region(try_decode(x, descriptor)?))?;
    if projected.descriptor != *descriptor {
        return Err(OptError::EncodingFailed {
            reason: "trusted region changed the parameter shape".to_string(),
        });
    }
    Ok(projected.vector)
}
