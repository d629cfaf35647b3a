//! models::kernel — closed-form four-parameter logistic response kernel.
//!
//! Purpose
//! -------
//! Evaluate `p(θ) = c + (d − c)·σ(a(θ − b))` and every derivative the
//! response models need, once, for all four parameters. Models with fewer
//! free parameters take a leading slice of the canonical order
//! `[difficulty b, discrimination a, guessing c, upper d]`.
//!
//! Key behaviors
//! -------------
//! - [`Logistic::at`] evaluates `σ`, `1 − σ`, `p` and `1 − p` without
//!   cancellation.
//! - Likelihood derivatives are written in terms of the ratios
//!   `r₁ = (d − c)σ / p` and `r₀ = (d − c)(1 − σ) / (1 − p)`, both in
//!   `[0, 1]`. They cancel the `p(1 − p)` denominators analytically, so the
//!   ability score stays `a(k − p)` for 1PL/2PL even where `p` underflows.
//!
//! Invariants & assumptions
//! ------------------------
//! - `d − c > 0`, `a`, `b` finite (see `ItemParams::validate`).
//! - `k ∈ [0, 1]`; partial credit enters as `k ln p + (1 − k) ln(1 − p)`.
//!
//! Testing notes
//! -------------
//! - Derivatives are checked against central differences of the
//!   probability and log-likelihood at a generic 4PL point.
use ndarray::{Array1, Array2};

use crate::{
    models::params::ItemParams,
    optimization::numerical_stability::{clamp_probability, log_logistic, safe_logistic},
};

/// Number of parameters in the canonical order.
pub const FULL_DIM: usize = 4;

/// Logistic kernel evaluated at one `(θ, ip)` pair.
#[derive(Debug, Clone, Copy)]
pub struct Logistic {
    pub ip: ItemParams,
    /// `θ − b`.
    pub centered: f64,
    pub sigma: f64,
    /// `1 − σ`, computed as `σ(−z)`.
    pub sigma_c: f64,
    pub p: f64,
    /// `1 − p`, computed from the upper asymptote side.
    pub q: f64,
}

impl Logistic {
    pub fn at(theta: f64, ip: &ItemParams) -> Self {
        let centered = theta - ip.difficulty;
        let z = ip.discrimination * centered;
        let sigma = safe_logistic(z);
        let sigma_c = safe_logistic(-z);
        let span = ip.upper - ip.guessing;
        let p = ip.guessing + span * sigma;
        let q = (1.0 - ip.upper) + span * sigma_c;
        Self { ip: *ip, centered, sigma, sigma_c, p, q }
    }

    fn span(&self) -> f64 {
        self.ip.upper - self.ip.guessing
    }

    /// `σ(1 − σ)`.
    fn s(&self) -> f64 {
        self.sigma * self.sigma_c
    }

    /// `(r₁, r₀)`; each defaults to 1 in the limit where its denominator
    /// vanishes (only reachable with `c = 0` or `d = 1`).
    fn ratios(&self) -> (f64, f64) {
        let span = self.span();
        let r1 = if self.p > 0.0 { span * self.sigma / self.p } else { 1.0 };
        let r0 = if self.q > 0.0 { span * self.sigma_c / self.q } else { 1.0 };
        (r1, r0)
    }

    /// `k − p` evaluated as `k(1 − p) − (1 − k)p`.
    fn residual(&self, k: f64) -> f64 {
        k * self.q - (1.0 - k) * self.p
    }

    /// `L_p · (d − c)σ(1 − σ)`, finite for every `θ`.
    fn score_q(&self, k: f64) -> f64 {
        let (r1, r0) = self.ratios();
        self.residual(k) * r1 * r0 / self.span()
    }

    /// `L_pp · ((d − c)σ(1 − σ))²`.
    fn curvature_qq(&self, k: f64) -> f64 {
        let (r1, r0) = self.ratios();
        -(k * (r1 * self.sigma_c).powi(2) + (1.0 - k) * (r0 * self.sigma).powi(2))
    }

    /// `L_pp · (d − c)σ(1 − σ)`, using clamped probabilities for the
    /// asymptote terms.
    fn curvature_q(&self, k: f64) -> f64 {
        let (r1, r0) = self.ratios();
        let pc = clamp_probability(self.p);
        let qc = clamp_probability(self.q);
        -(k * r1 * self.sigma_c / pc + (1.0 - k) * r0 * self.sigma / qc)
    }

    /// `L_p` and `L_pp` with clamped probabilities.
    fn raw_derivatives(&self, k: f64) -> (f64, f64) {
        let pc = clamp_probability(self.p);
        let qc = clamp_probability(self.q);
        let lp = self.residual(k) / (pc * qc);
        let lpp = -k / (pc * pc) - (1.0 - k) / (qc * qc);
        (lp, lpp)
    }

    // ---- Likelihood in θ ----

    pub fn log_likelihood(&self, k: f64) -> f64 {
        let ip = &self.ip;
        let (ln_p, ln_q) = if ip.guessing == 0.0 && ip.upper == 1.0 {
            let z = ip.discrimination * self.centered;
            (log_logistic(z), log_logistic(-z))
        } else {
            (clamp_probability(self.p).ln(), clamp_probability(self.q).ln())
        };
        let mut value = 0.0;
        if k > 0.0 {
            value += k * ln_p;
        }
        if k < 1.0 {
            value += (1.0 - k) * ln_q;
        }
        value
    }

    pub fn dtheta(&self, k: f64) -> f64 {
        self.ip.discrimination * self.score_q(k)
    }

    pub fn d2theta(&self, k: f64) -> f64 {
        let a2 = self.ip.discrimination.powi(2);
        a2 * (self.curvature_qq(k) + self.score_q(k) * (1.0 - 2.0 * self.sigma))
    }

    /// Fisher information `p'(θ)² / (p(1 − p))`.
    pub fn information(&self) -> f64 {
        let (r1, r0) = self.ratios();
        self.ip.discrimination.powi(2) * self.s() * r1 * r0
    }

    /// `∂p/∂θ`.
    pub fn dp_dtheta(&self) -> f64 {
        self.span() * self.ip.discrimination * self.s()
    }

    // ---- Probability partials in the item parameters ----

    /// `∂p/∂φ` in canonical order.
    pub fn dp(&self) -> [f64; FULL_DIM] {
        let a = self.ip.discrimination;
        let qf = self.span() * self.s();
        [-a * qf, self.centered * qf, self.sigma_c, self.sigma]
    }

    /// `∂²p/∂φᵢ∂φⱼ` in canonical order.
    pub fn d2p(&self) -> [[f64; FULL_DIM]; FULL_DIM] {
        let a = self.ip.discrimination;
        let t = self.centered;
        let s = self.s();
        let qf = self.span() * s;
        let tilt = 1.0 - 2.0 * self.sigma;

        let bb = a * a * qf * tilt;
        let ba = -qf * (1.0 + a * tilt * t);
        let aa = qf * tilt * t * t;
        let bc = a * s;
        let ac = -s * t;
        [[bb, ba, bc, -bc], [ba, aa, ac, -ac], [bc, ac, 0.0, 0.0], [-bc, -ac, 0.0, 0.0]]
    }

    // ---- Likelihood partials in the item parameters ----

    /// `∂L/∂φ` in canonical order.
    pub fn dl(&self, k: f64) -> [f64; FULL_DIM] {
        let a = self.ip.discrimination;
        let sq = self.score_q(k);
        let (lp, _) = self.raw_derivatives(k);
        [-a * sq, self.centered * sq, lp * self.sigma_c, lp * self.sigma]
    }

    /// `∂²L/∂φᵢ∂φⱼ = L_pp p_i p_j + L_p p_ij` in canonical order.
    pub fn d2l(&self, k: f64) -> [[f64; FULL_DIM]; FULL_DIM] {
        let a = self.ip.discrimination;
        let t = self.centered;
        let tilt = 1.0 - 2.0 * self.sigma;
        let sq = self.score_q(k);
        let cqq = self.curvature_qq(k);
        let cq = self.curvature_q(k);
        let (_, lpp) = self.raw_derivatives(k);
        let ls = sq / self.span();
        let (sig, sig_c) = (self.sigma, self.sigma_c);

        let bb = a * a * (cqq + sq * tilt);
        let ba = -a * t * cqq - sq * (1.0 + a * tilt * t);
        let aa = t * t * (cqq + sq * tilt);
        let bc = -a * sig_c * cq + a * ls;
        let bd = -a * sig * cq - a * ls;
        let ac = t * (sig_c * cq - ls);
        let ad = t * (sig * cq + ls);
        let cc = lpp * sig_c * sig_c;
        let cd = lpp * sig * sig_c;
        let dd = lpp * sig * sig;
        // p is linear in c and d.
        [[bb, ba, bc, bd], [ba, aa, ac, ad], [bc, ac, cc, cd], [bd, ad, cd, dd]]
    }
}

/// Leading `dim` entries of a canonical vector.
pub fn leading(values: [f64; FULL_DIM], dim: usize) -> Array1<f64> {
    Array1::from_iter(values.into_iter().take(dim))
}

/// Leading `dim × dim` block of a canonical matrix.
pub fn leading_block(values: [[f64; FULL_DIM]; FULL_DIM], dim: usize) -> Array2<f64> {
    Array2::from_shape_fn((dim, dim), |(i, j)| values[i][j])
}
