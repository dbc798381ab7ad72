use crate::foundation::error::{RevealError, RevealResult};

/// Largest integration step; longer frame deltas are split into equal substeps.
const MAX_SUBSTEP_SECS: f64 = 1.0 / 240.0;
/// Upper bound on substeps per call so a huge `dt` (tab restored after an hour) stays cheap.
const MAX_SUBSTEPS: u32 = 4096;
/// Displacement and velocity below this settle the spring exactly on its target.
const REST_EPS: f64 = 1e-4;

/// Physical parameters of a damped harmonic oscillator.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 120.0,
            damping: 20.0,
            mass: 1.0,
        }
    }
}

impl SpringParams {
    pub fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Parameters with `damping = 2 * sqrt(stiffness * mass)`.
    pub fn critically_damped(stiffness: f64, mass: f64) -> Self {
        let damping = 2.0 * (stiffness.max(0.0) * mass.max(0.0)).sqrt();
        Self::new(stiffness, damping, mass)
    }

    /// Damping ratio `zeta`; 1.0 is critical, below oscillates, above creeps.
    pub fn damping_ratio(&self) -> f64 {
        let denom = 2.0 * (self.stiffness * self.mass).sqrt();
        if denom <= 0.0 {
            return f64::INFINITY;
        }
        self.damping / denom
    }

    pub fn validate(&self) -> RevealResult<()> {
        if !self.stiffness.is_finite() || self.stiffness <= 0.0 {
            return Err(RevealError::config("spring stiffness must be finite and > 0"));
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(RevealError::config("spring damping must be finite and >= 0"));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(RevealError::config("spring mass must be finite and > 0"));
        }
        Ok(())
    }
}

/// A scalar value chasing a target through a damped harmonic oscillator.
///
/// The target may change at any time; the value never jumps, it accelerates toward the new
/// target from its current position and velocity.
#[derive(Clone, Debug)]
pub struct Spring {
    params: SpringParams,
    value: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    pub fn new(params: SpringParams, initial: f64) -> Self {
        Self {
            params,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn params(&self) -> SpringParams {
        self.params
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Place the value on `v` at rest, without animating.
    pub fn jump_to(&mut self, v: f64) {
        if v.is_finite() {
            self.value = v;
            self.target = v;
            self.velocity = 0.0;
        }
    }

    pub fn is_at_rest(&self, eps: f64) -> bool {
        (self.value - self.target).abs() <= eps && self.velocity.abs() <= eps
    }

    /// Advance the oscillator by `dt_secs` and return the new value.
    ///
    /// Semi-implicit Euler over fixed substeps of at most [`MAX_SUBSTEP_SECS`].
    pub fn step(&mut self, dt_secs: f64) -> f64 {
        if !dt_secs.is_finite() || dt_secs <= 0.0 {
            return self.value;
        }

        let n = ((dt_secs / MAX_SUBSTEP_SECS).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let h = dt_secs / f64::from(n);
        let SpringParams {
            stiffness: k,
            damping: c,
            mass: m,
        } = self.params;

        for _ in 0..n {
            let accel = (-k * (self.value - self.target) - c * self.velocity) / m;
            self.velocity += accel * h;
            self.value += self.velocity * h;
        }

        if self.is_at_rest(REST_EPS) {
            self.value = self.target;
            self.velocity = 0.0;
        }
        self.value
    }
}

/// Closed-form unit step response `x(t)` for `x(0)=0, v(0)=0, target=1`.
pub fn step_response(params: SpringParams, t: f64) -> f64 {
    let k = params.stiffness.max(0.0);
    let c = params.damping.max(0.0);
    let m = params.mass.max(1e-9);

    let w0 = (k / m).sqrt();
    if w0 == 0.0 {
        return t;
    }
    let zeta = c / (2.0 * (k * m).sqrt()).max(1e-9);

    if (zeta - 1.0).abs() < 1e-6 {
        let e = (-w0 * t).exp();
        1.0 - e * (1.0 + w0 * t)
    } else if zeta < 1.0 {
        let wd = w0 * (1.0 - zeta * zeta).sqrt();
        let e = (-zeta * w0 * t).exp();
        let c1 = (wd * t).cos();
        let s1 = (wd * t).sin();
        let k = zeta / (1.0 - zeta * zeta).sqrt();
        1.0 - e * (c1 + k * s1)
    } else {
        let z2 = (zeta * zeta - 1.0).sqrt();
        let r1 = -w0 * (zeta - z2);
        let r2 = -w0 * (zeta + z2);
        let c2 = (zeta + z2) / (2.0 * z2);
        let c1 = (zeta - z2) / (2.0 * z2);
        1.0 - (c2 * (r1 * t).exp() - c1 * (r2 * t).exp())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
