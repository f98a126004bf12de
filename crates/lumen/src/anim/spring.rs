use std::time::Duration;
use thiserror::Error;

/// Below this distance from 1.0 (and with velocity under [`REST_VELOCITY`]) a spring is at rest.
pub const REST_DISPLACEMENT: f64 = 1e-3;
pub const REST_VELOCITY: f64 = 1e-2;

/// Springs that have not settled after this long are snapped to rest.
pub const MAX_SETTLE: Duration = Duration::from_secs(10);

const CRITICAL_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum SpringError {
    #[error("spring stiffness must be positive and finite, got {0}")]
    Stiffness(f64),
    #[error("spring damping must be non-negative and finite, got {0}")]
    Damping(f64),
    #[error("spring mass must be positive and finite, got {0}")]
    Mass(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DampingKind {
    Under,
    Critical,
    Over,
}

/// A damped harmonic oscillator released from rest at 0 and pulled toward 1.
///
/// Positions are evaluated in closed form, so sampling is independent of frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    stiffness: f64,
    damping: f64,
    mass: f64,
}

impl Default for Spring {
    /// Critically damped: reaches 1 without overshoot in roughly 0.65 s.
    fn default() -> Self {
        Self {
            stiffness: 196.0,
            damping: 28.0,
            mass: 1.0,
        }
    }
}

impl Spring {
    pub fn new(stiffness: f64, damping: f64, mass: f64) -> Result<Self, SpringError> {
        if !(stiffness.is_finite() && stiffness > 0.0) {
            return Err(SpringError::Stiffness(stiffness));
        }
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(SpringError::Damping(damping));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SpringError::Mass(mass));
        }
        Ok(Self {
            stiffness,
            damping,
            mass,
        })
    }

    /// The critically damped spring with the given stiffness and mass.
    pub fn critical(stiffness: f64, mass: f64) -> Result<Self, SpringError> {
        Self::new(stiffness, 2.0 * (stiffness * mass).sqrt(), mass)
    }

    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    pub fn kind(&self) -> DampingKind {
        let zeta = self.damping_ratio();
        if (zeta - 1.0).abs() < CRITICAL_TOLERANCE {
            DampingKind::Critical
        } else if zeta < 1.0 {
            DampingKind::Under
        } else {
            DampingKind::Over
        }
    }

    /// Position and velocity at `t` seconds after release.
    pub fn state_at(&self, t: f64) -> (f64, f64) {
        if t <= 0.0 {
            return (0.0, 0.0);
        }

        let w0 = self.natural_frequency();
        let zeta = self.damping_ratio();

        match self.kind() {
            DampingKind::Critical => {
                let decay = (-w0 * t).exp();
                (1.0 - (1.0 + w0 * t) * decay, w0 * w0 * t * decay)
            }
            DampingKind::Under => {
                let wd = w0 * (1.0 - zeta * zeta).sqrt();
                let decay = (-zeta * w0 * t).exp();
                let (sin, cos) = (wd * t).sin_cos();
                let offset = -decay * (cos + (zeta * w0 / wd) * sin);
                (1.0 + offset, decay * (w0 * w0 / wd) * sin)
            }
            DampingKind::Over => {
                let root = (zeta * zeta - 1.0).sqrt();
                let r1 = -w0 * (zeta - root);
                let r2 = -w0 * (zeta + root);
                let c1 = r2 / (r1 - r2);
                let c2 = -r1 / (r1 - r2);
                let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
                (1.0 + c1 * e1 + c2 * e2, c1 * r1 * e1 + c2 * r2 * e2)
            }
        }
    }

    pub fn is_at_rest(&self, t: f64) -> bool {
        let (x, v) = self.state_at(t);
        t > 0.0 && (1.0 - x).abs() < REST_DISPLACEMENT && v.abs() < REST_VELOCITY
    }

    /// First millisecond at which the spring is at rest, capped at [`MAX_SETTLE`].
    pub fn settle_time(&self) -> Duration {
        (1..=MAX_SETTLE.as_millis() as u64)
            .map(Duration::from_millis)
            .find(|d| self.is_at_rest(d.as_secs_f64()))
            .unwrap_or(MAX_SETTLE)
    }
}
