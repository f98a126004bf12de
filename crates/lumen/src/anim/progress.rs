use super::easing::Easing;
use super::spring::Spring;
use std::time::Duration;

/// How a progress value travels from 0 to 1 once its track has started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Spring(Spring),
    Timed { duration: Duration, easing: Easing },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub done: bool,
}

impl Sample {
    pub const START: Self = Self {
        value: 0.0,
        done: false,
    };
    pub const END: Self = Self {
        value: 1.0,
        done: true,
    };
}

impl Motion {
    pub fn timed(millis: u64, easing: Easing) -> Self {
        Self::Timed {
            duration: Duration::from_millis(millis),
            easing,
        }
    }

    /// Samples the curve `t` after it started. Settled curves report exactly 1.
    pub fn sample(&self, t: Duration) -> Sample {
        match *self {
            Self::Spring(spring) => {
                let secs = t.as_secs_f64();
                if secs > 0.0 && (spring.is_at_rest(secs) || t >= super::spring::MAX_SETTLE) {
                    Sample::END
                } else {
                    Sample {
                        value: spring.state_at(secs).0,
                        done: false,
                    }
                }
            }
            Self::Timed { duration, easing } => {
                if t >= duration {
                    Sample::END
                } else {
                    Sample {
                        value: easing.apply(t.as_secs_f64() / duration.as_secs_f64()),
                        done: false,
                    }
                }
            }
        }
    }
}

/// A motion that begins `delay` after its timeline starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub delay: Duration,
    pub motion: Motion,
}

impl Track {
    pub fn new(delay: Duration, motion: Motion) -> Self {
        Self { delay, motion }
    }

    pub fn sample(&self, elapsed: Duration) -> Sample {
        match elapsed.checked_sub(self.delay) {
            Some(t) => self.motion.sample(t),
            None => Sample::START,
        }
    }
}

/// One animated scalar. Writers need `&mut`, so whoever owns the cell is its only writer;
/// paint code only ever gets `&Progress`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    value: f64,
    done: bool,
}

impl Progress {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value limited to 0..=1, for properties such as opacity that cannot overshoot.
    pub fn clamped(&self) -> f64 {
        self.value.clamp(0.0, 1.0)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Linear blend between `from` and `to` at the current value.
    pub fn lerp(&self, from: f64, to: f64) -> f64 {
        from + (to - from) * self.value
    }

    pub(crate) fn apply(&mut self, sample: Sample) {
        self.value = sample.value;
        self.done = sample.done;
    }

    pub(crate) fn finish(&mut self) {
        self.apply(Sample::END);
    }
}
