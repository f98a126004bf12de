use super::progress::{Motion, Progress, Track};
use std::f64::consts::TAU;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Started, waiting for the first frame timestamp.
    Pending,
    Running { origin: Duration },
    Settled,
}

/// A set of delayed tracks started together and advanced by frame timestamps.
///
/// With reduced motion every track lands on 1 the moment the timeline starts, without
/// waiting for a frame.
#[derive(Debug, Clone)]
pub struct Choreography {
    tracks: Vec<Track>,
    progress: Vec<Progress>,
    phase: Phase,
    reduced_motion: bool,
}

impl Choreography {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            tracks: Vec::new(),
            progress: Vec::new(),
            phase: Phase::Idle,
            reduced_motion,
        }
    }

    pub fn add(&mut self, track: Track) -> TrackId {
        self.tracks.push(track);
        self.progress.push(Progress::default());
        TrackId(self.tracks.len() - 1)
    }

    /// Adds `count` tracks sharing `motion`, the i-th delayed by `base + i * stagger`.
    pub fn add_staggered(
        &mut self,
        count: usize,
        base: Duration,
        stagger: Duration,
        motion: Motion,
    ) -> Vec<TrackId> {
        (0..count)
            .map(|i| self.add(Track::new(base + stagger * i as u32, motion)))
            .collect()
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Switching reduced motion on mid-flight jumps straight to the end state.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if reduced && self.phase != Phase::Idle {
            self.finish();
        }
    }

    pub fn start(&mut self) {
        if self.reduced_motion {
            self.finish();
            return;
        }
        self.progress.fill(Progress::default());
        self.phase = Phase::Pending;
    }

    pub fn finish(&mut self) {
        self.progress.iter_mut().for_each(Progress::finish);
        self.phase = Phase::Settled;
    }

    /// Advances every track to frame time `now`. Returns whether anything is still moving.
    pub fn tick(&mut self, now: Duration) -> bool {
        let origin = match self.phase {
            Phase::Idle | Phase::Settled => return false,
            Phase::Pending => {
                self.phase = Phase::Running { origin: now };
                now
            }
            Phase::Running { origin } => origin,
        };

        let elapsed = now.saturating_sub(origin);
        for (track, progress) in self.tracks.iter().zip(&mut self.progress) {
            progress.apply(track.sample(elapsed));
        }

        if self.progress.iter().all(Progress::is_done) {
            self.phase = Phase::Settled;
            false
        } else {
            true
        }
    }

    pub fn progress(&self, id: TrackId) -> &Progress {
        &self.progress[id.0]
    }

    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }
}

/// Slow idle scale oscillation for an element at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breathing {
    pub amplitude: f64,
    pub period: Duration,
}

impl Breathing {
    pub fn scale_at(&self, since: Duration) -> f64 {
        if self.period.is_zero() {
            return 1.0;
        }
        let phase = since.as_secs_f64() / self.period.as_secs_f64();
        1.0 + self.amplitude * (TAU * phase).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{Easing, Spring};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn staggered(reduced: bool) -> (Choreography, Vec<TrackId>) {
        let mut c = Choreography::new(reduced);
        let ids = c.add_staggered(3, ms(100), ms(50), Motion::timed(200, Easing::Linear));
        (c, ids)
    }

    #[test]
    fn test_nothing_moves_before_start() {
        let (mut c, ids) = staggered(false);
        assert!(!c.tick(ms(1000)));
        assert_eq!(c.progress(ids[0]).value(), 0.0);
        assert!(!c.is_settled());
    }

    #[test]
    fn test_stagger_offsets() {
        let (mut c, ids) = staggered(false);
        c.start();
        assert!(c.tick(ms(5000)));
        // 200ms after the first frame: track 0 started 100ms ago, track 2 only now
        assert!(c.tick(ms(5200)));
        assert!((c.progress(ids[0]).value() - 0.5).abs() < 1e-9);
        assert!((c.progress(ids[1]).value() - 0.25).abs() < 1e-9);
        assert_eq!(c.progress(ids[2]).value(), 0.0);

        assert!(c.tick(ms(5399)));
        assert!(!c.tick(ms(5400)));
        assert!(c.is_settled());
        assert!(ids.iter().all(|&id| c.progress(id).value() == 1.0));
    }

    #[test]
    fn test_progress_is_monotonic_under_spring() {
        let mut c = Choreography::new(false);
        let ids = c.add_staggered(4, ms(0), ms(40), Motion::Spring(Spring::default()));
        c.start();
        let mut last = vec![0.0; ids.len()];
        for frame in 0..120 {
            c.tick(ms(frame * 16));
            for (i, &id) in ids.iter().enumerate() {
                let v = c.progress(id).value();
                assert!(v >= last[i] && v <= 1.0);
                last[i] = v;
            }
        }
        assert!(c.is_settled());
    }

    #[test]
    fn test_reduced_motion_lands_immediately() {
        let (mut c, ids) = staggered(true);
        c.start();
        assert!(c.is_settled());
        assert!(ids.iter().all(|&id| c.progress(id).value() == 1.0));
        assert!(!c.tick(ms(1)));
    }

    #[test]
    fn test_reduced_motion_mid_flight() {
        let (mut c, ids) = staggered(false);
        c.start();
        c.tick(ms(0));
        c.tick(ms(150));
        assert!(c.progress(ids[2]).value() < 1.0);

        c.set_reduced_motion(true);
        assert!(c.is_settled());
        assert!(ids.iter().all(|&id| c.progress(id).is_done()));
    }

    #[test]
    fn test_restart_resets_progress() {
        let (mut c, ids) = staggered(false);
        c.start();
        c.tick(ms(0));
        c.tick(ms(1000));
        assert!(c.is_settled());

        c.start();
        assert_eq!(c.progress(ids[0]).value(), 0.0);
        assert!(!c.is_settled());
    }

    #[test]
    fn test_breathing() {
        let b = Breathing {
            amplitude: 0.05,
            period: ms(2000),
        };
        assert!((b.scale_at(Duration::ZERO) - 1.0).abs() < 1e-12);
        assert!((b.scale_at(ms(500)) - 1.05).abs() < 1e-12);
        assert!((b.scale_at(ms(1500)) - 0.95).abs() < 1e-12);

        let still = Breathing {
            amplitude: 0.05,
            period: Duration::ZERO,
        };
        assert_eq!(still.scale_at(ms(500)), 1.0);
    }
}
