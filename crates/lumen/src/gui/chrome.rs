use crate::anim::{Choreography, Easing, Motion, Track, TrackId};
use std::time::Duration;

/// Vertical distance the header and footer travel while fading in.
pub const SLIDE_DISTANCE: f64 = 16.0;
const HEADER_MS: u64 = 450;
const FOOTER_DELAY_MS: u64 = 600;
const FOOTER_MS: u64 = 400;

/// Entrance timeline for the text around the menu.
#[derive(Debug, Clone)]
pub struct Chrome {
    timeline: Choreography,
    header: TrackId,
    footer: TrackId,
}

impl Chrome {
    pub fn new(reduced_motion: bool) -> Self {
        let mut timeline = Choreography::new(reduced_motion);
        let header = timeline.add(Track::new(
            Duration::ZERO,
            Motion::timed(HEADER_MS, Easing::CubicOut),
        ));
        let footer = timeline.add(Track::new(
            Duration::from_millis(FOOTER_DELAY_MS),
            Motion::timed(FOOTER_MS, Easing::CubicOut),
        ));
        Self {
            timeline,
            header,
            footer,
        }
    }

    pub fn start(&mut self) {
        self.timeline.start();
    }

    pub fn tick(&mut self, now: Duration) -> bool {
        self.timeline.tick(now)
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.timeline.set_reduced_motion(reduced);
    }

    pub fn header_opacity(&self) -> f64 {
        self.timeline.progress(self.header).clamped()
    }

    /// Downward offset of the header, in pixels.
    pub fn header_offset(&self) -> f64 {
        self.timeline.progress(self.header).lerp(SLIDE_DISTANCE, 0.0)
    }

    pub fn footer_opacity(&self) -> f64 {
        self.timeline.progress(self.footer).clamped()
    }

    /// Upward offset of the footer, in pixels.
    pub fn footer_offset(&self) -> f64 {
        self.timeline.progress(self.footer).lerp(SLIDE_DISTANCE, 0.0)
    }
}
