use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SliderError {
    #[error("slider bounds must be finite, got {min}..{max}")]
    NonFiniteBounds { min: f64, max: f64 },
    #[error("slider max ({max}) must be greater than min ({min})")]
    EmptyRange { min: f64, max: f64 },
    #[error("slider step must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("slider value must be finite, got {0}")]
    NonFiniteValue(f64),
}

/// A validated numeric range with optional quantisation.
///
/// `step: None` means continuous. A step of zero is rejected rather than read as
/// "continuous" so that a typo in a config file cannot silently disable snapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min: f64,
    max: f64,
    step: Option<f64>,
}

impl ValueRange {
    pub fn new(min: f64, max: f64, step: Option<f64>) -> Result<Self, SliderError> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(SliderError::NonFiniteBounds { min, max });
        }
        if max <= min {
            return Err(SliderError::EmptyRange { min, max });
        }
        if let Some(step) = step
            && !(step.is_finite() && step > 0.0)
        {
            return Err(SliderError::InvalidStep(step));
        }
        Ok(Self { min, max, step })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> Option<f64> {
        self.step
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Where `value` sits in the range, 0..=1.
    pub fn normalize(&self, value: f64) -> f64 {
        ((value - self.min) / self.span()).clamp(0.0, 1.0)
    }

    /// The raw value at normalised position `t`, without snapping.
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t.clamp(0.0, 1.0) * self.span()
    }

    /// Rounds to the nearest whole step above `min`, never past the last step that still
    /// fits below `max`.
    pub fn snap(&self, raw: f64) -> f64 {
        let raw = raw.clamp(self.min, self.max);
        match self.step {
            None => raw,
            Some(step) => {
                let last = (self.span() / step + 1e-9).floor();
                let index = ((raw - self.min) / step).round().min(last);
                (self.min + index * step).min(self.max)
            }
        }
    }

    /// Decimal places worth displaying for this range's step.
    pub fn precision(&self) -> usize {
        match self.step {
            None => 2,
            Some(step) => (0..6)
                .find(|&p| {
                    let scaled = step * 10f64.powi(p as i32);
                    (scaled - scaled.round()).abs() < 1e-6
                })
                .unwrap_or(6),
        }
    }

    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", self.precision(), value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    anchor: f64,
    track_length: f64,
    start_value: f64,
}

/// Value of one slider plus the gesture currently moving it.
///
/// A gesture is `begin*` then any number of [`update`](Self::update) calls, then either
/// [`end`](Self::end), which yields the commit value, or [`cancel`](Self::cancel), which
/// yields nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    range: ValueRange,
    value: f64,
    drag: Option<Drag>,
}

impl SliderState {
    pub fn new(range: ValueRange, initial: f64) -> Result<Self, SliderError> {
        if !initial.is_finite() {
            return Err(SliderError::NonFiniteValue(initial));
        }
        Ok(Self {
            range,
            value: range.snap(initial),
            drag: None,
        })
    }

    pub fn range(&self) -> &ValueRange {
        &self.range
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn normalized(&self) -> f64 {
        self.range.normalize(self.value)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Replaces the value from outside a gesture. Ignored while dragging so the finger
    /// stays in charge.
    pub fn set_value(&mut self, value: f64) -> bool {
        if self.drag.is_some() || !value.is_finite() {
            return false;
        }
        self.value = self.range.snap(value);
        true
    }

    /// Starts a drag that moves the thumb relative to where it currently is.
    pub fn begin(&mut self, track_length: f64) {
        let anchor = self.normalized() * track_length.max(0.0);
        self.drag = Some(Drag {
            anchor,
            track_length,
            start_value: self.value,
        });
    }

    /// Starts a drag at an absolute track position, moving the thumb there straight away.
    /// Returns the preview value for the new position.
    pub fn begin_at(&mut self, track_length: f64, position: f64) -> f64 {
        self.drag = Some(Drag {
            anchor: position.clamp(0.0, track_length.max(0.0)),
            track_length,
            start_value: self.value,
        });
        self.update(0.0)
    }

    /// Applies the total displacement since the gesture began and returns the preview value.
    /// Outside a gesture this is a no-op returning the current value.
    pub fn update(&mut self, displacement: f64) -> f64 {
        let Some(drag) = self.drag else {
            return self.value;
        };

        if drag.track_length > 0.0 && displacement.is_finite() {
            let normalized = ((drag.anchor + displacement) / drag.track_length).clamp(0.0, 1.0);
            let position_value = self.range.snap(self.range.lerp(normalized));
            // a thumb-anchored drag that has not moved keeps its exact start value
            let unmoved = displacement == 0.0
                && (drag.anchor - self.range.normalize(drag.start_value) * drag.track_length)
                    .abs()
                    < f64::EPSILON;
            self.value = if unmoved {
                drag.start_value
            } else {
                position_value
            };
        }
        self.value
    }

    /// Finishes the gesture and returns the commit value, or `None` if no gesture was active.
    pub fn end(&mut self) -> Option<f64> {
        self.drag.take().map(|_| self.value)
    }

    /// Abandons the gesture, restoring the value it started from. No commit is produced.
    pub fn cancel(&mut self) -> bool {
        match self.drag.take() {
            Some(drag) => {
                self.value = drag.start_value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contrast() -> SliderState {
        SliderState::new(ValueRange::new(0.5, 3.0, Some(0.1)).unwrap(), 1.0).unwrap()
    }

    fn assert_on_grid(range: &ValueRange, value: f64) {
        let step = range.step().unwrap();
        let steps = (value - range.min()) / step;
        assert!(
            (steps - steps.round()).abs() < 1e-9,
            "{value} is not a whole step above {}",
            range.min()
        );
    }

    #[test]
    fn test_range_validation() {
        assert_eq!(
            ValueRange::new(1.0, 1.0, None),
            Err(SliderError::EmptyRange { min: 1.0, max: 1.0 })
        );
        assert_eq!(
            ValueRange::new(2.0, 1.0, None),
            Err(SliderError::EmptyRange { min: 2.0, max: 1.0 })
        );
        assert_eq!(
            ValueRange::new(0.0, 1.0, Some(0.0)),
            Err(SliderError::InvalidStep(0.0))
        );
        assert_eq!(
            ValueRange::new(0.0, 1.0, Some(-0.1)),
            Err(SliderError::InvalidStep(-0.1))
        );
        assert!(matches!(
            ValueRange::new(0.0, f64::INFINITY, None),
            Err(SliderError::NonFiniteBounds { .. })
        ));
        assert!(matches!(
            SliderState::new(ValueRange::new(0.0, 1.0, None).unwrap(), f64::NAN),
            Err(SliderError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn test_drag_to_middle_of_track() {
        // 100px of a 200px track over 0.5..3.0 is 1.75, which rounds up to 1.8
        let mut slider = contrast();
        slider.begin(200.0);
        let anchor = slider.normalized() * 200.0;
        let value = slider.update(100.0 - anchor);
        assert!((value - 1.8).abs() < 1e-9);
        assert!((slider.end().unwrap() - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_begin_at_position() {
        let mut slider = contrast();
        let value = slider.begin_at(200.0, 100.0);
        assert!((value - 1.8).abs() < 1e-9);
        assert!((slider.update(-1000.0) - 0.5).abs() < 1e-12);
        assert!((slider.update(1000.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamps_instead_of_extrapolating() {
        let mut slider = contrast();
        slider.begin(200.0);
        assert_eq!(slider.update(-5000.0), 0.5);
        assert!(slider.update(5000.0) <= 3.0);
        assert!((slider.update(5000.0) - 3.0).abs() < 1e-9);

        let value = slider.begin_at(200.0, -40.0);
        assert_eq!(value, 0.5);
    }

    #[test]
    fn test_output_stays_in_range_and_on_grid() {
        let ranges = [
            ValueRange::new(0.5, 3.0, Some(0.1)).unwrap(),
            ValueRange::new(-1.0, 1.0, Some(0.05)).unwrap(),
            // span is not a whole number of steps
            ValueRange::new(0.0, 1.0, Some(0.3)).unwrap(),
            ValueRange::new(0.0, 20.0, Some(1.0)).unwrap(),
        ];

        for range in ranges {
            for track in [1.0, 37.0, 200.0, 1024.0] {
                let mut slider = SliderState::new(range, range.min()).unwrap();
                slider.begin(track);
                for d in (-60..=60).map(|i| i as f64 * track / 40.0) {
                    let value = slider.update(d);
                    assert!(value >= range.min() && value <= range.max());
                    assert_on_grid(&range, value);
                }
                slider.end();
            }
        }
    }

    #[test]
    fn test_uneven_span_caps_at_last_step() {
        let range = ValueRange::new(0.0, 1.0, Some(0.3)).unwrap();
        assert!((range.snap(1.0) - 0.9).abs() < 1e-12);
        assert!((range.snap(0.95) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_continuous_range() {
        let range = ValueRange::new(0.0, 10.0, None).unwrap();
        let mut slider = SliderState::new(range, 0.0).unwrap();
        slider.begin(100.0);
        assert!((slider.update(33.0) - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_release_without_movement_commits_start_value() {
        for initial in [0.5, 1.0, 1.3, 2.7, 3.0] {
            let mut slider = contrast();
            slider.set_value(initial);
            let start = slider.value();

            slider.begin(200.0);
            assert_eq!(slider.end(), Some(start));

            slider.begin(173.0);
            assert_eq!(slider.update(0.0), start);
            assert_eq!(slider.end(), Some(start));

            // moved away and back again
            slider.begin(200.0);
            slider.update(40.0);
            slider.update(0.0);
            assert_eq!(slider.end(), Some(start));
        }
    }

    #[test]
    fn test_zero_length_track_keeps_value() {
        let mut slider = contrast();
        slider.begin(0.0);
        assert_eq!(slider.update(50.0), 1.0);
        assert_eq!(slider.end(), Some(1.0));
    }

    #[test]
    fn test_cancel_produces_no_commit() {
        let mut slider = contrast();
        slider.begin(200.0);
        slider.update(120.0);
        assert!(slider.value() > 1.0);
        assert!(slider.cancel());
        assert_eq!(slider.value(), 1.0);
        assert_eq!(slider.end(), None);
        assert!(!slider.cancel());
    }

    #[test]
    fn test_updates_outside_gesture_are_ignored() {
        let mut slider = contrast();
        assert_eq!(slider.update(80.0), 1.0);
        assert_eq!(slider.end(), None);
    }

    #[test]
    fn test_set_value_snaps_and_respects_drag() {
        let mut slider = contrast();
        assert!(slider.set_value(2.04));
        assert!((slider.value() - 2.0).abs() < 1e-9);
        assert!(slider.set_value(99.0));
        assert!((slider.value() - 3.0).abs() < 1e-9);

        slider.begin(200.0);
        assert!(!slider.set_value(0.5));
        assert!(slider.is_dragging());
        assert!((slider.value() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_initial_value_is_snapped() {
        let slider = SliderState::new(ValueRange::new(0.0, 1.0, Some(0.25)).unwrap(), 0.6).unwrap();
        assert_eq!(slider.value(), 0.5);
        let slider = SliderState::new(ValueRange::new(0.0, 1.0, None).unwrap(), 4.0).unwrap();
        assert_eq!(slider.value(), 1.0);
    }

    #[test]
    fn test_formatting() {
        let cases = vec![
            (Some(1.0), 0, "3"),
            (Some(0.1), 1, "3.0"),
            (Some(0.05), 2, "3.00"),
            (None, 2, "3.00"),
        ];
        for (step, precision, text) in cases {
            let range = ValueRange::new(0.0, 5.0, step).unwrap();
            assert_eq!(range.precision(), precision);
            assert_eq!(range.format(3.0), text);
        }
    }
}
