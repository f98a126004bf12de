use crate::anim::{Breathing, Choreography, Motion, Spring, SpringError, Track, TrackId};
use crate::config::{MenuConfig, SatelliteConfig, SatelliteId};
use crate::geometry::Point;
use crate::gui::menu::{
    CENTER_ENTRANCE_MS, CENTER_RADIUS, MAX_SCALE, MIN_SCALE, REFERENCE_SIZE, SATELLITE_RADIUS,
};
use lumen_platform::icon::IconName;
use std::f64::consts::TAU;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutput {
    CenterPressed,
    SatellitePressed(SatelliteId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Center,
    Satellite(usize),
}

#[derive(Debug, Clone)]
pub struct Satellite {
    pub id: SatelliteId,
    pub label: String,
    pub icon: IconName,
    track: TrackId,
}

impl Satellite {
    fn from_config(cfg: &SatelliteConfig, track: TrackId) -> Self {
        Self {
            id: cfg.id.clone(),
            label: cfg.label.clone(),
            icon: cfg.icon.clone(),
            track,
        }
    }
}

/// Where and how visible one element is on the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteGeometry {
    pub center: Point,
    pub radius: f64,
    pub opacity: f64,
    pub progress: f64,
}

pub struct State {
    pub center: Point,
    pub scale_factor: f64,
    pub satellites: Vec<Satellite>,
    pub hover: Option<Hit>,
    start_angle: f64,
    orbital_distance: f64,
    choreography: Choreography,
    center_track: TrackId,
    breathing: Breathing,
    settled_at: Option<Duration>,
    now: Duration,
}

impl State {
    pub fn new(
        menu: &MenuConfig,
        satellites: &[SatelliteConfig],
        reduced_motion: bool,
    ) -> Result<Self, SpringError> {
        let spring = menu.spring.spring()?;
        Ok(Self::with_spring(menu, spring, satellites, reduced_motion))
    }

    pub fn with_spring(
        menu: &MenuConfig,
        spring: Spring,
        satellites: &[SatelliteConfig],
        reduced_motion: bool,
    ) -> Self {
        let mut choreography = Choreography::new(reduced_motion);

        let center_track = choreography.add(Track::new(
            Duration::ZERO,
            Motion::timed(CENTER_ENTRANCE_MS, menu.center_easing),
        ));
        let tracks = choreography.add_staggered(
            satellites.len(),
            menu.base_delay(),
            menu.stagger(),
            Motion::Spring(spring),
        );

        Self {
            center: Point::default(),
            scale_factor: 1.0,
            satellites: satellites
                .iter()
                .zip(tracks)
                .map(|(cfg, track)| Satellite::from_config(cfg, track))
                .collect(),
            hover: None,
            start_angle: menu.start_angle_radians(),
            orbital_distance: menu.orbital_distance,
            choreography,
            center_track,
            breathing: menu.breathing(),
            settled_at: None,
            now: Duration::ZERO,
        }
    }

    /// Recentres the menu in a `width` x `height` area and rescales it to fit.
    pub fn set_bounds(&mut self, width: f64, height: f64) {
        self.center = Point::new(width / 2.0, height / 2.0);
        self.scale_factor = (width.min(height) / REFERENCE_SIZE).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn reduced_motion(&self) -> bool {
        self.choreography.reduced_motion()
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.choreography.set_reduced_motion(reduced);
    }

    /// Plays the entrance from the beginning. Under reduced motion everything is in its
    /// final place as soon as this returns.
    pub fn start_entrance(&mut self) {
        self.settled_at = None;
        self.choreography.start();
    }

    pub fn is_settled(&self) -> bool {
        self.choreography.is_settled()
    }

    fn breathes(&self) -> bool {
        !self.reduced_motion()
            && self.breathing.amplitude != 0.0
            && !self.breathing.period.is_zero()
    }

    /// Advances to frame time `now`. Returns whether another frame is wanted.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.now = now;
        if self.choreography.tick(now) {
            return true;
        }
        if self.choreography.is_settled() && self.settled_at.is_none() {
            self.settled_at = Some(now);
        }
        self.breathes() && self.is_settled()
    }

    pub fn angle(&self, index: usize) -> f64 {
        self.start_angle + TAU * index as f64 / self.satellites.len() as f64
    }

    pub fn angles(&self) -> Vec<f64> {
        (0..self.satellites.len()).map(|i| self.angle(i)).collect()
    }

    pub fn center_progress(&self) -> f64 {
        self.choreography.progress(self.center_track).clamped()
    }

    pub fn center_opacity(&self) -> f64 {
        self.center_progress()
    }

    pub fn center_scale(&self) -> f64 {
        let breath = match self.settled_at {
            Some(since) if self.breathes() => {
                self.breathing.scale_at(self.now.saturating_sub(since))
            }
            _ => 1.0,
        };
        self.center_progress() * breath
    }

    pub fn center_radius(&self) -> f64 {
        CENTER_RADIUS * self.scale_factor
    }

    pub fn satellite_radius(&self) -> f64 {
        SATELLITE_RADIUS * self.scale_factor
    }

    pub fn geometry(&self, index: usize) -> SatelliteGeometry {
        let track = self.choreography.progress(self.satellites[index].track);
        let distance = track.lerp(0.0, self.orbital_distance * self.scale_factor);
        SatelliteGeometry {
            center: self.center.polar_offset(self.angle(index), distance),
            radius: self.satellite_radius() * (0.5 + 0.5 * track.clamped()),
            opacity: track.clamped(),
            progress: track.value(),
        }
    }

    pub fn geometries(&self) -> Vec<SatelliteGeometry> {
        (0..self.satellites.len()).map(|i| self.geometry(i)).collect()
    }

    /// The element under `point`. The centre wins over satellites still tucked beneath it;
    /// satellites answer at their current animated position, so they can be pressed
    /// before their entrance completes.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        if point.distance_to(self.center) <= self.center_radius() {
            return Some(Hit::Center);
        }

        let reach = self.satellite_radius();
        self.geometries()
            .iter()
            .enumerate()
            .map(|(i, g)| (i, g.center.distance_to(point)))
            .filter(|&(_, d)| d <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| Hit::Satellite(i))
    }

    /// Tracks the pointer for hover highlighting. Returns whether a redraw is needed.
    pub fn update_cursor(&mut self, point: Point) -> bool {
        let hit = self.hit_test(point);
        let changed = hit != self.hover;
        self.hover = hit;
        changed
    }

    pub fn clear_hover(&mut self) -> bool {
        self.hover.take().is_some()
    }

    pub fn press(&self, point: Point) -> Option<MenuOutput> {
        match self.hit_test(point)? {
            Hit::Center => Some(MenuOutput::CenterPressed),
            Hit::Satellite(i) => Some(MenuOutput::SatellitePressed(self.satellites[i].id.clone())),
        }
    }
}
