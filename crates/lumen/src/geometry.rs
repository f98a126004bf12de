#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point `distance` away from `self` in direction `angle` (radians, y down).
    pub fn polar_offset(self, angle: f64, distance: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x + cos * distance, self.y + sin * distance)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}
