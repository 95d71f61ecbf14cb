use cgmath::Vector3;

pub mod axes;
pub mod bezier;
pub mod shapes;
pub mod text;

pub type Point = Vector3<f32>;

pub const FRAME_HEIGHT: f32 = 8.0;
pub const FRAME_WIDTH: f32 = FRAME_HEIGHT * 16.0 / 9.0;

pub const MED_SMALL_BUFF: f32 = 0.25;
pub const MED_LARGE_BUFF: f32 = 0.5;

/// One unit of manim stroke width, in scene units.
pub const STROKE_WIDTH_UNIT: f32 = 0.01;

pub const ORIGIN: Point = Vector3 { x: 0., y: 0., z: 0. };
pub const UP: Point = Vector3 { x: 0., y: 1., z: 0. };
pub const DOWN: Point = Vector3 { x: 0., y: -1., z: 0. };
pub const RIGHT: Point = Vector3 { x: 1., y: 0., z: 0. };
pub const DR: Point = Vector3 { x: 1., y: -1., z: 0. };

pub const TAU: f32 = std::f32::consts::TAU;

pub fn point(x: f32, y: f32) -> Point {
    Vector3::new(x, y, 0.)
}

/// Axis-aligned bounding box in scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let start = Self {
            min: first,
            max: first,
        };
        Some(points.fold(start, |b, p| b.include(*p)))
    }

    pub fn include(self, p: Point) -> Self {
        Self {
            min: Vector3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Vector3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn union(self, other: Self) -> Self {
        self.include(other.min).include(other.max)
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    #[cfg(test)]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[cfg(test)]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// The point of the box in direction `dir`: each component picks the min edge,
    /// the center, or the max edge depending on its sign.
    pub fn critical_point(&self, dir: Point) -> Point {
        let center = self.center();
        let pick = |d: f32, min: f32, c: f32, max: f32| match d {
            d if d > 0. => max,
            d if d < 0. => min,
            _ => c,
        };
        Vector3::new(
            pick(dir.x, self.min.x, center.x, self.max.x),
            pick(dir.y, self.min.y, center.y, self.max.y),
            pick(dir.z, self.min.z, center.z, self.max.z),
        )
    }
}
