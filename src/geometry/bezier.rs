use cgmath::{InnerSpace, Vector2, VectorSpace};

use super::{Bounds, Point};

/// A continuous chain of quadratic Bézier curves, stored as interleaved
/// anchors and handles: `[a0, h0, a1, h1, a2, ...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QBezierPath {
    pub points: Vec<Point>,
}

impl QBezierPath {
    const MAX_FLATTEN_SEGMENTS: usize = 64;

    pub fn new(points: Vec<Point>) -> Self {
        debug_assert!(points.is_empty() || points.len() % 2 == 1);
        Self { points }
    }

    pub fn line(a: Point, b: Point) -> Self {
        Self::new(vec![a, a.lerp(b, 0.5), b])
    }

    pub fn polyline(anchors: &[Point]) -> Self {
        let Some(first) = anchors.first() else {
            return Self::default();
        };
        let mut points = vec![*first];
        for w in anchors.windows(2) {
            points.push(w[0].lerp(w[1], 0.5));
            points.push(w[1]);
        }
        Self::new(points)
    }

    /// A path of one curve collapsed onto `p`.
    pub fn degenerate(p: Point) -> Self {
        Self::new(vec![p; 3])
    }

    /// Arc around `center` starting at `start_angle`, sweeping `angle` radians.
    pub fn arc(center: Point, radius: f32, start_angle: f32, angle: f32) -> Self {
        let turns = angle.abs() / std::f32::consts::TAU;
        let n_components = ((turns * 8. - 1e-3).ceil() as usize).max(1);
        let n_points = 2 * n_components + 1;
        let theta = angle / n_components as f32;
        let handle_adjust = 1.0 / (theta / 2.0).cos();

        let points = (0..n_points)
            .map(|i| {
                let a = start_angle + i as f32 * angle / (n_points - 1) as f32;
                let r = if i % 2 == 1 { radius * handle_adjust } else { radius };
                center + Point::new(a.cos(), a.sin(), 0.) * r
            })
            .collect();
        Self::new(points)
    }

    pub fn circle(center: Point, radius: f32) -> Self {
        let mut path = Self::arc(center, radius, 0., std::f32::consts::TAU);
        // close exactly, the arc end is only approximately the start
        let first = path.points[0];
        if let Some(last) = path.points.last_mut() {
            *last = first;
        }
        path
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn num_curves(&self) -> usize {
        self.points.len().saturating_sub(1) / 2
    }

    pub fn curve(&self, i: usize) -> [Point; 3] {
        [self.points[2 * i], self.points[2 * i + 1], self.points[2 * i + 2]]
    }

    pub fn first_point(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn is_closed(&self) -> bool {
        match (self.first_point(), self.last_point()) {
            (Some(a), Some(b)) => self.num_curves() > 1 && (a - b).magnitude2() < 1e-10,
            _ => false,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    pub fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        self.points.iter_mut().for_each(|p| *p = f(*p));
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        debug_assert_eq!(self.points.len(), other.points.len());
        Self::new(
            self.points
                .iter()
                .zip(other.points.iter())
                .map(|(a, b)| a.lerp(*b, t))
                .collect(),
        )
    }

    /// The sub-path between proportions `a` and `b` of the curve count.
    pub fn partial(&self, a: f32, b: f32) -> Self {
        let n = self.num_curves();
        let (a, b) = (a.clamp(0., 1.), b.clamp(0., 1.));
        if n == 0 || a >= b {
            return Self::default();
        }

        let locate = |x: f32| {
            let scaled = x * n as f32;
            let i = (scaled.floor() as usize).min(n - 1);
            (i, scaled - i as f32)
        };
        let (i, ta) = locate(a);
        let (j, tb) = locate(b);

        let mut points = Vec::with_capacity(2 * (j - i + 1) + 1);
        let push = |c: [Point; 3], points: &mut Vec<Point>| {
            if points.is_empty() {
                points.push(c[0]);
            }
            points.push(c[1]);
            points.push(c[2]);
        };
        if i == j {
            push(sub_curve(self.curve(i), ta, tb), &mut points);
        } else {
            push(sub_curve(self.curve(i), ta, 1.), &mut points);
            for k in i + 1..j {
                push(self.curve(k), &mut points);
            }
            push(sub_curve(self.curve(j), 0., tb), &mut points);
        }
        Self::new(points)
    }

    /// Subdivides curves evenly until the path has exactly `target` curves.
    pub fn insert_curves(&self, target: usize) -> Self {
        let n = self.num_curves();
        if n == 0 || target <= n {
            return self.clone();
        }

        let mut splits = vec![0usize; n];
        for k in 0..target {
            splits[k * n / target] += 1;
        }

        let mut points = vec![self.points[0]];
        for (i, &pieces) in splits.iter().enumerate() {
            let curve = self.curve(i);
            for p in 0..pieces {
                let t0 = p as f32 / pieces as f32;
                let t1 = (p + 1) as f32 / pieces as f32;
                let c = sub_curve(curve, t0, t1);
                points.push(c[1]);
                points.push(c[2]);
            }
        }
        Self::new(points)
    }

    /// Polyline approximation, within `tolerance` of the curves.
    pub fn flatten(&self, tolerance: f32) -> Vec<Vector2<f32>> {
        let Some(first) = self.first_point() else {
            return Vec::new();
        };
        let mut out = vec![first.truncate()];
        for i in 0..self.num_curves() {
            let c = self.curve(i);
            let dd = (c[0] - c[1] * 2. + c[2]).magnitude();
            let segments = ((dd / (8. * tolerance)).sqrt().ceil() as usize)
                .clamp(1, Self::MAX_FLATTEN_SEGMENTS);
            for s in 1..=segments {
                out.push(point_on_curve(c, s as f32 / segments as f32).truncate());
            }
        }
        out
    }
}

pub fn point_on_curve(c: [Point; 3], t: f32) -> Point {
    let a = c[0].lerp(c[1], t);
    let b = c[1].lerp(c[2], t);
    a.lerp(b, t)
}

/// De Casteljau split of a quadratic curve at `t`.
pub fn split(c: [Point; 3], t: f32) -> ([Point; 3], [Point; 3]) {
    let a = c[0].lerp(c[1], t);
    let b = c[1].lerp(c[2], t);
    let m = a.lerp(b, t);
    ([c[0], a, m], [m, b, c[2]])
}

/// The part of a quadratic curve between parameters `t0 <= t1`.
pub fn sub_curve(c: [Point; 3], t0: f32, t1: f32) -> [Point; 3] {
    if t1 <= 0. {
        return [c[0]; 3];
    }
    let left = if t1 >= 1. { c } else { split(c, t1).0 };
    if t0 <= 0. {
        return left;
    }
    split(left, (t0 / t1).min(1.)).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    fn close(a: Point, b: Point) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn line_has_one_curve() {
        let l = QBezierPath::line(point(0., 0.), point(2., 0.));
        assert_eq!(l.num_curves(), 1);
        assert_eq!(l.points[1], point(1., 0.));
        assert!(!l.is_closed());
    }

    #[test]
    fn circle_is_closed_and_round() {
        let c = QBezierPath::circle(point(2., 0.), 0.15);
        assert_eq!(c.num_curves(), 8);
        assert!(c.is_closed());
        for i in 0..c.num_curves() {
            let mid = point_on_curve(c.curve(i), 0.5);
            let r = (mid - point(2., 0.)).magnitude();
            assert!((r - 0.15).abs() < 0.002, "radius {r}");
        }
    }

    #[test]
    fn quarter_arc_endpoints() {
        let a = QBezierPath::arc(point(0., 0.), 1., 0., std::f32::consts::FRAC_PI_2);
        assert_eq!(a.num_curves(), 2);
        assert!(close(a.first_point().unwrap(), point(1., 0.)));
        assert!(close(a.last_point().unwrap(), point(0., 1.)));
    }

    #[test]
    fn partial_of_polyline() {
        let p = QBezierPath::polyline(&[
            point(0., 0.),
            point(1., 0.),
            point(2., 0.),
            point(3., 0.),
        ]);
        let half = p.partial(0., 0.5);
        assert_eq!(half.num_curves(), 2);
        assert!(close(half.last_point().unwrap(), point(1.5, 0.)));

        let middle = p.partial(1. / 3., 2. / 3.);
        assert!(close(middle.first_point().unwrap(), point(1., 0.)));
        assert!(close(middle.last_point().unwrap(), point(2., 0.)));

        assert!(p.partial(0.6, 0.6).is_empty());
        assert_eq!(p.partial(0., 1.), p);
    }

    #[test]
    fn insert_curves_keeps_shape() {
        let c = QBezierPath::circle(point(0., 0.), 1.);
        let more = c.insert_curves(13);
        assert_eq!(more.num_curves(), 13);
        assert_eq!(more.points.len(), 27);
        assert!(close(more.first_point().unwrap(), c.first_point().unwrap()));
        assert!(close(more.last_point().unwrap(), c.last_point().unwrap()));
        assert!(close(point_on_curve(more.curve(0), 0.), c.points[0]));
    }

    #[test]
    fn flatten_straight_line_is_one_segment() {
        let l = QBezierPath::line(point(0., 0.), point(5., 0.));
        assert_eq!(l.flatten(0.001).len(), 2);

        let c = QBezierPath::circle(point(0., 0.), 1.);
        assert!(c.flatten(0.001).len() > 17);
    }

    #[test]
    fn sub_curve_bounds() {
        let c = [point(0., 0.), point(1., 2.), point(2., 0.)];
        let s = sub_curve(c, 0.25, 0.75);
        assert!(close(s[0], point_on_curve(c, 0.25)));
        assert!(close(s[2], point_on_curve(c, 0.75)));
    }
}
