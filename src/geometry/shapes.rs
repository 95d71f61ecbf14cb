use cgmath::{InnerSpace, Vector3};

use super::{bezier::QBezierPath, point, Point, TAU};
use crate::core::{
    color::Color,
    shape::{distance, Group, Mobject, Style, VMobject},
};

pub const DEFAULT_ARROW_TIP_LENGTH: f32 = 0.35;
const MAX_TIP_LENGTH_TO_LENGTH_RATIO: f32 = 0.25;
const MAX_STROKE_WIDTH_TO_LENGTH_RATIO: f32 = 5.;

pub struct Dot;

impl Dot {
    pub fn new(center: Point, radius: f32, color: Color) -> Mobject {
        VMobject::new(
            "Dot",
            vec![QBezierPath::circle(center, radius)],
            Style::filled(color, 1.),
        )
        .into()
    }
}

pub struct Line;

impl Line {
    pub fn new(start: Point, end: Point, stroke_width: f32, color: Color) -> Mobject {
        VMobject::new(
            "Line",
            vec![QBezierPath::line(start, end)],
            Style::stroked(color, stroke_width),
        )
        .into()
    }
}

pub struct Rectangle;

impl Rectangle {
    pub fn new(width: f32, height: f32, color: Color, fill_opacity: f32) -> Mobject {
        let (w, h) = (width / 2., height / 2.);
        let path = QBezierPath::polyline(&[
            point(w, h),
            point(-w, h),
            point(-w, -h),
            point(w, -h),
            point(w, h),
        ]);
        let style = Style {
            fill_opacity,
            ..Style::stroked(color, 4.)
        };
        VMobject::new("Rectangle", vec![path], style).into()
    }
}

/// Filled triangle whose apex sits on `tip`, pointing along `dir`.
fn arrow_tip(tip: Point, dir: Point, length: f32, color: Color) -> Mobject {
    let dir = dir.normalize();
    let normal = Vector3::new(-dir.y, dir.x, 0.);
    let base = tip - dir * length;
    let path = QBezierPath::polyline(&[
        tip,
        base + normal * (length / 2.),
        base - normal * (length / 2.),
        tip,
    ]);
    VMobject::new("ArrowTip", vec![path], Style::filled(color, 1.)).into()
}

pub struct Arrow;

impl Arrow {
    /// Straight arrow from `start` to `end`, both ends pulled in by `buff`.
    /// The shaft is the root mobject, the tip its only child.
    pub fn new(start: Point, end: Point, color: Color, buff: f32) -> Mobject {
        let dir = (end - start).normalize();
        let (start, end) = (start + dir * buff, end - dir * buff);
        let length = distance(start, end);
        let tip_length =
            DEFAULT_ARROW_TIP_LENGTH.min(MAX_TIP_LENGTH_TO_LENGTH_RATIO * length);
        let stroke_width = 6f32.min(MAX_STROKE_WIDTH_TO_LENGTH_RATIO * length);

        let shaft = VMobject::new(
            "Arrow",
            vec![QBezierPath::line(start, end - dir * tip_length)],
            Style::stroked(color, stroke_width),
        );
        let arrow: Mobject = shaft.into();
        arrow.add(arrow_tip(end, dir, tip_length, color));
        arrow
    }
}

pub struct CurvedArrow;

impl CurvedArrow {
    /// Arc from `start` to `end` sweeping `angle` radians, with a tip at `end`.
    pub fn new(start: Point, end: Point, angle: f32, color: Color) -> Mobject {
        let chord = end - start;
        let radius = chord.magnitude() / (2. * (angle / 2.).sin()).abs();
        // center sits on the chord's perpendicular bisector, on the side the arc turns around
        let half = chord.magnitude() / 2.;
        let offset = (radius * radius - half * half).max(0.).sqrt();
        let normal = Vector3::new(-chord.y, chord.x, 0.).normalize();
        let center = start + chord / 2. + normal * offset * angle.signum();
        let start_angle = (start.y - center.y).atan2(start.x - center.x);

        let arc = QBezierPath::arc(center, radius, start_angle, angle);
        let arc_length = radius * angle.abs();
        let tip_length =
            DEFAULT_ARROW_TIP_LENGTH.min(MAX_TIP_LENGTH_TO_LENGTH_RATIO * arc_length);
        // shorten the arc so the shaft ends at the tip base
        let trimmed = arc.partial(0., 1. - tip_length / arc_length);
        let end_angle = start_angle + angle;
        let tangent = Vector3::new(-end_angle.sin(), end_angle.cos(), 0.) * angle.signum();

        let shaft = VMobject::new("CurvedArrow", vec![trimmed], Style::stroked(color, 4.));
        let arrow: Mobject = shaft.into();
        arrow.add(arrow_tip(end, tangent, tip_length, color));
        arrow
    }
}

/// The radial rays drawn by a flash around `center`.
pub fn flash_rays(
    center: Point,
    color: Color,
    flash_radius: f32,
    line_length: f32,
    num_lines: usize,
) -> Mobject {
    Group::new((0..num_lines).map(|i| {
        let angle = TAU * i as f32 / num_lines as f32;
        let dir = Vector3::new(angle.cos(), angle.sin(), 0.);
        Line::new(
            center + dir * flash_radius,
            center + dir * (flash_radius + line_length),
            3.,
            color,
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::{BLUE, ORANGE, RED};

    fn close(a: Point, b: Point) -> bool {
        (a - b).magnitude() < 1e-3
    }

    #[test]
    fn dot_is_filled_circle() {
        let d = Dot::new(point(2., 0.), 0.15, BLUE);
        let b = d.bounds().unwrap();
        assert!(close(b.center(), point(2., 0.)));
        let style = d.borrow().style().clone();
        assert_eq!(style.fill_opacity, 1.);
        assert_eq!(style.stroke_width, 0.);
    }

    #[test]
    fn arrow_respects_buff_and_tip() {
        let a = Arrow::new(point(-5., 0.), point(0.5, 0.), RED, 0.2);
        let leaves = a.leaves();
        assert_eq!(leaves.len(), 2);
        let shaft = leaves[0].borrow().subpaths()[0].clone();
        assert!(close(shaft.first_point().unwrap(), point(-4.8, 0.)));
        assert!(close(shaft.last_point().unwrap(), point(0.3 - 0.35, 0.)));
        let b = a.bounds().unwrap();
        assert!((b.max.x - 0.3).abs() < 1e-4);
        assert_eq!(leaves[0].borrow().style().stroke_width, 6.);
    }

    #[test]
    fn short_arrow_scales_tip() {
        let a = Arrow::new(point(0., 0.), point(1., 0.), RED, 0.);
        let shaft = a.borrow().subpaths()[0].clone();
        assert!(close(shaft.last_point().unwrap(), point(0.75, 0.)));
    }

    #[test]
    fn curved_arrow_bends_clockwise() {
        let a = CurvedArrow::new(point(0.5, 0.), point(2., 0.), -TAU / 4., ORANGE);
        let shaft = a.borrow().subpaths()[0].clone();
        assert!(close(shaft.first_point().unwrap(), point(0.5, 0.)));
        // a negative angle swings the arc above the chord going left to right
        let b = shaft.bounds().unwrap();
        assert!(b.max.y > 0.2);
        let tip = a.borrow().children()[0].bounds().unwrap();
        assert!((tip.max.x - 2.).abs() < 0.01);
    }

    #[test]
    fn flash_has_twelve_rays() {
        let rays = flash_rays(point(0., 0.), RED, 0.5, 0.2, 12);
        assert_eq!(rays.leaves().len(), 12);
        let b = rays.bounds().unwrap();
        assert!((b.max.x - 0.7).abs() < 1e-4);
    }
}
