use std::ops::Deref;

use super::{bezier::QBezierPath, point, Point, ORIGIN};
use crate::core::{
    color::{Color, WHITE},
    shape::{Mobject, Style, VMobject},
};

const AXIS_STROKE_WIDTH: f32 = 2.;
const PLOT_STROKE_WIDTH: f32 = 4.;
const TICK_SIZE: f32 = 0.1;

/// A `[min, max, step]` range along one axis.
pub type Range = [f32; 3];

fn steps(range: Range) -> usize {
    let [min, max, step] = range;
    ((max - min) / step).round().max(0.) as usize
}

/// A pair of number lines meeting at `(x_min, y_min)`, centered on screen.
pub struct Axes {
    x_range: Range,
    y_range: Range,
    x_unit: f32,
    y_unit: f32,
    x_axis: Mobject,
    mobject: Mobject,
}

impl Axes {
    pub fn new(x_range: Range, y_range: Range, x_length: f32, y_length: f32) -> Self {
        let stroke = Style::stroked(WHITE, AXIS_STROKE_WIDTH);
        let x_unit = x_length / (x_range[1] - x_range[0]);
        let y_unit = y_length / (y_range[1] - y_range[0]);

        let x_axis: Mobject = VMobject::new(
            "NumberLine",
            vec![QBezierPath::line(ORIGIN, point(x_length, 0.))],
            stroke.clone(),
        )
        .into();
        for i in 1..=steps(x_range) {
            let x = i as f32 * x_range[2] * x_unit;
            x_axis.add(tick(point(x, -TICK_SIZE), point(x, TICK_SIZE), &stroke));
        }

        let y_axis: Mobject = VMobject::new(
            "NumberLine",
            vec![QBezierPath::line(ORIGIN, point(0., y_length))],
            stroke.clone(),
        )
        .into();
        for i in 1..=steps(y_range) {
            let y = i as f32 * y_range[2] * y_unit;
            y_axis.add(tick(point(-TICK_SIZE, y), point(TICK_SIZE, y), &stroke));
        }

        let mut group = VMobject::group(vec![x_axis.clone(), y_axis]);
        group.name = "Axes";
        let mobject: Mobject = group.into();
        mobject.move_to(ORIGIN);

        Self {
            x_range,
            y_range,
            x_unit,
            y_unit,
            x_axis,
            mobject,
        }
    }

    pub fn mobject(&self) -> &Mobject {
        &self.mobject
    }

    /// Scene position of the coordinates `(x, y)`, following any later moves.
    pub fn coords_to_point(&self, x: f32, y: f32) -> Point {
        let origin = self
            .x_axis
            .borrow()
            .subpaths()
            .first()
            .and_then(QBezierPath::first_point)
            .unwrap_or(ORIGIN);
        origin
            + point(
                (x - self.x_range[0]) * self.x_unit,
                (y - self.y_range[0]) * self.y_unit,
            )
    }

    /// The graph of `f` sampled at every step of the x range, joined by
    /// straight segments.
    pub fn plot(&self, f: impl Fn(f32) -> f32, color: Color) -> Mobject {
        let [min, _, step] = self.x_range;
        let points: Vec<Point> = (0..=steps(self.x_range))
            .map(|i| {
                let x = min + i as f32 * step;
                self.coords_to_point(x, f(x))
            })
            .collect();
        VMobject::new(
            "ParametricFunction",
            vec![QBezierPath::polyline(&points)],
            Style::stroked(color, PLOT_STROKE_WIDTH),
        )
        .into()
    }
}

impl Deref for Axes {
    type Target = Mobject;

    fn deref(&self) -> &Self::Target {
        &self.mobject
    }
}

fn tick(from: Point, to: Point, style: &Style) -> Mobject {
    VMobject::new("Tick", vec![QBezierPath::line(from, to)], style.clone()).into()
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;
    use crate::core::color::YELLOW;
    use crate::geometry::{DR, FRAME_HEIGHT, FRAME_WIDTH, MED_LARGE_BUFF};

    fn entropy_axes() -> Axes {
        Axes::new([0., 5., 1.], [0., 10., 5.], 2., 1.5)
    }

    #[test]
    fn builds_lines_and_ticks() {
        let axes = entropy_axes();
        let ticks = axes
            .family()
            .into_iter()
            .filter(|m| m.borrow().name == "Tick")
            .count();
        assert_eq!(ticks, 5 + 2);
        assert!(axes.center().x.abs() < 1e-5);
        assert!((axes.width() - (2. + TICK_SIZE)).abs() < 1e-5);
    }

    #[test]
    fn coordinates_follow_the_axes() {
        let axes = entropy_axes();
        let origin = axes.coords_to_point(0., 0.);
        let corner = axes.coords_to_point(5., 10.);
        assert!((corner.x - origin.x - 2.).abs() < 1e-5);
        assert!((corner.y - origin.y - 1.5).abs() < 1e-5);

        axes.to_corner(DR, MED_LARGE_BUFF);
        let b = axes.bounds().unwrap();
        assert!((b.max.x - (FRAME_WIDTH / 2. - 0.5)).abs() < 1e-4);
        assert!((b.min.y - (0.5 - FRAME_HEIGHT / 2.)).abs() < 1e-4);
        let moved = axes.coords_to_point(0., 0.);
        assert!((moved.y - b.min.y - TICK_SIZE).abs() < 1e-4);
    }

    #[test]
    fn plot_samples_each_step() {
        let axes = entropy_axes();
        let curve = axes.plot(|x| if x < 2.5 { 0.5 } else { 8. }, YELLOW);
        let path = curve.borrow().subpaths()[0].clone();
        assert_eq!(path.num_curves(), 5);
        let start = path.first_point().unwrap();
        assert!((start - axes.coords_to_point(0., 0.5)).magnitude() < 1e-5);
        let end = path.last_point().unwrap();
        assert!((end - axes.coords_to_point(5., 8.)).magnitude() < 1e-5);
        assert_eq!(curve.borrow().style().stroke_width, 4.);
        assert_eq!(curve.borrow().style().stroke_color, YELLOW);
    }
}
