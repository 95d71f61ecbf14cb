use std::{cell::RefCell, fmt, ops::Deref, rc::Rc};

use cgmath::InnerSpace;

use super::{
    color::{Color, WHITE},
    tessellate::{self, Mesh},
    utils::latch::Latch,
};
use crate::geometry::{
    bezier::QBezierPath, Bounds, Point, FRAME_HEIGHT, FRAME_WIDTH, ORIGIN, STROKE_WIDTH_UNIT,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub stroke_color: Color,
    pub stroke_opacity: f32,
    /// In manim stroke units, see [`STROKE_WIDTH_UNIT`].
    pub stroke_width: f32,
    pub fill_color: Color,
    pub fill_opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: WHITE,
            stroke_opacity: 1.,
            stroke_width: 4.,
            fill_color: WHITE,
            fill_opacity: 0.,
        }
    }
}

impl Style {
    pub fn filled(color: Color, fill_opacity: f32) -> Self {
        Self {
            stroke_color: color,
            stroke_width: 0.,
            fill_color: color,
            fill_opacity,
            ..Default::default()
        }
    }

    pub fn stroked(color: Color, stroke_width: f32) -> Self {
        Self {
            stroke_color: color,
            stroke_width,
            fill_color: color,
            ..Default::default()
        }
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let mix = |a: f32, b: f32| a * (1. - t) + b * t;
        Self {
            stroke_color: self.stroke_color.lerp(other.stroke_color, t),
            stroke_opacity: mix(self.stroke_opacity, other.stroke_opacity),
            stroke_width: mix(self.stroke_width, other.stroke_width),
            fill_color: self.fill_color.lerp(other.fill_color, t),
            fill_opacity: mix(self.fill_opacity, other.fill_opacity),
        }
    }

    pub fn with_opacity_factor(&self, factor: f32) -> Self {
        Self {
            stroke_opacity: self.stroke_opacity * factor,
            fill_opacity: self.fill_opacity * factor,
            ..self.clone()
        }
    }

    pub fn stroke_width_units(&self) -> f32 {
        self.stroke_width * STROKE_WIDTH_UNIT
    }
}

/// A vectorized mobject: a set of quadratic Bézier subpaths with one style,
/// plus child mobjects.
pub struct VMobject {
    pub name: &'static str,
    subpaths: Latch<Vec<QBezierPath>>,
    style: Latch<Style>,
    children: Vec<Mobject>,
    mesh: Option<Mesh>,
}

impl VMobject {
    pub fn new(name: &'static str, subpaths: Vec<QBezierPath>, style: Style) -> Self {
        Self {
            name,
            subpaths: Latch::new_set(subpaths),
            style: Latch::new_set(style),
            children: Vec::new(),
            mesh: None,
        }
    }

    pub fn group(children: Vec<Mobject>) -> Self {
        Self {
            children,
            ..Self::new("Group", Vec::new(), Style::default())
        }
    }

    pub fn subpaths(&self) -> &[QBezierPath] {
        &self.subpaths
    }

    pub fn subpaths_mut(&mut self) -> &mut Vec<QBezierPath> {
        &mut self.subpaths
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn set_style(&mut self, style: Style) {
        *self.style = style;
    }

    pub fn children(&self) -> &[Mobject] {
        &self.children
    }

    pub fn add(&mut self, child: Mobject) {
        self.children.push(child);
    }

    pub fn has_points(&self) -> bool {
        self.subpaths.iter().any(|p| !p.is_empty())
    }

    pub fn num_curves(&self) -> usize {
        self.subpaths.iter().map(QBezierPath::num_curves).sum()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.subpaths.iter().flat_map(|p| p.points.iter()))
    }

    pub fn last_point(&self) -> Option<Point> {
        self.subpaths.iter().rev().find_map(QBezierPath::last_point)
    }

    pub fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        self.subpaths.iter_mut().for_each(|p| p.map_points(&f));
    }

    /// Copies points and style, without children.
    pub fn point_copy(&self) -> Self {
        Self::new(self.name, self.subpaths.to_vec(), self.style.deref().clone())
    }

    pub fn deep_copy(&self) -> Self {
        Self {
            children: self.children.iter().map(Mobject::deep_copy).collect(),
            ..self.point_copy()
        }
    }

    /// Sets points and style to the interpolation of two aligned mobjects.
    pub fn interpolate(&mut self, start: &VMobject, end: &VMobject, t: f32) {
        *self.subpaths = start
            .subpaths
            .iter()
            .zip(end.subpaths.iter())
            .map(|(a, b)| a.lerp(b, t))
            .collect();
        *self.style = start.style.lerp(&end.style, t);
    }

    /// Keeps the part of `src` between proportions `a` and `b` of its curves,
    /// counted over all subpaths in order.
    pub fn become_partial(&mut self, src: &VMobject, a: f32, b: f32) {
        let total = src.num_curves() as f32;
        let mut offset = 0.;
        let mut out = Vec::with_capacity(src.subpaths.len());
        for path in src.subpaths.iter() {
            let n = path.num_curves() as f32;
            if n > 0. {
                let local_a = ((a * total - offset) / n).clamp(0., 1.);
                let local_b = ((b * total - offset) / n).clamp(0., 1.);
                if local_b > local_a {
                    out.push(path.partial(local_a, local_b));
                }
            }
            offset += n;
        }
        *self.subpaths = out;
        *self.style = src.style.deref().clone();
    }

    /// Tessellation of this mobject's own points, cached until points or style change.
    pub fn mesh(&mut self) -> &Mesh {
        let dirty = self.subpaths.reset() | self.style.reset();
        if dirty {
            self.mesh = None;
        }
        let (subpaths, style) = (&self.subpaths, &self.style);
        self.mesh
            .get_or_insert_with(|| tessellate::tessellate(subpaths, style))
    }
}

/// Shared handle to a [`VMobject`]; identity is pointer identity.
#[derive(Clone)]
pub struct Mobject(Rc<RefCell<VMobject>>);

impl Deref for Mobject {
    type Target = Rc<RefCell<VMobject>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<VMobject> for Mobject {
    fn from(v: VMobject) -> Self {
        Self(Rc::new(RefCell::new(v)))
    }
}

impl fmt::Debug for Mobject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.borrow();
        f.debug_struct(inner.name)
            .field("subpaths", &inner.subpaths.len())
            .field("children", &inner.children)
            .finish()
    }
}

pub struct Group;

impl Group {
    pub fn new(children: impl IntoIterator<Item = Mobject>) -> Mobject {
        VMobject::group(children.into_iter().collect()).into()
    }
}

impl Mobject {
    pub fn ptr_eq(&self, other: &Mobject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn collect_family(&self, out: &mut Vec<Mobject>) {
        out.push(self.clone());
        for child in self.borrow().children.iter() {
            child.collect_family(out);
        }
    }

    /// This mobject and all its descendants, parents first.
    pub fn family(&self) -> Vec<Mobject> {
        let mut out = Vec::new();
        self.collect_family(&mut out);
        out
    }

    /// Family members that own points.
    pub fn leaves(&self) -> Vec<Mobject> {
        self.family()
            .into_iter()
            .filter(|m| m.borrow().has_points())
            .collect()
    }

    pub fn contains(&self, other: &Mobject) -> bool {
        self.family().iter().any(|m| m.ptr_eq(other))
    }

    pub fn deep_copy(&self) -> Mobject {
        self.borrow().deep_copy().into()
    }

    /// Replaces this mobject's content with a copy of `other`.
    pub fn become_copy(&self, other: &Mobject) {
        let copy = other.borrow().deep_copy();
        *self.borrow_mut() = copy;
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.family()
            .iter()
            .filter_map(|m| m.borrow().bounds())
            .reduce(Bounds::union)
    }

    pub fn center(&self) -> Point {
        self.bounds().map(|b| b.center()).unwrap_or(ORIGIN)
    }

    pub fn critical_point(&self, dir: Point) -> Point {
        self.bounds()
            .map(|b| b.critical_point(dir))
            .unwrap_or(ORIGIN)
    }

    #[cfg(test)]
    pub fn width(&self) -> f32 {
        self.bounds().map(|b| b.width()).unwrap_or(0.)
    }

    #[cfg(test)]
    pub fn height(&self) -> f32 {
        self.bounds().map(|b| b.height()).unwrap_or(0.)
    }

    pub fn apply_points(&self, f: impl Fn(Point) -> Point) -> &Self {
        for m in self.family() {
            m.borrow_mut().map_points(&f);
        }
        self
    }

    pub fn shift(&self, offset: Point) -> &Self {
        self.apply_points(|p| p + offset)
    }

    pub fn scale_about(&self, about: Point, factor: f32) -> &Self {
        self.apply_points(|p| about + (p - about) * factor)
    }

    pub fn move_to(&self, target: Point) -> &Self {
        let center = self.center();
        self.shift(target - center)
    }

    pub fn move_to_mobject(&self, other: &Mobject) -> &Self {
        self.move_to(other.center())
    }

    /// Places this mobject beside `other` in direction `dir`, `buff` apart,
    /// centered on the other axis.
    pub fn next_to(&self, other: &Mobject, dir: Point, buff: f32) -> &Self {
        let target = other.critical_point(dir);
        let align = self.critical_point(-dir);
        self.shift(target + dir * buff - align)
    }

    /// Moves against the frame edge (or corner, for diagonal directions) in `dir`.
    pub fn to_edge(&self, dir: Point, buff: f32) -> &Self {
        let target = Point::new(
            dir.x.signum() * FRAME_WIDTH / 2.,
            dir.y.signum() * FRAME_HEIGHT / 2.,
            0.,
        );
        let align = self.critical_point(dir);
        let raw = target - align - dir * buff;
        let mask = |d: f32| if d == 0. { 0. } else { 1. };
        self.shift(Point::new(raw.x * mask(dir.x), raw.y * mask(dir.y), 0.))
    }

    pub fn to_corner(&self, dir: Point, buff: f32) -> &Self {
        self.to_edge(dir, buff)
    }

    pub fn set_color(&self, color: Color) -> &Self {
        for m in self.family() {
            let mut m = m.borrow_mut();
            let style = m.style_mut();
            style.stroke_color = color;
            style.fill_color = color;
        }
        self
    }

    pub fn set_fill(&self, color: Color, opacity: f32) -> &Self {
        for m in self.family() {
            let mut m = m.borrow_mut();
            let style = m.style_mut();
            style.fill_color = color;
            style.fill_opacity = opacity;
        }
        self
    }

    pub fn set_stroke(&self, color: Color, width: f32) -> &Self {
        for m in self.family() {
            let mut m = m.borrow_mut();
            let style = m.style_mut();
            style.stroke_color = color;
            style.stroke_width = width;
        }
        self
    }

    /// Scales every opacity in the family by `factor`.
    pub fn set_opacity_factor(&self, factor: f32) -> &Self {
        for m in self.family() {
            let mut m = m.borrow_mut();
            let style = m.style().with_opacity_factor(factor);
            m.set_style(style);
        }
        self
    }

    pub fn add(&self, child: Mobject) -> &Self {
        self.borrow_mut().add(child);
        self
    }
}

/// Makes two subpath lists morphable into each other: equal subpath counts
/// (padding with degenerate paths) and equal curve counts per subpath.
pub fn align_paths(a: &mut VMobject, b: &mut VMobject) {
    let a_anchor = a.last_point().or_else(|| b.bounds().map(|bb| bb.center()));
    let b_anchor = b.last_point().or_else(|| a.bounds().map(|ab| ab.center()));
    let (Some(a_anchor), Some(b_anchor)) = (a_anchor, b_anchor) else {
        return;
    };

    let len = a.subpaths.len().max(b.subpaths.len());
    let pad = |paths: &mut Vec<QBezierPath>, anchor: Point| {
        for path in paths.iter_mut().filter(|p| p.is_empty()) {
            *path = QBezierPath::degenerate(anchor);
        }
        paths.resize_with(len, || QBezierPath::degenerate(anchor));
    };
    pad(&mut a.subpaths, a_anchor);
    pad(&mut b.subpaths, b_anchor);

    for (pa, pb) in a.subpaths.iter_mut().zip(b.subpaths.iter_mut()) {
        let n = pa.num_curves().max(pb.num_curves());
        *pa = pa.insert_curves(n);
        *pb = pb.insert_curves(n);
    }
}

/// A copy of `m` with every point collapsed onto `p`.
pub fn collapsed_at(m: &VMobject, p: Point) -> VMobject {
    let mut copy = m.point_copy();
    copy.map_points(|_| p);
    copy
}

pub fn distance(a: Point, b: Point) -> f32 {
    (a - b).magnitude()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::{BLUE, RED};
    use crate::geometry::{point, DOWN, DR, MED_LARGE_BUFF, RIGHT, UP};

    fn square(center: Point, side: f32) -> Mobject {
        let h = side / 2.;
        let path = QBezierPath::polyline(&[
            center + point(-h, -h),
            center + point(h, -h),
            center + point(h, h),
            center + point(-h, h),
            center + point(-h, -h),
        ]);
        VMobject::new("Square", vec![path], Style::filled(BLUE, 1.)).into()
    }

    #[test]
    fn family_order_is_parents_first() {
        let a = square(ORIGIN, 1.);
        let b = square(ORIGIN, 1.);
        let inner = Group::new([b.clone()]);
        let outer = Group::new([a.clone(), inner.clone()]);
        let family = outer.family();
        assert_eq!(family.len(), 4);
        assert!(family[0].ptr_eq(&outer));
        assert!(family[2].ptr_eq(&inner));
        assert_eq!(outer.leaves().len(), 2);
        assert!(outer.contains(&b));
        assert!(!a.contains(&b));
    }

    #[test]
    fn next_to_aligns_centers() {
        let anchor = square(point(2., 0.), 0.3);
        let label = square(ORIGIN, 1.);
        label.next_to(&anchor, UP, 2.5);
        let b = label.bounds().unwrap();
        assert!((b.min.y - (0.15 + 2.5)).abs() < 1e-5);
        assert!((label.center().x - 2.).abs() < 1e-5);

        label.next_to(&anchor, RIGHT, 0.25);
        assert!((label.bounds().unwrap().min.x - 2.4).abs() < 1e-5);
        assert!(label.center().y.abs() < 1e-5);
    }

    #[test]
    fn to_edge_and_corner() {
        let m = square(point(1., 1.), 1.);
        m.to_edge(UP, MED_LARGE_BUFF);
        let b = m.bounds().unwrap();
        assert!((b.max.y - 3.5).abs() < 1e-5);
        assert!((m.center().x - 1.).abs() < 1e-5);

        m.to_corner(DR, MED_LARGE_BUFF);
        let b = m.bounds().unwrap();
        assert!((b.max.x - (FRAME_WIDTH / 2. - 0.5)).abs() < 1e-4);
        assert!((b.min.y - (-3.5)).abs() < 1e-5);

        m.to_edge(DOWN, 0.);
        assert!((m.bounds().unwrap().min.y + 4.).abs() < 1e-5);
    }

    #[test]
    fn set_color_applies_to_family() {
        let a = square(ORIGIN, 1.);
        let g = Group::new([a.clone()]);
        g.set_color(RED);
        assert_eq!(a.borrow().style().fill_color, RED);
        assert_eq!(a.borrow().style().stroke_color, RED);
    }

    #[test]
    fn stroke_and_opacity_styling() {
        let a = square(ORIGIN, 1.);
        let g = Group::new([a.clone()]);
        g.set_stroke(RED, 4.).set_opacity_factor(0.5);
        let style = a.borrow().style().clone();
        assert_eq!(style.stroke_color, RED);
        assert_eq!(style.fill_color, BLUE);
        assert!((style.stroke_width_units() - 0.04).abs() < 1e-6);
        assert_eq!(style.fill_opacity, 0.5);
    }

    #[test]
    fn scale_about_a_point() {
        let m = square(point(1., 0.), 1.);
        m.scale_about(ORIGIN, 2.);
        assert!((m.center().x - 2.).abs() < 1e-5);
        assert!((m.width() - 2.).abs() < 1e-5);
        m.scale_about(m.center(), 0.5);
        assert!((m.height() - 1.).abs() < 1e-5);
    }

    #[test]
    fn become_copy_is_deep() {
        let a = square(ORIGIN, 1.);
        let b = Group::new([square(point(3., 0.), 1.)]);
        a.become_copy(&b);
        assert_eq!(a.borrow().children().len(), 1);
        assert!(!a.borrow().children()[0].ptr_eq(&b.borrow().children()[0]));
        assert!((a.center().x - 3.).abs() < 1e-5);
    }

    #[test]
    fn partial_spans_subpaths() {
        let mut m = VMobject::new(
            "Pair",
            vec![
                QBezierPath::line(point(0., 0.), point(1., 0.)),
                QBezierPath::line(point(0., 1.), point(1., 1.)),
            ],
            Style::default(),
        );
        let src = m.point_copy();
        m.become_partial(&src, 0., 0.75);
        assert_eq!(m.subpaths().len(), 2);
        assert!((m.subpaths()[1].last_point().unwrap().x - 0.5).abs() < 1e-5);

        m.become_partial(&src, 0., 0.5);
        assert_eq!(m.subpaths().len(), 1);

        m.become_partial(&src, 0., 0.);
        assert!(!m.has_points());
    }

    #[test]
    fn align_pads_subpaths_and_curves() {
        let mut a = VMobject::new(
            "A",
            vec![QBezierPath::line(point(0., 0.), point(1., 0.))],
            Style::default(),
        );
        let mut b = VMobject::new(
            "B",
            vec![
                QBezierPath::circle(point(0., 0.), 1.),
                QBezierPath::line(point(0., 1.), point(1., 1.)),
            ],
            Style::default(),
        );
        align_paths(&mut a, &mut b);
        assert_eq!(a.subpaths().len(), 2);
        assert_eq!(a.subpaths()[0].num_curves(), 8);
        assert_eq!(a.subpaths()[1].points, vec![point(1., 0.); 3]);
        for (pa, pb) in a.subpaths().iter().zip(b.subpaths()) {
            assert_eq!(pa.points.len(), pb.points.len());
        }
    }

    #[test]
    fn mesh_is_cached_until_dirty() {
        let m = square(ORIGIN, 1.);
        let first = m.borrow_mut().mesh().vertices.len();
        assert!(first > 0);
        m.set_fill(BLUE, 0.);
        assert!(m.borrow_mut().mesh().vertices.is_empty());
    }
}
