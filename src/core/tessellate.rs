use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Vector2};

use super::{color::Color, shape::Style};
use crate::geometry::bezier::QBezierPath;

/// Flattening tolerance, in scene units.
pub const TOLERANCE: f32 = 0.002;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as wgpu::BufferAddress;
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn new(p: Vector2<f32>, color: Color) -> Self {
        Self {
            position: [p.x, p.y],
            color: color.to_array(),
        }
    }
}

/// Which stencil pipeline a range of vertices is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Triangle fans inverting the stencil (even-odd fill).
    FillMark,
    /// Stroke geometry setting the stencil.
    StrokeMark,
    /// Colored quad drawn where the stencil is set, clearing it.
    Cover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub pass: Pass,
    pub range: Range<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub commands: Vec<Command>,
}

impl Mesh {
    fn push(&mut self, pass: Pass, triangles: &[[Vector2<f32>; 3]], color: Color) {
        if triangles.is_empty() {
            return;
        }
        let start = self.vertices.len() as u32;
        self.vertices.extend(
            triangles
                .iter()
                .flat_map(|t| t.iter().map(|p| Vertex::new(*p, color))),
        );
        self.commands.push(Command {
            pass,
            range: start..self.vertices.len() as u32,
        });
    }

    /// A mark pass followed by the cover quad over the marked area.
    fn push_masked(&mut self, pass: Pass, triangles: Vec<[Vector2<f32>; 3]>, color: Color) {
        let Some((min, max)) = extent(triangles.iter().flatten()) else {
            return;
        };
        self.push(pass, &triangles, Color::rgba(0., 0., 0., 0.));
        let quad = [
            [min, Vector2::new(max.x, min.y), max],
            [min, max, Vector2::new(min.x, max.y)],
        ];
        self.push(Pass::Cover, &quad, color);
    }

    /// Appends another mesh, rewriting vertex colors with `color`.
    pub fn append_with(&mut self, other: &Mesh, color: impl Fn(Color) -> Color) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices.iter().map(|v| {
            let [r, g, b, a] = v.color;
            Vertex {
                position: v.position,
                color: color(Color::rgba(r, g, b, a)).to_array(),
            }
        }));
        self.commands.extend(other.commands.iter().map(|c| Command {
            pass: c.pass,
            range: c.range.start + offset..c.range.end + offset,
        }));
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.commands.clear();
    }
}

fn extent<'a>(
    points: impl IntoIterator<Item = &'a Vector2<f32>>,
) -> Option<(Vector2<f32>, Vector2<f32>)> {
    let mut points = points.into_iter();
    let first = *points.next()?;
    Some(points.fold((first, first), |(min, max), p| {
        (
            Vector2::new(min.x.min(p.x), min.y.min(p.y)),
            Vector2::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

fn polylines(subpaths: &[QBezierPath]) -> Vec<Vec<Vector2<f32>>> {
    subpaths
        .iter()
        .map(|p| {
            let mut line = p.flatten(TOLERANCE);
            line.dedup_by(|a, b| (*a - *b).magnitude2() < 1e-12);
            line
        })
        .filter(|line| line.len() > 1)
        .collect()
}

fn fill_triangles(lines: &[Vec<Vector2<f32>>]) -> Vec<[Vector2<f32>; 3]> {
    let Some(origin) = lines.first().map(|l| l[0]) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for line in lines.iter().filter(|l| l.len() > 2) {
        out.extend(line.windows(2).map(|w| [origin, w[0], w[1]]));
        // implicit closing edge
        if let (Some(first), Some(last)) = (line.first(), line.last()) {
            if (*first - *last).magnitude2() > 1e-12 {
                out.push([origin, *last, *first]);
            }
        }
    }
    out
}

fn perp(d: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(-d.y, d.x)
}

fn stroke_triangles(lines: &[Vec<Vector2<f32>>], half_width: f32) -> Vec<[Vector2<f32>; 3]> {
    let mut out = Vec::new();
    for line in lines {
        let closed = line.len() > 3 && (line[0] - line[line.len() - 1]).magnitude2() < 1e-12;
        let pts = if closed { &line[..line.len() - 1] } else { &line[..] };
        let n = pts.len();
        let segments = if closed { n } else { n - 1 };

        let normals: Vec<Vector2<f32>> = (0..segments)
            .map(|i| perp((pts[(i + 1) % n] - pts[i]).normalize()) * half_width)
            .collect();

        for (i, &nrm) in normals.iter().enumerate() {
            let (a, b) = (pts[i], pts[(i + 1) % n]);
            out.push([a + nrm, a - nrm, b + nrm]);
            out.push([a - nrm, b - nrm, b + nrm]);
        }

        // bevel joins at interior vertices, and at the seam of closed lines
        let joins = if closed { 0..segments } else { 1..segments };
        for i in joins {
            let prev = normals[(i + segments - 1) % segments];
            let next = normals[i];
            let v = pts[i];
            out.push([v, v + prev, v + next]);
            out.push([v, v - prev, v - next]);
        }
    }
    out
}

/// Stencil-and-cover geometry for one mobject: fill first, then stroke.
pub fn tessellate(subpaths: &[QBezierPath], style: &Style) -> Mesh {
    let mut mesh = Mesh::default();
    let draw_fill = style.fill_opacity > 1e-3;
    let draw_stroke = style.stroke_width > 0. && style.stroke_opacity > 1e-3;
    if !draw_fill && !draw_stroke {
        return mesh;
    }

    let lines = polylines(subpaths);
    if draw_fill {
        mesh.push_masked(
            Pass::FillMark,
            fill_triangles(&lines),
            style.fill_color.with_alpha(style.fill_opacity),
        );
    }
    if draw_stroke {
        mesh.push_masked(
            Pass::StrokeMark,
            stroke_triangles(&lines, style.stroke_width_units() / 2.),
            style.stroke_color.with_alpha(style.stroke_opacity),
        );
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::{BLUE, RED};
    use crate::geometry::point;

    fn passes(mesh: &Mesh) -> Vec<Pass> {
        mesh.commands.iter().map(|c| c.pass).collect()
    }

    #[test]
    fn filled_dot_has_fill_and_cover() {
        let circle = QBezierPath::circle(point(0., 0.), 0.15);
        let mesh = tessellate(&[circle], &Style::filled(BLUE, 1.));
        assert_eq!(passes(&mesh), vec![Pass::FillMark, Pass::Cover]);

        let cover = &mesh.commands[1];
        assert_eq!(cover.range.len(), 6);
        let v = mesh.vertices[cover.range.start as usize];
        assert_eq!(v.color, BLUE.to_array());
        for v in &mesh.vertices[cover.range.start as usize..] {
            assert!(v.position[0].abs() <= 0.151 && v.position[1].abs() <= 0.151);
        }
    }

    #[test]
    fn line_stroke_covers_width() {
        let line = QBezierPath::line(point(0., 0.), point(1., 0.));
        let mesh = tessellate(&[line], &Style::stroked(RED, 2.));
        assert_eq!(passes(&mesh), vec![Pass::StrokeMark, Pass::Cover]);
        let range = &mesh.commands[0].range;
        let marks = &mesh.vertices[range.start as usize..range.end as usize];
        let max_y = marks.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert!((max_y - 0.01).abs() < 1e-6);
    }

    #[test]
    fn invisible_style_emits_nothing() {
        let line = QBezierPath::line(point(0., 0.), point(1., 0.));
        let style = Style::stroked(RED, 2.).with_opacity_factor(0.);
        assert!(tessellate(&[line], &style).commands.is_empty());
    }

    #[test]
    fn fill_closes_open_paths() {
        let tri = QBezierPath::polyline(&[point(0., 0.), point(1., 0.), point(0., 1.)]);
        let lines = polylines(&[tri]);
        let tris = fill_triangles(&lines);
        // two fan triangles plus the closing edge
        assert_eq!(tris.len(), 3);
    }

    #[test]
    fn append_offsets_ranges() {
        let line = QBezierPath::line(point(0., 0.), point(1., 0.));
        let one = tessellate(&[line], &Style::stroked(RED, 2.));
        let mut all = Mesh::default();
        all.append_with(&one, |c| c);
        all.append_with(&one, |c| c.with_alpha(0.5));
        assert_eq!(all.vertices.len(), 2 * one.vertices.len());
        assert_eq!(all.commands[2].range.start, one.vertices.len() as u32);
        assert_eq!(all.vertices.last().unwrap().color[3], 0.5);
    }
}
