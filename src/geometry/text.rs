use std::path::{Path, PathBuf};

use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};

use super::{bezier::QBezierPath, point, Point, FRAME_WIDTH, ORIGIN};
use crate::core::{
    color::{Color, WHITE},
    shape::{Mobject, Style, VMobject},
};
use crate::error::{Error, Result};

pub const DEFAULT_FONT_SIZE: f32 = 48.;

// glyphs are laid out at this pixel size, then scaled into scene units
const LAYOUT_PX: f32 = 100.;

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Weight {
    #[default]
    Normal,
    Bold,
}

pub struct Fonts {
    regular: Font<'static>,
    bold: Font<'static>,
}

fn load_font(path: &Path) -> Result<Font<'static>> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data).ok_or_else(|| Error::FontParse(path.to_path_buf()))
}

fn discover_font(candidates: &[&str]) -> Option<(PathBuf, Font<'static>)> {
    candidates
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .find_map(|p| load_font(&p).ok().map(|f| (p, f)))
}

impl Fonts {
    /// Loads the given faces, falling back to well-known system locations.
    /// A missing bold face falls back to the regular one.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self> {
        let regular = match regular {
            Some(path) => load_font(path)?,
            None => {
                let (path, font) =
                    discover_font(REGULAR_CANDIDATES).ok_or_else(|| Error::FontNotFound {
                        tried: REGULAR_CANDIDATES.iter().map(PathBuf::from).collect(),
                    })?;
                log::info!("Using font {}", path.display());
                font
            }
        };

        let bold = match bold {
            Some(path) => load_font(path)?,
            None => match discover_font(BOLD_CANDIDATES) {
                Some((path, font)) => {
                    log::info!("Using bold font {}", path.display());
                    font
                }
                None => {
                    log::warn!("No bold font found, bold text uses the regular face");
                    regular.clone()
                }
            },
        };

        Ok(Self { regular, bold })
    }

    #[cfg(test)]
    pub fn discover() -> Result<Self> {
        Self::load(None, None)
    }

    fn face(&self, weight: Weight) -> &Font<'static> {
        match weight {
            Weight::Normal => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

/// Collects glyph contours as quadratic subpaths, mapping font pixels to scene units.
struct GlyphOutline {
    origin: Point,
    scale: f32,
    subpaths: Vec<QBezierPath>,
    current: Vec<Point>,
}

impl GlyphOutline {
    fn new(origin: Point, scale: f32) -> Self {
        Self {
            origin,
            scale,
            subpaths: Vec::new(),
            current: Vec::new(),
        }
    }

    // rusttype outlines are y-down
    fn map(&self, x: f32, y: f32) -> Point {
        self.origin + point(x, -y) * self.scale
    }

    fn flush(&mut self) {
        let current = std::mem::take(&mut self.current);
        if current.len() >= 3 {
            self.subpaths.push(QBezierPath::new(current));
        }
    }

    fn last(&self) -> Option<Point> {
        self.current.last().copied()
    }

    fn finish(mut self) -> Vec<QBezierPath> {
        self.flush();
        self.subpaths
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        if let Some(last) = self.last() {
            self.current.push((last + p) * 0.5);
            self.current.push(p);
        }
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (h, p) = (self.map(x1, y1), self.map(x, y));
        if self.last().is_some() {
            self.current.push(h);
            self.current.push(p);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let Some(p0) = self.last() else {
            return;
        };
        let (c1, c2, p3) = (self.map(x1, y1), self.map(x2, y2), self.map(x, y));
        // split the cubic at its midpoint and approximate each half by a quadratic
        let m01 = (p0 + c1) * 0.5;
        let m12 = (c1 + c2) * 0.5;
        let m23 = (c2 + p3) * 0.5;
        let a = (m01 + m12) * 0.5;
        let b = (m12 + m23) * 0.5;
        let mid = (a + b) * 0.5;
        for (s, h1, h2, e) in [(p0, m01, a, mid), (mid, b, m23, p3)] {
            self.current.push((h1 * 3. + h2 * 3. - s - e) * 0.25);
            self.current.push(e);
        }
    }

    fn close(&mut self) {
        if let (Some(first), Some(last)) = (self.current.first().copied(), self.last()) {
            if first != last {
                self.line_to_point(first);
            }
        }
        self.flush();
    }
}

impl GlyphOutline {
    fn line_to_point(&mut self, p: Point) {
        if let Some(last) = self.last() {
            self.current.push((last + p) * 0.5);
            self.current.push(p);
        }
    }
}

pub struct Text;

impl Text {
    pub fn builder(content: impl Into<String>) -> TextBuilder {
        TextBuilder {
            content: content.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: WHITE,
            weight: Weight::Normal,
        }
    }
}

pub struct TextBuilder {
    content: String,
    font_size: f32,
    color: Color,
    weight: Weight,
}

impl TextBuilder {
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    pub fn bold(self) -> Self {
        self.weight(Weight::Bold)
    }

    /// One child mobject per visible glyph, centered on the origin.
    pub fn build(&self, fonts: &Fonts) -> Mobject {
        let font = fonts.face(self.weight);
        let units_per_px = self.font_size * FRAME_WIDTH / 960. / LAYOUT_PX;
        let style = Style::filled(self.color, 1.);

        let glyphs = font
            .layout(&self.content, Scale::uniform(LAYOUT_PX), rt_point(0., 0.))
            .filter_map(|glyph| {
                let pos = glyph.position();
                let mut outline =
                    GlyphOutline::new(point(pos.x, -pos.y) * units_per_px, units_per_px);
                glyph.unpositioned().build_outline(&mut outline);
                let subpaths = outline.finish();
                (!subpaths.is_empty())
                    .then(|| Mobject::from(VMobject::new("Glyph", subpaths, style.clone())))
            })
            .collect();

        let mut text = VMobject::group(glyphs);
        text.name = "Text";
        let text: Mobject = text.into();
        text.move_to(ORIGIN);
        text
    }
}
