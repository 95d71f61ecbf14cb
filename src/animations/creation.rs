use super::{
    easing::{Easing, Linear, Reversed, Smooth},
    lagged_alpha, Animation, DEFAULT_RUN_TIME,
};
use crate::core::{
    scene::Stage,
    shape::{collapsed_at, Mobject, Style, VMobject},
};

/// Leaves of `mobject` paired with a snapshot of their current state.
fn snapshot(mobject: &Mobject) -> Vec<(Mobject, VMobject)> {
    mobject
        .leaves()
        .into_iter()
        .map(|leaf| {
            let copy = leaf.borrow().point_copy();
            (leaf, copy)
        })
        .collect()
}

fn restore(leaves: &[(Mobject, VMobject)]) {
    for (leaf, original) in leaves {
        let mut leaf = leaf.borrow_mut();
        *leaf.subpaths_mut() = original.subpaths().to_vec();
        leaf.set_style(original.style().clone());
    }
}

/// Draws the leaves of a mobject one after another.
pub struct Create {
    mobject: Mobject,
    run_time: f32,
    lag_ratio: f32,
    easing: Box<dyn Easing>,
    remover: bool,
    leaves: Vec<(Mobject, VMobject)>,
}

impl Create {
    pub fn new(mobject: Mobject) -> Self {
        Self {
            mobject,
            run_time: DEFAULT_RUN_TIME,
            lag_ratio: 1.,
            easing: Box::new(Smooth),
            remover: false,
            leaves: Vec::new(),
        }
    }

    pub fn run_time(mut self, run_time: f32) -> Self {
        self.run_time = run_time;
        self
    }
}

impl Animation for Create {
    fn run_time(&self) -> f32 {
        self.run_time
    }

    fn begin(&mut self, stage: &mut Stage) {
        self.leaves = snapshot(&self.mobject);
        self.interpolate(0.);
        stage.add(&self.mobject);
    }

    fn interpolate(&mut self, alpha: f32) {
        let n = self.leaves.len();
        for (i, (leaf, original)) in self.leaves.iter().enumerate() {
            let sub = self.easing.ease(lagged_alpha(alpha, i, n, self.lag_ratio));
            leaf.borrow_mut().become_partial(original, 0., sub);
        }
    }

    fn finish(&mut self, stage: &mut Stage) {
        if self.remover {
            stage.remove(&self.mobject);
            restore(&self.leaves);
        }
    }
}

/// Erases a mobject in the reverse order of [`Create`], then removes it.
pub struct Uncreate(Create);

impl Uncreate {
    pub fn new(mobject: Mobject) -> Self {
        Self(Create {
            easing: Box::new(Reversed(Smooth)),
            remover: true,
            ..Create::new(mobject)
        })
    }
}

impl Animation for Uncreate {
    fn run_time(&self) -> f32 {
        self.0.run_time
    }

    fn begin(&mut self, stage: &mut Stage) {
        self.0.begin(stage);
    }

    fn interpolate(&mut self, alpha: f32) {
        self.0.interpolate(alpha);
    }

    fn finish(&mut self, stage: &mut Stage) {
        self.0.finish(stage);
    }
}

/// Outline each leaf, then fill it in.
pub struct Write {
    mobject: Mobject,
    run_time: f32,
    lag_ratio: f32,
    // (leaf, final state, outline)
    leaves: Vec<(Mobject, VMobject, VMobject)>,
}

const WRITE_STROKE_WIDTH: f32 = 2.;

impl Write {
    pub fn new(mobject: Mobject) -> Self {
        let n = mobject.leaves().len();
        Self {
            mobject,
            run_time: if n < 15 { 1. } else { 2. },
            lag_ratio: (4. / n.max(1) as f32).min(0.2),
            leaves: Vec::new(),
        }
    }

    fn outline(leaf: &VMobject) -> VMobject {
        let mut outline = leaf.point_copy();
        let style = leaf.style();
        let stroke_color = if style.stroke_width > 0. {
            style.stroke_color
        } else {
            style.fill_color
        };
        outline.set_style(Style {
            stroke_color,
            stroke_opacity: 1.,
            stroke_width: WRITE_STROKE_WIDTH,
            fill_color: style.fill_color,
            fill_opacity: 0.,
        });
        outline
    }
}

impl Animation for Write {
    fn run_time(&self) -> f32 {
        self.run_time
    }

    fn begin(&mut self, stage: &mut Stage) {
        self.leaves = snapshot(&self.mobject)
            .into_iter()
            .map(|(leaf, original)| {
                let outline = Self::outline(&original);
                (leaf, original, outline)
            })
            .collect();
        self.interpolate(0.);
        stage.add(&self.mobject);
    }

    fn interpolate(&mut self, alpha: f32) {
        let n = self.leaves.len();
        for (i, (leaf, original, outline)) in self.leaves.iter().enumerate() {
            let sub = Linear.ease(lagged_alpha(alpha, i, n, self.lag_ratio));
            let mut leaf = leaf.borrow_mut();
            if sub < 0.5 {
                leaf.become_partial(outline, 0., sub * 2.);
            } else {
                leaf.interpolate(outline, original, sub * 2. - 1.);
            }
        }
    }
}

fn fade(leaves: &[(Mobject, VMobject)], factor: f32) {
    for (leaf, original) in leaves {
        leaf.borrow_mut()
            .set_style(original.style().with_opacity_factor(factor));
    }
}

pub struct FadeIn {
    mobject: Mobject,
    leaves: Vec<(Mobject, VMobject)>,
}

impl FadeIn {
    pub fn new(mobject: Mobject) -> Self {
        Self {
            mobject,
            leaves: Vec::new(),
        }
    }
}

impl Animation for FadeIn {
    fn begin(&mut self, stage: &mut Stage) {
        self.leaves = snapshot(&self.mobject);
        self.interpolate(0.);
        stage.add(&self.mobject);
    }

    fn interpolate(&mut self, alpha: f32) {
        fade(&self.leaves, Smooth.ease(alpha));
    }
}

pub struct FadeOut {
    mobject: Mobject,
    leaves: Vec<(Mobject, VMobject)>,
}

impl FadeOut {
    pub fn new(mobject: Mobject) -> Self {
        Self {
            mobject,
            leaves: Vec::new(),
        }
    }
}

impl Animation for FadeOut {
    fn begin(&mut self, _stage: &mut Stage) {
        self.leaves = snapshot(&self.mobject);
    }

    fn interpolate(&mut self, alpha: f32) {
        fade(&self.leaves, 1. - Smooth.ease(alpha));
    }

    fn finish(&mut self, stage: &mut Stage) {
        stage.remove(&self.mobject);
        restore(&self.leaves);
    }
}

/// Grows an arrow out of its start point.
pub struct GrowArrow {
    mobject: Mobject,
    // (leaf, final state, collapsed onto the start point)
    leaves: Vec<(Mobject, VMobject, VMobject)>,
}

impl GrowArrow {
    pub fn new(arrow: Mobject) -> Self {
        Self {
            mobject: arrow,
            leaves: Vec::new(),
        }
    }
}

impl Animation for GrowArrow {
    fn begin(&mut self, stage: &mut Stage) {
        let leaves = snapshot(&self.mobject);
        let Some(start) = leaves
            .first()
            .and_then(|(_, m)| m.subpaths().first().and_then(|p| p.first_point()))
        else {
            return;
        };
        self.leaves = leaves
            .into_iter()
            .map(|(leaf, original)| {
                let collapsed = collapsed_at(&original, start);
                (leaf, original, collapsed)
            })
            .collect();
        self.interpolate(0.);
        stage.add(&self.mobject);
    }

    fn interpolate(&mut self, alpha: f32) {
        let t = Smooth.ease(alpha);
        for (leaf, original, collapsed) in &self.leaves {
            leaf.borrow_mut().interpolate(collapsed, original, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::test_utils::{row, square};
    use crate::core::color::{BLUE, RED};
    use crate::geometry::{point, shapes::Arrow, ORIGIN};

    #[test]
    fn create_draws_leaves_in_turn() {
        let g = row(2);
        let mut stage = Stage::default();
        let mut anim = Create::new(g.clone());
        anim.begin(&mut stage);
        assert_eq!(stage.mobjects().len(), 1);
        assert!(stage.draw_order().is_empty());

        // halfway through, the first square is complete and the second untouched
        anim.interpolate(0.5);
        let leaves = g.family();
        assert_eq!(leaves[1].borrow().num_curves(), 4);
        assert!(!leaves[2].borrow().has_points());

        anim.interpolate(1.);
        anim.finish(&mut stage);
        assert_eq!(g.leaves().len(), 2);
        assert_eq!(stage.draw_order().len(), 2);
    }

    #[test]
    fn uncreate_erases_and_removes() {
        let g = row(2);
        let mut stage = Stage::default();
        stage.add(&g);
        let mut anim = Uncreate::new(g.clone());
        anim.begin(&mut stage);
        anim.interpolate(0.);
        assert_eq!(g.leaves().len(), 2);
        anim.interpolate(0.75);
        let family = g.family();
        assert!(!family[1].borrow().has_points());
        assert!(family[2].borrow().has_points());
        anim.interpolate(1.);
        anim.finish(&mut stage);
        assert!(stage.mobjects().is_empty());
        // points come back so the mobject can be reused
        assert_eq!(g.leaves().len(), 2);
    }

    #[test]
    fn create_run_time_override() {
        assert_eq!(Create::new(square(ORIGIN, 1.)).run_time(2.).run_time, 2.);
        assert_eq!(Animation::run_time(&Create::new(square(ORIGIN, 1.))), 1.);
    }

    #[test]
    fn write_outlines_then_fills() {
        let s = square(ORIGIN, 1.);
        let mut stage = Stage::default();
        let mut anim = Write::new(s.clone());
        assert_eq!(Animation::run_time(&anim), 1.);
        anim.begin(&mut stage);

        anim.interpolate(0.5);
        {
            let m = s.borrow();
            assert_eq!(m.style().fill_opacity, 0.);
            assert_eq!(m.style().stroke_width, 2.);
            assert_eq!(m.style().stroke_color, BLUE);
            assert_eq!(m.num_curves(), 4);
        }

        anim.interpolate(0.75);
        assert!((s.borrow().style().fill_opacity - 0.5).abs() < 1e-5);

        anim.interpolate(1.);
        assert_eq!(*s.borrow().style(), Style::filled(BLUE, 1.));
    }

    #[test]
    fn write_timing_depends_on_leaf_count() {
        let long = Write::new(row(20));
        assert_eq!(Animation::run_time(&long), 2.);
        assert!((long.lag_ratio - 0.2).abs() < 1e-6);
        let short = Write::new(row(5));
        assert_eq!(Animation::run_time(&short), 1.);
        assert!((short.lag_ratio - 0.2).abs() < 1e-6);
        assert_eq!(Write::new(row(40)).lag_ratio, 0.1);
    }

    #[test]
    fn fades_scale_opacity() {
        let s = square(ORIGIN, 1.);
        let mut stage = Stage::default();
        let mut fade_in = FadeIn::new(s.clone());
        fade_in.begin(&mut stage);
        assert!(stage.contains(&s));
        assert_eq!(s.borrow().style().fill_opacity, 0.);
        fade_in.interpolate(0.5);
        assert!((s.borrow().style().fill_opacity - 0.5).abs() < 1e-5);
        fade_in.interpolate(1.);
        fade_in.finish(&mut stage);

        let mut fade_out = FadeOut::new(s.clone());
        fade_out.begin(&mut stage);
        fade_out.interpolate(1.);
        assert_eq!(s.borrow().style().fill_opacity, 0.);
        fade_out.finish(&mut stage);
        assert!(!stage.contains(&s));
        assert_eq!(s.borrow().style().fill_opacity, 1.);
    }

    #[test]
    fn grow_arrow_starts_at_tail() {
        let arrow = Arrow::new(point(-5., 0.), point(0.5, 0.), RED, 0.2);
        let mut stage = Stage::default();
        let mut anim = GrowArrow::new(arrow.clone());
        anim.begin(&mut stage);
        let b = arrow.bounds().unwrap();
        assert!((b.min.x + 4.8).abs() < 1e-5 && (b.max.x + 4.8).abs() < 1e-5);

        anim.interpolate(0.5);
        assert!((arrow.bounds().unwrap().max.x - (-4.8 + 5.1 / 2.)).abs() < 1e-4);
        anim.interpolate(1.);
        assert!((arrow.bounds().unwrap().max.x - 0.3).abs() < 1e-4);
    }
}
