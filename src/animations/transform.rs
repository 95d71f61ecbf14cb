use super::{
    easing::{Easing, Smooth},
    Animation,
};
use crate::core::{
    color::Color,
    scene::Stage,
    shape::{align_paths, collapsed_at, Mobject, Style, VMobject},
};
use crate::geometry::{Point, ORIGIN};

/// Morphs a mobject into a copy of `target`.
///
/// Leaves are matched in order. Start leaves without a counterpart shrink onto
/// the last target leaf, target leaves without one grow out of the last start
/// leaf. When done the mobject is an exact copy of `target`, which itself is
/// never put on stage.
pub struct Transform {
    mobject: Mobject,
    target: Mobject,
    // (leaf, aligned start, aligned end)
    pairs: Vec<(Mobject, VMobject, VMobject)>,
}

impl Transform {
    pub fn new(mobject: Mobject, target: Mobject) -> Self {
        Self {
            mobject,
            target,
            pairs: Vec::new(),
        }
    }
}

fn anchor(leaves: &[VMobject]) -> Point {
    leaves
        .iter()
        .rev()
        .find_map(VMobject::last_point)
        .unwrap_or(ORIGIN)
}

impl Animation for Transform {
    fn begin(&mut self, stage: &mut Stage) {
        let starts: Vec<VMobject> = self
            .mobject
            .leaves()
            .iter()
            .map(|m| m.borrow().point_copy())
            .collect();

        self.mobject.become_copy(&self.target);
        let mut leaves = self.mobject.leaves();
        let ends: Vec<VMobject> = leaves.iter().map(|m| m.borrow().point_copy()).collect();

        let (start_anchor, end_anchor) = (anchor(&starts), anchor(&ends));
        let count = starts.len().max(ends.len());
        let mut pairs = Vec::with_capacity(count);
        for i in 0..count {
            let (mut start, mut end) = match (starts.get(i), ends.get(i)) {
                (Some(s), Some(e)) => (s.point_copy(), e.point_copy()),
                (Some(s), None) => {
                    let mut collapsed = collapsed_at(s, end_anchor);
                    collapsed.set_style(s.style().with_opacity_factor(0.));
                    (s.point_copy(), collapsed)
                }
                (None, Some(e)) => (collapsed_at(e, start_anchor), e.point_copy()),
                (None, None) => continue,
            };
            align_paths(&mut start, &mut end);

            // leftover start leaves ride along as extra children until the end
            let leaf = if i < leaves.len() {
                leaves[i].clone()
            } else {
                let ghost: Mobject = start.point_copy().into();
                self.mobject.add(ghost.clone());
                leaves.push(ghost.clone());
                ghost
            };
            pairs.push((leaf, start, end));
        }
        self.pairs = pairs;
        self.interpolate(0.);
        stage.add(&self.mobject);
    }

    fn interpolate(&mut self, alpha: f32) {
        let t = Smooth.ease(alpha);
        for (leaf, start, end) in &self.pairs {
            leaf.borrow_mut().interpolate(start, end, t);
        }
    }

    fn finish(&mut self, _stage: &mut Stage) {
        self.mobject.become_copy(&self.target);
        self.pairs.clear();
    }
}

/// Smoothly recolors stroke and fill of every leaf.
pub struct Recolor {
    mobject: Mobject,
    color: Color,
    leaves: Vec<(Mobject, Style, Style)>,
}

impl Recolor {
    pub fn new(mobject: Mobject, color: Color) -> Self {
        Self {
            mobject,
            color,
            leaves: Vec::new(),
        }
    }
}

impl Animation for Recolor {
    fn begin(&mut self, _stage: &mut Stage) {
        self.leaves = self
            .mobject
            .leaves()
            .into_iter()
            .map(|leaf| {
                let start = leaf.borrow().style().clone();
                let end = Style {
                    stroke_color: self.color,
                    fill_color: self.color,
                    ..start.clone()
                };
                (leaf, start, end)
            })
            .collect();
    }

    fn interpolate(&mut self, alpha: f32) {
        let t = Smooth.ease(alpha);
        for (leaf, start, end) in &self.leaves {
            leaf.borrow_mut().set_style(start.lerp(end, t));
        }
    }
}
