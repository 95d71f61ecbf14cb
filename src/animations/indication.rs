use super::{
    easing::{Easing, Smooth},
    Animation,
};
use crate::core::{
    color::Color,
    scene::Stage,
    shape::{Mobject, VMobject},
};
use crate::geometry::shapes::flash_rays;

const FLASH_LINE_LENGTH: f32 = 0.2;
const FLASH_NUM_LINES: usize = 12;
// fraction of each ray visible at once
const FLASH_TIME_WIDTH: f32 = 1.;

/// A burst of short rays around a mobject, each shown as a passing flash.
pub struct Flash {
    mobject: Mobject,
    color: Color,
    flash_radius: f32,
    rays: Option<Mobject>,
    leaves: Vec<(Mobject, VMobject)>,
}

impl Flash {
    pub fn new(mobject: Mobject, color: Color, flash_radius: f32) -> Self {
        Self {
            mobject,
            color,
            flash_radius,
            rays: None,
            leaves: Vec::new(),
        }
    }
}

impl Animation for Flash {
    fn begin(&mut self, stage: &mut Stage) {
        let rays = flash_rays(
            self.mobject.center(),
            self.color,
            self.flash_radius,
            FLASH_LINE_LENGTH,
            FLASH_NUM_LINES,
        );
        self.leaves = rays
            .leaves()
            .into_iter()
            .map(|ray| {
                let copy = ray.borrow().point_copy();
                (ray, copy)
            })
            .collect();
        self.interpolate(0.);
        stage.add(&rays);
        self.rays = Some(rays);
    }

    fn interpolate(&mut self, alpha: f32) {
        let upper = Smooth.ease(alpha) * (1. + FLASH_TIME_WIDTH);
        let lower = upper - FLASH_TIME_WIDTH;
        for (ray, original) in &self.leaves {
            ray.borrow_mut()
                .become_partial(original, lower.max(0.), upper.min(1.));
        }
    }

    fn finish(&mut self, stage: &mut Stage) {
        if let Some(rays) = self.rays.take() {
            stage.remove(&rays);
        }
    }
}
