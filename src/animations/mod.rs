pub mod composition;
pub mod creation;
pub mod easing;
pub mod indication;
pub mod transform;

pub use composition::LaggedStart;
pub use creation::{Create, FadeIn, FadeOut, GrowArrow, Uncreate, Write};
pub use indication::Flash;
pub use transform::{Recolor, Transform};

use crate::core::scene::Stage;

pub const DEFAULT_RUN_TIME: f32 = 1.;

/// An animation over a fixed run time.
///
/// `begin` runs when the animation's segment starts, so it sees the state left
/// by everything played before it. `interpolate` is called with the linear
/// progress in `[0, 1]`; the rate function is applied by the animation.
pub trait Animation {
    fn run_time(&self) -> f32 {
        DEFAULT_RUN_TIME
    }

    fn begin(&mut self, stage: &mut Stage);

    fn interpolate(&mut self, alpha: f32);

    fn finish(&mut self, _stage: &mut Stage) {}

    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Progress of part `index` out of `count` when parts start `lag_ratio` of a
/// part's duration apart.
pub fn lagged_alpha(alpha: f32, index: usize, count: usize, lag_ratio: f32) -> f32 {
    let full = count.saturating_sub(1) as f32 * lag_ratio + 1.;
    (alpha * full - index as f32 * lag_ratio).clamp(0., 1.)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::core::{
        color::BLUE,
        shape::{Group, Mobject, Style, VMobject},
    };
    use crate::geometry::{bezier::QBezierPath, point, Point};

    pub fn square(center: Point, side: f32) -> Mobject {
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

    pub fn row(count: usize) -> Mobject {
        Group::new((0..count).map(|i| square(point(i as f32 * 2., 0.), 1.)))
    }
}
