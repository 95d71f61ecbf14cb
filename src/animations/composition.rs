use super::Animation;
use crate::core::scene::Stage;

/// Plays animations with staggered starts: each one starts `lag_ratio` of the
/// previous one's run time after it.
pub struct LaggedStart {
    animations: Vec<Box<dyn Animation>>,
    starts: Vec<f32>,
    run_time: f32,
}

impl LaggedStart {
    pub fn new(animations: Vec<Box<dyn Animation>>, lag_ratio: f32) -> Self {
        let mut starts = Vec::with_capacity(animations.len());
        let mut start = 0.;
        for anim in &animations {
            starts.push(start);
            start += anim.run_time() * lag_ratio;
        }
        let run_time = animations
            .iter()
            .zip(&starts)
            .map(|(a, s)| s + a.run_time())
            .fold(0., f32::max);
        Self {
            animations,
            starts,
            run_time,
        }
    }
}

#[macro_export]
macro_rules! lagged_start {
    ($lag_ratio:expr; $($anim:expr),+ $(,)?) => {
        $crate::animations::LaggedStart::new(
            vec![$(Box::new($anim) as Box<dyn $crate::animations::Animation>),+],
            $lag_ratio,
        )
    };
}

impl Animation for LaggedStart {
    fn run_time(&self) -> f32 {
        self.run_time
    }

    fn begin(&mut self, stage: &mut Stage) {
        for anim in &mut self.animations {
            anim.begin(stage);
        }
    }

    fn interpolate(&mut self, alpha: f32) {
        let t = alpha * self.run_time;
        for (anim, start) in self.animations.iter_mut().zip(&self.starts) {
            let local = (t - start) / anim.run_time();
            anim.interpolate(local.clamp(0., 1.));
        }
    }

    fn finish(&mut self, stage: &mut Stage) {
        for anim in &mut self.animations {
            anim.finish(stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::{
        test_utils::{row, square},
        Create, FadeIn, Write,
    };
    use crate::geometry::{point, ORIGIN};

    #[test]
    fn staggered_starts_stretch_run_time() {
        let anim = lagged_start!(0.1;
            Create::new(row(2)),
            Create::new(row(2)),
            Create::new(row(2)),
            Write::new(square(ORIGIN, 1.)),
            Write::new(square(ORIGIN, 1.)),
        );
        assert!((anim.run_time() - 1.4).abs() < 1e-5);
        assert!((anim.starts[4] - 0.4).abs() < 1e-5);
    }

    #[test]
    fn sub_animations_follow_their_window() {
        let a = square(ORIGIN, 1.);
        let b = square(point(2., 0.), 1.);
        let mut stage = Stage::default();
        let mut anim = lagged_start!(0.5; FadeIn::new(a.clone()), FadeIn::new(b.clone()));
        assert_eq!(anim.run_time(), 1.5);
        anim.begin(&mut stage);
        assert_eq!(stage.mobjects().len(), 2);

        anim.interpolate(0.5 / 1.5);
        assert!((a.borrow().style().fill_opacity - 0.5).abs() < 1e-4);
        assert!(b.borrow().style().fill_opacity < 1e-6);

        anim.interpolate(1.);
        assert_eq!(b.borrow().style().fill_opacity, 1.);
        anim.finish(&mut stage);
    }

    #[test]
    fn empty_group_has_no_duration() {
        let anim = LaggedStart::new(Vec::new(), 0.2);
        assert_eq!(anim.run_time(), 0.);
    }
}
