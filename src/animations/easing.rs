pub trait Easing {
    fn ease(&self, t: f32) -> f32;
}

macro_rules! define_easing {
    ($name:ident, $func:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Easing for $name {
            fn ease(&self, t: f32) -> f32 {
                $func(t)
            }
        }
    };
}

define_easing!(Linear, |t: f32| t);

// from manim
define_easing!(Smooth, |t: f32| t * t * t * (10. + 6. * t * t - 15. * t));

/// Plays another rate function backwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reversed<E: Easing>(pub E);

impl<E: Easing> Easing for Reversed<E> {
    fn ease(&self, t: f32) -> f32 {
        self.0.ease(1. - t)
    }
}
