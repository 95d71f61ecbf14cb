use super::{color::Color, shape::Mobject};
use crate::animations::Animation;

/// The mobjects currently on screen, back to front.
#[derive(Debug, Default)]
pub struct Stage {
    mobjects: Vec<Mobject>,
}

impl Stage {
    /// Adds `mobject` unless it is already drawn as part of some member's family.
    pub fn add(&mut self, mobject: &Mobject) {
        if !self.contains(mobject) {
            self.mobjects.push(mobject.clone());
        }
    }

    pub fn remove(&mut self, mobject: &Mobject) {
        self.mobjects.retain(|m| !m.ptr_eq(mobject));
    }

    pub fn contains(&self, mobject: &Mobject) -> bool {
        self.mobjects.iter().any(|m| m.contains(mobject))
    }

    pub fn mobjects(&self) -> &[Mobject] {
        &self.mobjects
    }

    /// Every family member with points, in paint order.
    pub fn draw_order(&self) -> Vec<Mobject> {
        self.mobjects.iter().flat_map(Mobject::leaves).collect()
    }
}

pub enum Segment {
    Play(Vec<Box<dyn Animation>>),
    Wait(f32),
}

impl Segment {
    pub fn duration(&self) -> f32 {
        match self {
            Segment::Play(anims) => anims.iter().map(|a| a.run_time()).fold(0., f32::max),
            Segment::Wait(t) => *t,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Segment::Play(anims) => {
                let names: Vec<_> = anims.iter().map(|a| a.name()).collect();
                format!("play({})", names.join(", "))
            }
            Segment::Wait(t) => format!("wait({t})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub background: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: super::color::BLACK,
        }
    }
}

/// A recorded timeline of play and wait segments.
pub struct Scene {
    config: SceneConfig,
    segments: Vec<Segment>,
}

#[macro_export]
macro_rules! play {
    ($scene:expr, $($anim:expr),+ $(,)?) => {
        $scene.play(vec![$(Box::new($anim) as Box<dyn $crate::animations::Animation>),+])
    };
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            segments: Vec::new(),
        }
    }

    pub fn set_background(&mut self, color: Color) {
        self.config.background = color;
    }

    #[cfg(test)]
    pub fn background(&self) -> Color {
        self.config.background
    }

    pub fn play(&mut self, anims: Vec<Box<dyn Animation>>) {
        if anims.is_empty() {
            log::warn!("Ignoring play() without animations");
            return;
        }
        self.segments.push(Segment::Play(anims));
    }

    pub fn wait(&mut self, seconds: f32) {
        self.segments.push(Segment::Wait(seconds));
    }

    pub fn wait_default(&mut self) {
        self.wait(crate::animations::DEFAULT_RUN_TIME);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn duration(&self) -> f32 {
        self.segments.iter().map(Segment::duration).sum()
    }
}

/// Plays a [`Scene`] forward in time, driving its animations on a [`Stage`].
pub struct Player {
    background: Color,
    segments: Vec<Segment>,
    stage: Stage,
    index: usize,
    time: f32,
    elapsed: f32,
    started: bool,
}

impl Player {
    pub fn new(scene: Scene) -> Self {
        Self {
            background: scene.config.background,
            segments: scene.segments,
            stage: Stage::default(),
            index: 0,
            time: 0.,
            elapsed: 0.,
            started: false,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.segments.iter().map(Segment::duration).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.segments.len()
    }

    /// Moves the timeline forward by `dt` seconds, finishing and beginning
    /// segments as their boundaries are crossed.
    pub fn advance(&mut self, dt: f32) {
        let Self {
            segments,
            stage,
            index,
            time,
            elapsed,
            started,
            ..
        } = self;
        let mut remaining = dt.max(0.);

        while let Some(segment) = segments.get_mut(*index) {
            if !*started {
                log::debug!("t={:.2}s {}", *elapsed, segment.describe());
                if let Segment::Play(anims) = segment {
                    anims.iter_mut().for_each(|a| a.begin(stage));
                }
                *started = true;
            }

            let duration = segment.duration();
            if *time + remaining >= duration {
                remaining -= duration - *time;
                *elapsed += duration - *time;
                if let Segment::Play(anims) = segment {
                    for anim in anims.iter_mut() {
                        anim.interpolate(1.);
                        anim.finish(stage);
                    }
                }
                *index += 1;
                *time = 0.;
                *started = false;
                continue;
            }

            *time += remaining;
            *elapsed += remaining;
            if let Segment::Play(anims) = segment {
                for anim in anims.iter_mut() {
                    anim.interpolate((*time / anim.run_time()).clamp(0., 1.));
                }
            }
            return;
        }
    }

    /// Plays everything that is left.
    pub fn finish(&mut self) {
        self.advance(f32::INFINITY);
    }
}
