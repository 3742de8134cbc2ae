//! The whole tree: five populations following one state signal

use std::f64::consts::TAU;

use crate::config::{SceneConfig, DEFAULT_SEED};
use crate::error::Result;
use crate::math::Mat4;
use crate::populations::{
    FoliagePopulation, LightPopulation, OrnamentPopulation, Population, StarPopulation,
};
use crate::state::{FrameInput, TreeState};

pub struct Scene {
    state: TreeState,
    foliage: FoliagePopulation,
    boxes: OrnamentPopulation,
    balls: OrnamentPopulation,
    lights: LightPopulation,
    star: StarPopulation,
    total_elapsed: f64,
    group_rotation: f64,
    assembled_spin: f32,
    dispersed_spin: f32,
    pixel_ratio: f32,
    max_pixel_ratio: f32,
}

impl Scene {
    pub fn new(config: &SceneConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed_or(DEFAULT_SEED);

        let mut scene = Self {
            state: TreeState::Dispersed,
            foliage: FoliagePopulation::new(&config.foliage, seed)?,
            boxes: OrnamentPopulation::new(&config.boxes, seed)?,
            balls: OrnamentPopulation::new(&config.balls, seed)?,
            lights: LightPopulation::new(&config.lights, seed)?,
            star: StarPopulation::new(&config.star)?,
            total_elapsed: 0.0,
            group_rotation: 0.0,
            assembled_spin: config.assembled_spin,
            dispersed_spin: config.dispersed_spin,
            pixel_ratio: 1.0,
            max_pixel_ratio: config.render.max_pixel_ratio,
        };

        if config.start_assembled {
            scene.state = TreeState::Assembled;
            scene.for_each_mut(|p| p.snap_to(TreeState::Assembled, 0.0));
        }

        log::info!("scene built with seed {:#x}, starting {:?}", seed, scene.state);
        Ok(scene)
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    pub fn set_state(&mut self, state: TreeState) {
        if state != self.state {
            log::info!("tree state -> {:?}", state);
        }
        self.state = state;
    }

    /// Flip between dispersed and assembled, returning the new state
    pub fn toggle(&mut self) -> TreeState {
        self.set_state(self.state.toggled());
        self.state
    }

    /// Advance every population by `elapsed` seconds
    pub fn update(&mut self, elapsed: f32) {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        self.total_elapsed += elapsed as f64;

        let spin = if self.state.is_assembled() {
            self.assembled_spin
        } else {
            self.dispersed_spin
        };
        self.group_rotation = (self.group_rotation + spin as f64 * elapsed as f64).rem_euclid(TAU);

        let frame = FrameInput::new(self.state, elapsed, self.total_elapsed);
        self.for_each_mut(|p| p.update(&frame));
    }

    /// Jump every population to the end of `state`
    pub fn snap_to(&mut self, state: TreeState) {
        self.set_state(state);
        let time = self.total_elapsed;
        self.for_each_mut(|p| p.snap_to(state, time));
    }

    /// Mean progress across populations
    pub fn progress(&self) -> f32 {
        let populations = self.populations();
        populations.iter().map(|p| p.progress()).sum::<f32>() / populations.len() as f32
    }

    /// Whether every population is within `epsilon` of the current state
    pub fn is_settled(&self, epsilon: f32) -> bool {
        let target = self.state.target();
        self.populations()
            .iter()
            .all(|p| (p.progress() - target).abs() <= epsilon)
    }

    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    /// Current spin of the whole tree about Y, in [0, 2pi)
    pub fn group_rotation(&self) -> f32 {
        self.group_rotation as f32
    }

    pub fn group_matrix(&self) -> Mat4 {
        Mat4::rotation_y(self.group_rotation())
    }

    /// Store the viewport's pixel density, clamped to [1, max_pixel_ratio]
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = if ratio.is_finite() {
            ratio.clamp(1.0, self.max_pixel_ratio)
        } else {
            1.0
        };
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn foliage(&self) -> &FoliagePopulation {
        &self.foliage
    }

    pub fn boxes(&self) -> &OrnamentPopulation {
        &self.boxes
    }

    pub fn balls(&self) -> &OrnamentPopulation {
        &self.balls
    }

    pub fn lights(&self) -> &LightPopulation {
        &self.lights
    }

    pub fn star(&self) -> &StarPopulation {
        &self.star
    }

    pub fn populations(&self) -> [&dyn Population; 5] {
        [&self.foliage, &self.boxes, &self.balls, &self.lights, &self.star]
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(&mut dyn Population)) {
        f(&mut self.foliage);
        f(&mut self.boxes);
        f(&mut self.balls);
        f(&mut self.lights);
        f(&mut self.star);
    }
}
