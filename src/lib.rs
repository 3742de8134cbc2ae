use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

pub mod animation;
pub mod config;
pub mod error;
pub mod layout;
pub mod math;
pub mod mesh;
pub mod populations;
pub mod render;
pub mod scene;
pub mod state;

pub use config::SceneConfig;
pub use error::{Result, TreeError};
pub use scene::Scene;
pub use state::TreeState;

use render::{OrbitCamera, RenderPipeline};

/// Install the panic hook and the console logger
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Info);
}

/// The default scene configuration as YAML, for use as a template
#[wasm_bindgen]
pub fn default_config() -> std::result::Result<String, JsValue> {
    SceneConfig::default_yaml().map_err(to_js)
}

fn to_js(error: TreeError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Fresh 64-bit seed from the browser's RNG
fn random_seed() -> u64 {
    let word = || (js_sys::Math::random() * 4_294_967_296.0) as u64;
    (word() << 32) | word()
}

/// Christmas tree engine exposed to JavaScript
#[wasm_bindgen]
pub struct GrandTree {
    pipeline: RenderPipeline,
    scene: Scene,
    camera: OrbitCamera,
}

#[wasm_bindgen]
impl GrandTree {
    /// Build the default scene on `canvas`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> std::result::Result<GrandTree, JsValue> {
        Self::build(canvas, SceneConfig::default())
    }

    /// Build a scene from a (possibly partial) YAML configuration
    pub fn with_config(canvas: HtmlCanvasElement, yaml: &str) -> std::result::Result<GrandTree, JsValue> {
        let config = SceneConfig::from_yaml(yaml).map_err(to_js)?;
        Self::build(canvas, config)
    }

    fn build(canvas: HtmlCanvasElement, mut config: SceneConfig) -> std::result::Result<GrandTree, JsValue> {
        if config.seed.is_none() {
            config.seed = Some(random_seed());
        }

        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        let gl = canvas
            .get_context("webgl2")?
            .ok_or("failed to get WebGL2 context")?
            .dyn_into::<WebGl2RenderingContext>()?;

        let mut scene = Scene::new(&config).map_err(to_js)?;
        if let Some(window) = web_sys::window() {
            scene.set_pixel_ratio(window.device_pixel_ratio() as f32);
        }

        let mut pipeline = RenderPipeline::new(gl, width, height, &config.render).map_err(to_js)?;
        pipeline.upload_scene(&scene).map_err(to_js)?;

        Ok(Self {
            pipeline,
            scene,
            camera: OrbitCamera::default(),
        })
    }

    /// Advance by `dt` seconds and draw a frame
    pub fn render(&mut self, dt: f32) {
        self.scene.update(dt);
        self.pipeline.render(&self.scene, &self.camera);
    }

    /// Flip between chaos and tree; returns true when now assembled
    pub fn toggle(&mut self) -> bool {
        self.scene.toggle().is_assembled()
    }

    pub fn set_assembled(&mut self, assembled: bool) {
        self.scene.set_state(TreeState::from(assembled));
    }

    /// Jump to a state without animating
    pub fn snap(&mut self, assembled: bool) {
        self.scene.snap_to(TreeState::from(assembled));
    }

    pub fn is_assembled(&self) -> bool {
        self.scene.state().is_assembled()
    }

    /// Mean transition progress, 0 (chaos) to 1 (tree)
    pub fn progress(&self) -> f32 {
        self.scene.progress()
    }

    pub fn resize(&mut self, width: i32, height: i32) -> std::result::Result<(), JsValue> {
        self.pipeline.resize(width, height).map_err(to_js)
    }

    /// Device pixel ratio, clamped for the foliage point size
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.scene.set_pixel_ratio(ratio);
    }

    /// Orbit the camera by a drag of `(delta_x, delta_y)` pixels
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.camera.orbit(delta_x, delta_y);
    }

    /// Zoom the camera; positive moves away
    pub fn zoom(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }
}
