//! Browser-side checks of the exported surface (`wasm-pack test --headless`)

use wasm_bindgen_test::*;

use grand_tree::populations::Population;
use grand_tree::{Scene, SceneConfig};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_default_config_template_parses() {
    let yaml = grand_tree::default_config().unwrap();
    assert_eq!(SceneConfig::from_yaml(&yaml).unwrap(), SceneConfig::default());
}

#[wasm_bindgen_test]
fn test_scene_builds_with_default_counts() {
    let scene = Scene::new(&SceneConfig::default()).unwrap();
    let total: usize = scene.populations().iter().map(|p| p.len()).sum();
    assert_eq!(total, 15_000 + 80 + 300 + 400 + 1);
}
