/// Passes module - the concrete stages of the pipeline

pub mod scene_pass;
pub mod bloom_pass;
pub mod screen_pass;

pub use scene_pass::{default_objects, MoveKeys, SceneObject, ScenePass, SCENE_PASS_NAME};
pub use bloom_pass::{BloomPass, BloomSettings, BLOOM_PASS_NAME, MAX_MIP_COUNT};
pub use screen_pass::{ScreenPass, SCREEN_PASS_NAME, SCREEN_TINT};
