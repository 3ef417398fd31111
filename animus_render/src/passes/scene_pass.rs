/// Scene pass.
///
/// Draws a list of objects into an off-screen RGBA8 target with depth and
/// publishes it. WASD/QE move a pass-local offset applied on top of the
/// frame camera.

use bitflags::bitflags;
use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, TextureFormat, UniformValue};
use crate::gui::{Control, Parameter};
use crate::render_graph::{
    control_prefix, InputEvent, PrepareContext, RenderConfig, RenderContext, RenderPass,
};
use crate::resource::{asset_keys, Asset, Material, RenderTarget};
use crate::engine_debug;

const SOURCE: &str = "animus::ScenePass";

pub const SCENE_PASS_NAME: &str = "Scene";

/// One object to draw
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub asset_key: String,
    pub model: Mat4,
}

impl SceneObject {
    pub fn new(asset_key: &str, model: Mat4) -> Self {
        Self { asset_key: asset_key.to_string(), model }
    }

    pub fn at(asset_key: &str, translation: Vec3) -> Self {
        Self::new(asset_key, Mat4::from_translation(translation))
    }
}

/// Two lit cubes either side of the origin
pub fn default_objects() -> Vec<SceneObject> {
    vec![
        SceneObject::at(asset_keys::MAT_BASIC, Vec3::new(-1.0, 0.0, 0.0)),
        SceneObject::at(asset_keys::MAT_BASIC, Vec3::new(1.0, 0.0, 0.0)),
    ]
}

bitflags! {
    /// Movement keys currently held
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveKeys: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
    }
}

impl MoveKeys {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyW => Some(MoveKeys::FORWARD),
            KeyCode::KeyS => Some(MoveKeys::BACKWARD),
            KeyCode::KeyA => Some(MoveKeys::LEFT),
            KeyCode::KeyD => Some(MoveKeys::RIGHT),
            KeyCode::KeyQ => Some(MoveKeys::UP),
            KeyCode::KeyE => Some(MoveKeys::DOWN),
            _ => None,
        }
    }

    /// Unnormalized direction in camera space (forward is -Z)
    pub fn direction(self) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if self.contains(MoveKeys::FORWARD) { dir.z -= 1.0; }
        if self.contains(MoveKeys::BACKWARD) { dir.z += 1.0; }
        if self.contains(MoveKeys::LEFT) { dir.x -= 1.0; }
        if self.contains(MoveKeys::RIGHT) { dir.x += 1.0; }
        if self.contains(MoveKeys::UP) { dir.y += 1.0; }
        if self.contains(MoveKeys::DOWN) { dir.y -= 1.0; }
        dir
    }
}

struct Drawn {
    asset: Asset,
    material: Material,
    model: Mat4,
}

pub struct ScenePass {
    name: String,
    objects: Vec<SceneObject>,
    drawn: Vec<Drawn>,
    target: Option<RenderTarget>,
    config: RenderConfig,
    held: MoveKeys,
    offset: Vec3,
    speed: Parameter,
}

impl ScenePass {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self::with_name(SCENE_PASS_NAME, objects)
    }

    pub fn with_name(name: &str, objects: Vec<SceneObject>) -> Self {
        Self {
            name: name.to_string(),
            objects,
            drawn: Vec::new(),
            target: None,
            config: RenderConfig::default().published(),
            held: MoveKeys::empty(),
            offset: Vec3::ZERO,
            speed: Parameter::new(2.5, 0.0, 20.0, 0.1),
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Accumulated movement applied to the frame camera
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn held_keys(&self) -> MoveKeys {
        self.held
    }

    /// Movement speed in units per second
    pub fn speed(&self) -> &Parameter {
        &self.speed
    }

    /// Frame camera moved by the pass-local offset
    pub fn view_camera(&self, camera: &Camera) -> Camera {
        camera.translated(self.offset)
    }

    fn advance(&mut self, dt: f32) {
        let dir = self.held.direction();
        if dir != Vec3::ZERO {
            self.offset += dir.normalize() * self.speed.get() * dt;
        }
    }
}

impl Default for ScenePass {
    fn default() -> Self {
        Self::new(default_objects())
    }
}

impl RenderPass for ScenePass {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_config(&self) -> RenderConfig {
        self.config
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        let mut drawn = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            let asset = ctx.assets.resolve(&object.asset_key, ctx.device, ctx.arena)?;
            let material = Material::physical(&object.asset_key, asset.program);
            drawn.push(Drawn { asset, material, model: object.model });
        }

        self.target = Some(RenderTarget::create(
            ctx.device, &self.name, ctx.width, ctx.height, TextureFormat::R8G8B8A8_UNORM, true)?);
        self.drawn = drawn;

        ctx.controls.register(Control {
            label: format!("{}CameraSpeed", control_prefix(&self.name)),
            value: self.speed.clone(),
        });
        engine_debug!(SOURCE, "'{}' prepared with {} objects", self.name, self.drawn.len());
        Ok(())
    }

    fn render(&mut self, ctx: &mut RenderContext) -> Result<()> {
        if self.target.is_none() {
            return Err(Error::UsageError(format!("'{}' rendered before prepare", self.name)));
        }
        let camera = self.view_camera(ctx.camera);
        for drawn in &self.drawn {
            drawn.material.apply(ctx.device)?;
            ctx.device.set_uniform("model", UniformValue::Mat4(drawn.model))?;
            ctx.device.set_uniform("view", UniformValue::Mat4(*camera.view_matrix()))?;
            ctx.device.set_uniform("projection", UniformValue::Mat4(*camera.projection_matrix()))?;
            ctx.device.set_uniform("camera.Position", UniformValue::Vec3(camera.position()))?;
            drawn.asset.drawable.draw(ctx.device, ctx.arena)?;
        }
        ctx.device.use_program(None)
    }

    fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        match self.target.as_mut() {
            Some(target) => target.resize(device, width, height),
            None => Ok(()),
        }
    }

    fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Key { code, pressed } => {
                if let Some(key) = MoveKeys::from_key(code) {
                    self.held.set(key, pressed);
                }
            }
            InputEvent::Tick { dt } => self.advance(dt),
        }
    }

    fn render_target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    fn dispose(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(mut target) = self.target.take() {
            target.destroy(device);
        }
        self.drawn.clear();
    }
}

#[cfg(test)]
#[path = "scene_pass_tests.rs"]
mod tests;
