/// Screen pass: tone-maps the scene (plus bloom, when configured) onto the
/// default framebuffer.

use glam::Vec3;

use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, UniformValue};
use crate::gui::{Control, Parameter};
use crate::render_graph::{control_prefix, PrepareContext, RenderConfig, RenderContext, RenderPass};
use crate::resource::{asset_keys, Asset, RenderTarget};

pub const SCREEN_PASS_NAME: &str = "Screen";

/// Tint multiplied into the tone-mapped color
pub const SCREEN_TINT: Vec3 = Vec3::new(1.0, 0.2, 1.0);

pub struct ScreenPass {
    name: String,
    scene_source: String,
    bloom_source: Option<String>,
    exposure: Parameter,
    config: RenderConfig,
    hdr: Option<Asset>,
}

impl ScreenPass {
    /// Composite of the `"Scene"` result only
    pub fn new() -> Self {
        Self {
            name: SCREEN_PASS_NAME.to_string(),
            scene_source: "Scene".to_string(),
            bloom_source: None,
            exposure: Parameter::new(0.8, 0.0, 50.0, 0.1),
            config: RenderConfig {
                depth_test: false,
                clear_color_bit: true,
                clear_depth_bit: true,
                publish_result: false,
            },
            hdr: None,
        }
    }

    /// Read the scene from `source` instead of `"Scene"`
    pub fn with_scene_source(mut self, source: &str) -> Self {
        self.scene_source = source.to_string();
        self
    }

    /// Also sample the result published under `source` on unit 1
    pub fn with_bloom(mut self, source: &str) -> Self {
        self.bloom_source = Some(source.to_string());
        self
    }

    pub fn exposure(&self) -> &Parameter {
        &self.exposure
    }

    pub fn bloom_source(&self) -> Option<&str> {
        self.bloom_source.as_deref()
    }
}

impl Default for ScreenPass {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPass for ScreenPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_config(&self) -> RenderConfig {
        self.config
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        self.hdr = Some(ctx.assets.resolve(asset_keys::MAT_HDR, ctx.device, ctx.arena)?);
        ctx.controls.register(Control {
            label: format!("{}Exposure", control_prefix(&self.name)),
            value: self.exposure.clone(),
        });
        Ok(())
    }

    fn render(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let Some(hdr) = self.hdr.as_ref() else {
            return Err(Error::UsageError(format!("'{}' rendered before prepare", self.name)));
        };
        let scene = ctx.results.get(&self.scene_source)?;
        let bloom = match &self.bloom_source {
            Some(source) => Some(ctx.results.get(source)?),
            None => None,
        };

        ctx.device.use_program(Some(hdr.program))?;
        ctx.device.bind_texture(0, Some(&scene))?;
        ctx.device.set_uniform("tex", UniformValue::Int(0))?;
        if let Some(bloom) = bloom {
            ctx.device.bind_texture(1, Some(&bloom))?;
            ctx.device.set_uniform("bloomTex", UniformValue::Int(1))?;
        }
        ctx.device.set_uniform("Color", UniformValue::Vec3(SCREEN_TINT))?;
        ctx.device.set_uniform("Exposure", UniformValue::Float(self.exposure.get()))?;
        hdr.drawable.draw(ctx.device, ctx.arena)?;

        ctx.device.bind_texture(0, None)?;
        if bloom.is_some() {
            ctx.device.bind_texture(1, None)?;
        }
        ctx.device.use_program(None)
    }

    /// Nothing here depends on the screen size
    fn resize(&mut self, _device: &mut dyn GraphicsDevice, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    fn render_target(&self) -> Option<&RenderTarget> {
        None
    }

    fn dispose(&mut self, _device: &mut dyn GraphicsDevice) {
        self.hdr = None;
    }
}

#[cfg(test)]
#[path = "screen_pass_tests.rs"]
mod tests;
