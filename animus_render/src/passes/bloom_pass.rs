/// Bloom pass.
///
/// Reads a texture published by an earlier pass, downsamples it through a
/// chain of half-resolution levels, adds the levels back up with additive
/// blending, then composites level 0 into the pass's own target, which the
/// graph publishes under the pass name.

use glam::Vec2;

use crate::error::{Error, Result};
use crate::graphics_device::{
    BlendEquation, BlendFactor, GraphicsDevice, Texture, TextureFormat, UniformValue, Viewport,
};
use crate::gui::{Control, Parameter};
use crate::render_graph::{control_prefix, PrepareContext, RenderConfig, RenderContext, RenderPass};
use crate::resource::{asset_keys, Asset, GeometryArena, MipChain, RenderTarget};
use crate::{engine_bail, engine_debug, engine_info};

const SOURCE: &str = "animus::BloomPass";

/// Default pass name, also the result cache key of the bloom output
pub const BLOOM_PASS_NAME: &str = "BloomPass";

/// Upper bound of the `MipCount` control
pub const MAX_MIP_COUNT: usize = 16;

const BLOOM_FORMAT: TextureFormat = TextureFormat::R32G32B32A32_SFLOAT;

#[derive(Debug, Clone, PartialEq)]
pub struct BloomSettings {
    /// Result cache key of the texture to bloom
    pub source: String,
    pub mip_count: usize,
    /// Upsample kernel spread in texture coordinates
    pub filter_radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            source: "Scene".to_string(),
            mip_count: 5,
            filter_radius: 0.001,
        }
    }
}

pub struct BloomPass {
    name: String,
    source: String,
    filter_radius: Parameter,
    mip_count: Parameter,
    config: RenderConfig,
    target: Option<RenderTarget>,
    chain: Option<MipChain>,
    downsample: Option<Asset>,
    upsample: Option<Asset>,
    composite: Option<Asset>,
}

/// Everything `render` needs, borrowed once prepared
struct Stages<'p> {
    downsample: &'p Asset,
    upsample: &'p Asset,
    composite: &'p Asset,
    chain: &'p MipChain,
    target: &'p RenderTarget,
    fatal_incomplete: bool,
}

impl BloomPass {
    pub fn new(settings: BloomSettings) -> Self {
        Self::with_name(BLOOM_PASS_NAME, settings)
    }

    pub fn with_name(name: &str, settings: BloomSettings) -> Self {
        let mip_count = settings.mip_count.clamp(1, MAX_MIP_COUNT);
        Self {
            name: name.to_string(),
            source: settings.source,
            filter_radius: Parameter::new(settings.filter_radius, 0.0, 0.05, 0.0005),
            mip_count: Parameter::new(mip_count as f32, 1.0, MAX_MIP_COUNT as f32, 1.0),
            config: RenderConfig {
                depth_test: false,
                clear_color_bit: true,
                clear_depth_bit: false,
                publish_result: true,
            },
            target: None,
            chain: None,
            downsample: None,
            upsample: None,
            composite: None,
        }
    }

    /// Result cache key this pass reads
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn filter_radius(&self) -> &Parameter {
        &self.filter_radius
    }

    /// Level count the next frame will render with
    pub fn mip_count(&self) -> usize {
        (self.mip_count.get().round() as usize).max(1)
    }

    /// Dimensions of the current chain, empty before `prepare`
    pub fn mip_extents(&self) -> Vec<(u32, u32)> {
        self.chain.as_ref().map(|chain| chain.extents()).unwrap_or_default()
    }

    /// Change the level count, rebuilding the chain if it exists
    ///
    /// # Errors
    ///
    /// `InvalidResource` for `count == 0`; device errors from the rebuild.
    pub fn set_mip_count(&mut self, device: &mut dyn GraphicsDevice, count: usize) -> Result<()> {
        if count == 0 {
            engine_bail!(SOURCE, Error::InvalidResource(
                "bloom needs at least one mip level".to_string()));
        }
        self.mip_count.set(count as f32);
        self.sync_mip_count(device)
    }

    /// Rebuild the chain when the `MipCount` control moved
    fn sync_mip_count(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let wanted = self.mip_count();
        let (Some(chain), Some(target)) = (self.chain.as_mut(), self.target.as_ref()) else {
            return Ok(());
        };
        if chain.len() != wanted {
            chain.rebuild(device, target.width(), target.height(), wanted)?;
            engine_info!(SOURCE, "'{}' mip count now {}", self.name, wanted);
        }
        Ok(())
    }

    fn stages(&self, fatal_incomplete: bool) -> Result<Stages<'_>> {
        match (&self.downsample, &self.upsample, &self.composite, &self.chain, &self.target) {
            (Some(downsample), Some(upsample), Some(composite), Some(chain), Some(target)) => {
                Ok(Stages { downsample, upsample, composite, chain, target, fatal_incomplete })
            }
            _ => Err(Error::UsageError(format!("'{}' rendered before prepare", self.name))),
        }
    }
}

impl Stages<'_> {
    /// Level i samples level i-1 (level 0 samples `source`)
    fn downsample(
        &self,
        device: &mut dyn GraphicsDevice,
        arena: &GeometryArena,
        source: Texture,
    ) -> Result<()> {
        device.use_program(Some(self.downsample.program))?;
        let mut input = source;
        for level in 0..self.chain.len() {
            let mip = self.chain.bind_level(device, level, self.fatal_incomplete)?;
            device.bind_texture(0, Some(&input))?;
            device.set_uniform("srcResolution",
                UniformValue::Vec2(Vec2::new(mip.width as f32, mip.height as f32)))?;
            self.downsample.drawable.draw(device, arena)?;
            input = mip;
        }
        Ok(())
    }

    /// Level i is added onto level i-1, from the smallest level up
    fn upsample(
        &self,
        device: &mut dyn GraphicsDevice,
        arena: &GeometryArena,
        filter_radius: f32,
    ) -> Result<()> {
        device.use_program(Some(self.upsample.program))?;
        device.set_uniform("filterRadius", UniformValue::Float(filter_radius))?;

        device.set_blending(true);
        device.set_blend_func(BlendFactor::One, BlendFactor::One);
        device.set_blend_equation(BlendEquation::Add);
        let drawn = self.upsample_levels(device, arena);
        device.set_blending(false);
        drawn
    }

    fn upsample_levels(&self, device: &mut dyn GraphicsDevice, arena: &GeometryArena) -> Result<()> {
        for level in (1..self.chain.len()).rev() {
            let Some(input) = self.chain.mip(level).copied() else {
                continue;
            };
            device.bind_texture(0, Some(&input))?;
            self.chain.bind_level(device, level - 1, self.fatal_incomplete)?;
            self.upsample.drawable.draw(device, arena)?;
        }
        Ok(())
    }

    /// Level 0 into the pass target at screen size
    fn composite(
        &self,
        device: &mut dyn GraphicsDevice,
        arena: &GeometryArena,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let Some(blurred) = self.chain.mip(0).copied() else {
            return Err(Error::UsageError("bloom mip chain is empty".to_string()));
        };
        device.bind_framebuffer(Some(self.target.framebuffer()?))?;
        device.set_viewport(Viewport::sized(width, height));
        device.use_program(Some(self.composite.program))?;
        device.bind_texture(0, Some(&blurred))?;
        self.composite.drawable.draw(device, arena)?;
        device.bind_texture(0, None)?;
        device.use_program(None)
    }
}

impl RenderPass for BloomPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_config(&self) -> RenderConfig {
        self.config
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        let downsample = ctx.assets.resolve(asset_keys::MAT_DOWNSAMPLE, ctx.device, ctx.arena)?;
        let upsample = ctx.assets.resolve(asset_keys::MAT_UPSAMPLE, ctx.device, ctx.arena)?;
        let composite = ctx.assets.resolve(asset_keys::MAT_BLOOM_COMPOSITE, ctx.device, ctx.arena)?;

        // Every stage samples unit 0
        for program in [downsample.program, upsample.program, composite.program] {
            ctx.device.use_program(Some(program))?;
            ctx.device.set_uniform("srcTexture", UniformValue::Int(0))?;
        }
        ctx.device.use_program(None)?;

        self.target = Some(RenderTarget::create(
            ctx.device, &self.name, ctx.width, ctx.height, BLOOM_FORMAT, false)?);
        self.chain = Some(MipChain::create(
            ctx.device, ctx.width, ctx.height, self.mip_count(), BLOOM_FORMAT)?);
        self.downsample = Some(downsample);
        self.upsample = Some(upsample);
        self.composite = Some(composite);

        let prefix = control_prefix(&self.name);
        ctx.controls.register(Control {
            label: format!("{}FilterRadius", prefix),
            value: self.filter_radius.clone(),
        });
        ctx.controls.register(Control {
            label: format!("{}MipCount", prefix),
            value: self.mip_count.clone(),
        });

        engine_debug!(SOURCE, "'{}' prepared from '{}' with {} levels {:?}",
            self.name, self.source, self.mip_count(), self.mip_extents());
        Ok(())
    }

    fn render(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let source = ctx.results.get(&self.source)?;
        self.sync_mip_count(ctx.device)?;
        let filter_radius = self.filter_radius.get();
        let stages = self.stages(ctx.fatal_incomplete_framebuffers)?;

        ctx.device.bind_framebuffer(Some(stages.chain.framebuffer()?))?;
        stages.downsample(ctx.device, ctx.arena, source)?;
        stages.upsample(ctx.device, ctx.arena, filter_radius)?;
        stages.composite(ctx.device, ctx.arena, ctx.width, ctx.height)
    }

    fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        if let Some(target) = self.target.as_mut() {
            target.resize(device, width, height)?;
        }
        if let Some(chain) = self.chain.as_mut() {
            chain.resize(device, width, height)?;
        }
        engine_debug!(SOURCE, "'{}' resized to {}x{} {:?}",
            self.name, width, height, self.mip_extents());
        Ok(())
    }

    fn render_target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    fn dispose(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(mut chain) = self.chain.take() {
            chain.destroy(device);
        }
        if let Some(mut target) = self.target.take() {
            target.destroy(device);
        }
        // Programs belong to the asset source
        self.downsample = None;
        self.upsample = None;
        self.composite = None;
    }
}

#[cfg(test)]
#[path = "bloom_pass_tests.rs"]
mod tests;
