/// Progressive half-resolution texture chain used by the bloom pass.
///
/// Level 0 is half the screen size, every further level halves the previous
/// one (floor division, never below 1x1). The chain owns its textures and one
/// framebuffer whose color attachment is switched to the level being drawn.

use crate::error::{Error, Result};
use crate::graphics_device::{
    FramebufferHandle, FramebufferStatus, GraphicsDevice, Texture, TextureDesc, TextureFormat,
    Viewport,
};
use crate::{engine_bail, engine_debug, engine_err, engine_error};

const SOURCE: &str = "animus::MipChain";

/// Dimensions of each level of an `count`-level chain for a `width` x `height` screen
pub fn mip_extents(width: u32, height: u32, count: usize) -> Vec<(u32, u32)> {
    let mut extents = Vec::with_capacity(count);
    let (mut w, mut h) = (width, height);
    for _ in 0..count {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        extents.push((w, h));
    }
    extents
}

#[derive(Debug)]
pub struct MipChain {
    format: TextureFormat,
    mips: Vec<Texture>,
    framebuffer: Option<FramebufferHandle>,
}

impl MipChain {
    /// Build `count` levels for a `width` x `height` screen
    ///
    /// # Errors
    ///
    /// `InvalidResource` for `count == 0`, `DeviceResourceError` when an
    /// allocation is refused (already created levels are released).
    pub fn create(
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        count: usize,
        format: TextureFormat,
    ) -> Result<Self> {
        let mut chain = Self {
            format,
            mips: Vec::with_capacity(count),
            framebuffer: None,
        };
        chain.build(device, width, height, count)?;
        Ok(chain)
    }

    fn build(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        count: usize,
    ) -> Result<()> {
        if count == 0 {
            engine_bail!(SOURCE,
                Error::InvalidResource("mip chain needs at least one level".to_string()));
        }

        for (level, (w, h)) in mip_extents(width, height, count).into_iter().enumerate() {
            let desc = TextureDesc {
                width: w,
                height: h,
                format: self.format,
                mip_level: level as u32,
            };
            match device.create_texture(&desc) {
                Ok(texture) => self.mips.push(texture),
                Err(e) => {
                    self.destroy(device);
                    return Err(engine_err!(SOURCE,
                        e.context(&format!("mip level {} ({}x{})", level, w, h))));
                }
            }
        }

        // The framebuffer starts with level 0 attached
        let first = self.mips[0];
        match device.create_framebuffer(&first, None) {
            Ok(framebuffer) => self.framebuffer = Some(framebuffer),
            Err(e) => {
                self.destroy(device);
                return Err(engine_err!(SOURCE, e.context("mip framebuffer")));
            }
        }

        engine_debug!(SOURCE, "built {} levels from {}x{} ({:?})",
            count, width, height, self.extents());
        Ok(())
    }

    /// Destroy every level and rebuild for the new screen size
    pub fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        let count = self.mips.len().max(1);
        self.rebuild(device, width, height, count)
    }

    /// Destroy every level and rebuild with a new level count
    pub fn rebuild(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        count: usize,
    ) -> Result<()> {
        self.destroy(device);
        self.build(device, width, height, count)
    }

    /// Release the framebuffer and every level. Idempotent.
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(framebuffer) = self.framebuffer.take() {
            device.destroy_framebuffer(framebuffer);
        }
        for mip in self.mips.drain(..) {
            device.destroy_texture(mip.handle);
        }
    }

    /// Attach `level` as the color output and size the viewport to it
    ///
    /// The chain framebuffer must already be bound. An incomplete attachment
    /// is logged; with `fatal_incomplete` it also fails the call.
    pub fn bind_level(
        &self,
        device: &mut dyn GraphicsDevice,
        level: usize,
        fatal_incomplete: bool,
    ) -> Result<Texture> {
        let framebuffer = self.framebuffer()?;
        let Some(mip) = self.mips.get(level).copied() else {
            return Err(Error::UsageError(format!(
                "mip level {} out of range ({} levels)", level, self.mips.len())));
        };
        device.set_viewport(Viewport::sized(mip.width, mip.height));
        device.set_color_attachment(framebuffer, &mip)?;
        if let FramebufferStatus::Incomplete(reason) = device.framebuffer_status() {
            engine_error!(SOURCE, "mip level {} ({}x{}) is incomplete: {}",
                level, mip.width, mip.height, reason);
            if fatal_incomplete {
                return Err(Error::FramebufferIncomplete(format!("mip level {}: {}", level, reason)));
            }
        }
        Ok(mip)
    }

    pub fn framebuffer(&self) -> Result<FramebufferHandle> {
        self.framebuffer.ok_or_else(|| {
            Error::UsageError("mip chain has been destroyed".to_string())
        })
    }

    pub fn mip(&self, level: usize) -> Option<&Texture> {
        self.mips.get(level)
    }

    pub fn mips(&self) -> &[Texture] {
        &self.mips
    }

    pub fn extents(&self) -> Vec<(u32, u32)> {
        self.mips.iter().map(Texture::extent).collect()
    }

    pub fn len(&self) -> usize {
        self.mips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mips.is_empty()
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

#[cfg(test)]
#[path = "mip_chain_tests.rs"]
mod tests;
