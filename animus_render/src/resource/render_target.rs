/// Off-screen render target: one color texture, an optional depth buffer and
/// the framebuffer binding them.
///
/// A target is created in a pass's `prepare`, rebuilt in full on `resize`
/// (old objects destroyed first) and released with `destroy`.

use crate::error::{Error, Result};
use crate::graphics_device::{
    DepthBuffer, FramebufferHandle, GraphicsDevice, Texture, TextureDesc, TextureFormat,
};
use crate::{engine_bail, engine_debug, engine_err};

const SOURCE: &str = "animus::RenderTarget";

/// GPU objects owned by a live target
#[derive(Debug, Clone, Copy)]
struct TargetObjects {
    color: Texture,
    depth: Option<DepthBuffer>,
    framebuffer: FramebufferHandle,
}

/// Color (+ optional depth) destination a pass renders into
#[derive(Debug)]
pub struct RenderTarget {
    label: String,
    width: u32,
    height: u32,
    format: TextureFormat,
    wants_depth: bool,
    objects: Option<TargetObjects>,
}

impl RenderTarget {
    /// Allocate a target of `width` x `height`
    ///
    /// # Errors
    ///
    /// `DeviceResourceError` when the device refuses any of the objects.
    /// Nothing is leaked on failure.
    pub fn create(
        device: &mut dyn GraphicsDevice,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        wants_depth: bool,
    ) -> Result<Self> {
        let objects = Self::allocate(device, label, width, height, format, wants_depth)?;
        Ok(Self {
            label: label.to_string(),
            width,
            height,
            format,
            wants_depth,
            objects: Some(objects),
        })
    }

    /// Assemble a target from already created attachments
    ///
    /// # Errors
    ///
    /// `InvalidResource` when the depth buffer does not match the color
    /// texture's dimensions. The attachments stay owned by the caller in
    /// that case.
    pub fn from_attachments(
        device: &mut dyn GraphicsDevice,
        label: &str,
        color: Texture,
        depth: Option<DepthBuffer>,
    ) -> Result<Self> {
        Self::validate_attachments(&color, depth.as_ref())?;
        let framebuffer = device.create_framebuffer(&color, depth.as_ref())?;
        Ok(Self {
            label: label.to_string(),
            width: color.width,
            height: color.height,
            format: color.format,
            wants_depth: depth.is_some(),
            objects: Some(TargetObjects { color, depth, framebuffer }),
        })
    }

    /// Depth attachments must match the color attachment's extent
    pub fn validate_attachments(color: &Texture, depth: Option<&DepthBuffer>) -> Result<()> {
        if let Some(depth) = depth {
            if (depth.width, depth.height) != color.extent() {
                engine_bail!(SOURCE, Error::InvalidResource(format!(
                    "depth buffer {}x{} does not match color texture {}x{}",
                    depth.width, depth.height, color.width, color.height)));
            }
        }
        Ok(())
    }

    fn allocate(
        device: &mut dyn GraphicsDevice,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        wants_depth: bool,
    ) -> Result<TargetObjects> {
        let color = device
            .create_texture(&TextureDesc { width, height, format, mip_level: 0 })
            .map_err(|e| engine_err!(SOURCE, e.context(&format!("'{}' color texture", label))))?;

        let depth = if wants_depth {
            match device.create_depth_buffer(width, height) {
                Ok(depth) => Some(depth),
                Err(e) => {
                    device.destroy_texture(color.handle);
                    return Err(engine_err!(SOURCE, e.context(&format!("'{}' depth buffer", label))));
                }
            }
        } else {
            None
        };

        let framebuffer = match device.create_framebuffer(&color, depth.as_ref()) {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                if let Some(depth) = depth {
                    device.destroy_depth_buffer(depth.handle);
                }
                device.destroy_texture(color.handle);
                return Err(engine_err!(SOURCE, e.context(&format!("'{}' framebuffer", label))));
            }
        };

        engine_debug!(SOURCE, "'{}' allocated {}x{} ({:?}{})",
            label, width, height, format, if wants_depth { " + depth" } else { "" });

        Ok(TargetObjects { color, depth, framebuffer })
    }

    /// Destroy and recreate every attachment at the new size.
    ///
    /// Pixel contents are not preserved. If reallocation fails the target is
    /// left destroyed and the error is returned.
    pub fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        self.destroy(device);
        self.width = width;
        self.height = height;
        let objects = Self::allocate(device, &self.label, width, height, self.format, self.wants_depth)?;
        self.objects = Some(objects);
        Ok(())
    }

    /// Release all owned GPU objects. Idempotent.
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(objects) = self.objects.take() {
            device.destroy_framebuffer(objects.framebuffer);
            if let Some(depth) = objects.depth {
                device.destroy_depth_buffer(depth.handle);
            }
            device.destroy_texture(objects.color.handle);
            engine_debug!(SOURCE, "'{}' destroyed", self.label);
        }
    }

    /// Current color texture
    ///
    /// # Errors
    ///
    /// `UsageError` after `destroy` (or after a failed `resize`).
    pub fn color_texture(&self) -> Result<Texture> {
        match &self.objects {
            Some(objects) => Ok(objects.color),
            None => Err(Error::UsageError(format!(
                "render target '{}' has no color texture (destroyed)", self.label))),
        }
    }

    pub fn framebuffer(&self) -> Result<FramebufferHandle> {
        match &self.objects {
            Some(objects) => Ok(objects.framebuffer),
            None => Err(Error::UsageError(format!(
                "render target '{}' has no framebuffer (destroyed)", self.label))),
        }
    }

    pub fn depth_buffer(&self) -> Option<DepthBuffer> {
        self.objects.as_ref().and_then(|objects| objects.depth)
    }

    pub fn is_live(&self) -> bool {
        self.objects.is_some()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn has_depth(&self) -> bool {
        self.wants_depth
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
