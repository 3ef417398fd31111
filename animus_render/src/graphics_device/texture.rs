/// Texture and depth buffer handles, formats and descriptors

use slotmap::new_key_type;

new_key_type! {
    /// Device-side texture object
    pub struct TextureHandle;
    /// Device-side depth renderbuffer
    pub struct DepthBufferHandle;
}

/// Color texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    /// 8-bit normalized RGBA (LDR scene targets, swapchain-like outputs)
    R8G8B8A8_UNORM,
    /// 16-bit float RGBA
    R16G16B16A16_SFLOAT,
    /// 32-bit float RGBA (HDR bloom chain)
    R32G32B32A32_SFLOAT,
}

impl TextureFormat {
    /// Returns size in bytes of one texel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM => 4,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
        }
    }

    /// True for floating point formats
    pub fn is_hdr(&self) -> bool {
        !matches!(self, TextureFormat::R8G8B8A8_UNORM)
    }
}

/// Descriptor for creating an empty texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Position of this texture inside a mip chain (0 for plain targets)
    pub mip_level: u32,
}

/// A created texture.
///
/// The value is a plain description of a device object: copying it does not
/// duplicate the GPU memory. Exactly one owner (a `RenderTarget` or a
/// `MipChain` slot) is responsible for destroying the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mip_level: u32,
}

impl Texture {
    /// (width, height) in pixels
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size in bytes of the texel storage
    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64
    }
}

/// A created depth renderbuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthBuffer {
    pub handle: DepthBufferHandle,
    pub width: u32,
    pub height: u32,
}
