/// GraphicsDevice trait - the immediate-mode GPU capability the pipeline drives
///
/// Backends (WebGL-like, OpenGL, a recording mock) implement this trait.
/// The render graph and its passes own exactly one device reference at a
/// time and issue every call from the frame-loop thread.

use crate::error::Result;
use crate::graphics_device::{
    BlendEquation, BlendFactor, BufferDesc, BufferHandle, BufferRegion, ClearFlags,
    DepthBuffer, DepthBufferHandle, FramebufferHandle, FramebufferStatus, ProgramDesc,
    ProgramHandle, Texture, TextureDesc, TextureHandle, UniformValue, Viewport,
};

/// Immediate-mode graphics device
///
/// Creation calls are fallible and report `DeviceResourceError`. Destroy
/// calls never fail; destroying a handle twice is a caller bug the backend
/// may report but must survive.
pub trait GraphicsDevice {
    // ===== TEXTURES =====

    /// Create an empty texture (no initial pixels)
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Texture>;

    /// Release a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Create a depth renderbuffer
    fn create_depth_buffer(&mut self, width: u32, height: u32) -> Result<DepthBuffer>;

    /// Release a depth renderbuffer
    fn destroy_depth_buffer(&mut self, depth: DepthBufferHandle);

    // ===== FRAMEBUFFERS =====

    /// Create a framebuffer with `color` attached (and `depth` when given)
    fn create_framebuffer(
        &mut self,
        color: &Texture,
        depth: Option<&DepthBuffer>,
    ) -> Result<FramebufferHandle>;

    /// Release a framebuffer (attachments are not destroyed)
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Bind a framebuffer as the draw target, `None` for the default target
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> Result<()>;

    /// Replace the color attachment of a framebuffer
    fn set_color_attachment(
        &mut self,
        framebuffer: FramebufferHandle,
        texture: &Texture,
    ) -> Result<()>;

    /// Completeness of the currently bound framebuffer
    fn framebuffer_status(&self) -> FramebufferStatus;

    // ===== FIXED-FUNCTION STATE =====

    fn set_viewport(&mut self, viewport: Viewport);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_clear_color(&mut self, color: [f32; 4]);

    /// Clear the selected buffers of the bound target
    fn clear(&mut self, flags: ClearFlags);

    fn set_blending(&mut self, enabled: bool);

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    fn set_blend_equation(&mut self, equation: BlendEquation);

    // ===== PROGRAMS =====

    /// Compile and link a shader program
    fn create_program(&mut self, desc: &ProgramDesc) -> Result<ProgramHandle>;

    fn destroy_program(&mut self, program: ProgramHandle);

    /// Make a program current, `None` to release it
    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<()>;

    /// Set a uniform by name on the current program
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()>;

    /// Bind a texture to a sampling unit, `None` to unbind the unit
    fn bind_texture(&mut self, unit: u32, texture: Option<&Texture>) -> Result<()>;

    // ===== BUFFERS =====

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<BufferHandle>;

    /// Upload bytes at `offset` (must fit inside the buffer)
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<()>;

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    // ===== DRAWS =====

    /// Two-triangle draw covering the whole viewport
    fn draw_fullscreen_quad(&mut self) -> Result<()>;

    /// Non-indexed draw of `vertex_count` vertices read from `vertices`
    fn draw_arrays(
        &mut self,
        buffer: BufferHandle,
        vertices: BufferRegion,
        vertex_count: u32,
    ) -> Result<()>;

    /// Indexed draw (u16 indices)
    fn draw_indexed(
        &mut self,
        vertex_buffer: BufferHandle,
        vertices: BufferRegion,
        index_buffer: BufferHandle,
        indices: BufferRegion,
        index_count: u32,
    ) -> Result<()>;
}
