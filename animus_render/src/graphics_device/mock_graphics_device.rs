/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Every call is recorded as a `DeviceCall`. Live objects are tracked in
/// slot maps so tests can check for leaks, use-after-destroy and double
/// destroys. Clones share the same state: hand one clone to the code under
/// test and keep another to inspect it.

use std::sync::{Arc, Mutex, MutexGuard};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::engine_bail;
use crate::graphics_device::{
    BlendEquation, BlendFactor, BufferDesc, BufferHandle, BufferRegion, BufferUsage,
    ClearFlags, DepthBuffer, DepthBufferHandle, FramebufferHandle, FramebufferStatus,
    GraphicsDevice, ProgramDesc, ProgramHandle, Texture, TextureDesc, TextureHandle,
    UniformValue, Viewport,
};

// ============================================================================
// Recorded calls
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateTexture { handle: TextureHandle, width: u32, height: u32, mip_level: u32 },
    DestroyTexture(TextureHandle),
    CreateDepthBuffer { handle: DepthBufferHandle, width: u32, height: u32 },
    DestroyDepthBuffer(DepthBufferHandle),
    CreateFramebuffer(FramebufferHandle),
    DestroyFramebuffer(FramebufferHandle),
    BindFramebuffer(Option<FramebufferHandle>),
    SetColorAttachment { framebuffer: FramebufferHandle, texture: TextureHandle },
    SetViewport(Viewport),
    SetDepthTest(bool),
    SetClearColor([f32; 4]),
    Clear(ClearFlags),
    SetBlending(bool),
    SetBlendFunc(BlendFactor, BlendFactor),
    SetBlendEquation(BlendEquation),
    CreateProgram(String),
    DestroyProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    SetUniform { name: String, value: UniformValue },
    BindTexture { unit: u32, texture: Option<TextureHandle> },
    CreateBuffer { handle: BufferHandle, usage: BufferUsage, size: u64 },
    WriteBuffer { buffer: BufferHandle, offset: u64, len: u64 },
    DestroyBuffer(BufferHandle),
    DrawFullscreenQuad,
    DrawArrays { vertex_count: u32 },
    DrawIndexed { index_count: u32 },
}

// ============================================================================
// Device state
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MockFramebuffer {
    pub color: TextureHandle,
    pub depth: Option<DepthBufferHandle>,
}

#[derive(Default)]
pub struct MockDeviceState {
    pub calls: Vec<DeviceCall>,
    pub textures: SlotMap<TextureHandle, TextureDesc>,
    pub depth_buffers: SlotMap<DepthBufferHandle, (u32, u32)>,
    pub framebuffers: SlotMap<FramebufferHandle, MockFramebuffer>,
    pub programs: SlotMap<ProgramHandle, String>,
    pub buffers: SlotMap<BufferHandle, Vec<u8>>,
    /// Use-after-destroy and double-destroy reports
    pub violations: Vec<String>,
    /// Remaining successful allocations (None = unlimited)
    pub allocation_budget: Option<usize>,
    /// Lift the budget again after the first refusal
    pub single_failure: bool,
    /// Report every bound framebuffer as incomplete
    pub incomplete_framebuffers: bool,
    pub bound_framebuffer: Option<FramebufferHandle>,
    pub current_program: Option<ProgramHandle>,
    pub blending: bool,
    pub depth_test: bool,
    pub viewport: Option<Viewport>,
}

impl MockDeviceState {
    fn take_allocation(&mut self, what: &str) -> Result<()> {
        match self.allocation_budget.as_mut() {
            Some(0) => {
                if self.single_failure {
                    self.allocation_budget = None;
                    self.single_failure = false;
                }
                engine_bail!("animus::mock", Error::DeviceResourceError(
                    format!("{} refused: allocation budget exhausted", what)));
            }
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn region_in_bounds(&self, buffer: BufferHandle, region: BufferRegion) -> bool {
        self.buffers
            .get(buffer)
            .is_some_and(|storage| region.end() <= storage.len() as u64)
    }

    fn violation(&mut self, message: String) -> Error {
        self.violations.push(message.clone());
        Error::InvalidResource(message)
    }
}

// ============================================================================
// Mock device
// ============================================================================

#[derive(Clone, Default)]
pub struct MockGraphicsDevice {
    state: Arc<Mutex<MockDeviceState>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockDeviceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Let `count` more allocations succeed, then refuse every later one
    pub fn fail_allocations_after(&self, count: usize) {
        let mut state = self.state();
        state.allocation_budget = Some(count);
        state.single_failure = false;
    }

    /// Let `count` more allocations succeed, refuse the next one, then
    /// allocate normally again
    pub fn fail_one_allocation_after(&self, count: usize) {
        let mut state = self.state();
        state.allocation_budget = Some(count);
        state.single_failure = true;
    }

    pub fn set_incomplete_framebuffers(&self, incomplete: bool) {
        self.state().incomplete_framebuffers = incomplete;
    }

    pub fn live_texture_count(&self) -> usize {
        self.state().textures.len()
    }

    pub fn live_depth_buffer_count(&self) -> usize {
        self.state().depth_buffers.len()
    }

    pub fn live_framebuffer_count(&self) -> usize {
        self.state().framebuffers.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.state().programs.len()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.state().buffers.len()
    }

    pub fn is_texture_live(&self, handle: TextureHandle) -> bool {
        self.state().textures.contains_key(handle)
    }

    /// Extents of every live texture, sorted
    pub fn live_texture_extents(&self) -> Vec<(u32, u32)> {
        let mut extents: Vec<(u32, u32)> = self
            .state()
            .textures
            .values()
            .map(|desc| (desc.width, desc.height))
            .collect();
        extents.sort_unstable();
        extents
    }

    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        self.state().buffers.get(handle).cloned()
    }

    pub fn violations(&self) -> Vec<String> {
        self.state().violations.clone()
    }

    pub fn blending_enabled(&self) -> bool {
        self.state().blending
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferHandle> {
        self.state().bound_framebuffer
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Texture> {
        let mut state = self.state();
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("animus::mock", Error::DeviceResourceError(
                format!("texture {}x{} has a zero extent", desc.width, desc.height)));
        }
        state.take_allocation("texture")?;
        let handle = state.textures.insert(*desc);
        state.calls.push(DeviceCall::CreateTexture {
            handle,
            width: desc.width,
            height: desc.height,
            mip_level: desc.mip_level,
        });
        Ok(Texture {
            handle,
            width: desc.width,
            height: desc.height,
            format: desc.format,
            mip_level: desc.mip_level,
        })
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        let mut state = self.state();
        if state.textures.remove(texture).is_none() {
            state.violation(format!("texture {:?} destroyed twice", texture));
        }
        state.calls.push(DeviceCall::DestroyTexture(texture));
    }

    fn create_depth_buffer(&mut self, width: u32, height: u32) -> Result<DepthBuffer> {
        let mut state = self.state();
        if width == 0 || height == 0 {
            engine_bail!("animus::mock", Error::DeviceResourceError(
                format!("depth buffer {}x{} has a zero extent", width, height)));
        }
        state.take_allocation("depth buffer")?;
        let handle = state.depth_buffers.insert((width, height));
        state.calls.push(DeviceCall::CreateDepthBuffer { handle, width, height });
        Ok(DepthBuffer { handle, width, height })
    }

    fn destroy_depth_buffer(&mut self, depth: DepthBufferHandle) {
        let mut state = self.state();
        if state.depth_buffers.remove(depth).is_none() {
            state.violation(format!("depth buffer {:?} destroyed twice", depth));
        }
        state.calls.push(DeviceCall::DestroyDepthBuffer(depth));
    }

    fn create_framebuffer(
        &mut self,
        color: &Texture,
        depth: Option<&DepthBuffer>,
    ) -> Result<FramebufferHandle> {
        let mut state = self.state();
        if !state.textures.contains_key(color.handle) {
            return Err(state.violation(format!(
                "framebuffer created with dead color texture {:?}", color.handle)));
        }
        if let Some(depth) = depth {
            if !state.depth_buffers.contains_key(depth.handle) {
                return Err(state.violation(format!(
                    "framebuffer created with dead depth buffer {:?}", depth.handle)));
            }
        }
        state.take_allocation("framebuffer")?;
        let handle = state.framebuffers.insert(MockFramebuffer {
            color: color.handle,
            depth: depth.map(|d| d.handle),
        });
        state.calls.push(DeviceCall::CreateFramebuffer(handle));
        Ok(handle)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        let mut state = self.state();
        if state.framebuffers.remove(framebuffer).is_none() {
            state.violation(format!("framebuffer {:?} destroyed twice", framebuffer));
        }
        if state.bound_framebuffer == Some(framebuffer) {
            state.bound_framebuffer = None;
        }
        state.calls.push(DeviceCall::DestroyFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> Result<()> {
        let mut state = self.state();
        if let Some(fb) = framebuffer {
            if !state.framebuffers.contains_key(fb) {
                return Err(state.violation(format!("bind of dead framebuffer {:?}", fb)));
            }
        }
        state.bound_framebuffer = framebuffer;
        state.calls.push(DeviceCall::BindFramebuffer(framebuffer));
        Ok(())
    }

    fn set_color_attachment(
        &mut self,
        framebuffer: FramebufferHandle,
        texture: &Texture,
    ) -> Result<()> {
        let mut state = self.state();
        if !state.textures.contains_key(texture.handle) {
            return Err(state.violation(format!(
                "dead texture {:?} attached as color output", texture.handle)));
        }
        if !state.framebuffers.contains_key(framebuffer) {
            return Err(state.violation(format!(
                "color attachment on dead framebuffer {:?}", framebuffer)));
        }
        if let Some(fb) = state.framebuffers.get_mut(framebuffer) {
            fb.color = texture.handle;
        }
        state.calls.push(DeviceCall::SetColorAttachment {
            framebuffer,
            texture: texture.handle,
        });
        Ok(())
    }

    fn framebuffer_status(&self) -> FramebufferStatus {
        let state = self.state();
        let Some(bound) = state.bound_framebuffer else {
            return FramebufferStatus::Complete;
        };
        if state.incomplete_framebuffers {
            return FramebufferStatus::Incomplete("attachment set rejected".to_string());
        }
        let color_live = state
            .framebuffers
            .get(bound)
            .is_some_and(|fb| state.textures.contains_key(fb.color));
        if color_live {
            FramebufferStatus::Complete
        } else {
            FramebufferStatus::Incomplete("missing color attachment".to_string())
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        let mut state = self.state();
        state.viewport = Some(viewport);
        state.calls.push(DeviceCall::SetViewport(viewport));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        let mut state = self.state();
        state.depth_test = enabled;
        state.calls.push(DeviceCall::SetDepthTest(enabled));
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.state().calls.push(DeviceCall::SetClearColor(color));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.state().calls.push(DeviceCall::Clear(flags));
    }

    fn set_blending(&mut self, enabled: bool) {
        let mut state = self.state();
        state.blending = enabled;
        state.calls.push(DeviceCall::SetBlending(enabled));
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state().calls.push(DeviceCall::SetBlendFunc(src, dst));
    }

    fn set_blend_equation(&mut self, equation: BlendEquation) {
        self.state().calls.push(DeviceCall::SetBlendEquation(equation));
    }

    fn create_program(&mut self, desc: &ProgramDesc) -> Result<ProgramHandle> {
        let mut state = self.state();
        if desc.vertex_source.is_empty() || desc.fragment_source.is_empty() {
            engine_bail!("animus::mock", Error::DeviceResourceError(
                format!("program '{}' has an empty stage", desc.name)));
        }
        state.take_allocation("program")?;
        let handle = state.programs.insert(desc.name.clone());
        state.calls.push(DeviceCall::CreateProgram(desc.name.clone()));
        Ok(handle)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        let mut state = self.state();
        if state.programs.remove(program).is_none() {
            state.violation(format!("program {:?} destroyed twice", program));
        }
        if state.current_program == Some(program) {
            state.current_program = None;
        }
        state.calls.push(DeviceCall::DestroyProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<()> {
        let mut state = self.state();
        if let Some(p) = program {
            if !state.programs.contains_key(p) {
                return Err(state.violation(format!("use of dead program {:?}", p)));
            }
        }
        state.current_program = program;
        state.calls.push(DeviceCall::UseProgram(program));
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()> {
        let mut state = self.state();
        if state.current_program.is_none() {
            return Err(Error::UsageError(format!("uniform '{}' set with no program in use", name)));
        }
        state.calls.push(DeviceCall::SetUniform { name: name.to_string(), value });
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<&Texture>) -> Result<()> {
        let mut state = self.state();
        if let Some(tex) = texture {
            if !state.textures.contains_key(tex.handle) {
                return Err(state.violation(format!(
                    "sampling destroyed texture {:?} on unit {}", tex.handle, unit)));
            }
        }
        state.calls.push(DeviceCall::BindTexture { unit, texture: texture.map(|t| t.handle) });
        Ok(())
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<BufferHandle> {
        let mut state = self.state();
        state.take_allocation("buffer")?;
        let handle = state.buffers.insert(vec![0u8; desc.size as usize]);
        state.calls.push(DeviceCall::CreateBuffer { handle, usage: desc.usage, size: desc.size });
        Ok(handle)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        let Some(len) = state.buffers.get(buffer).map(|storage| storage.len()) else {
            return Err(state.violation(format!("write to dead buffer {:?}", buffer)));
        };
        let start = offset as usize;
        let end = start + data.len();
        if end > len {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at {} overflows buffer of {}", data.len(), offset, len)));
        }
        if let Some(storage) = state.buffers.get_mut(buffer) {
            storage[start..end].copy_from_slice(data);
        }
        state.calls.push(DeviceCall::WriteBuffer { buffer, offset, len: data.len() as u64 });
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        let mut state = self.state();
        if state.buffers.remove(buffer).is_none() {
            state.violation(format!("buffer {:?} destroyed twice", buffer));
        }
        state.calls.push(DeviceCall::DestroyBuffer(buffer));
    }

    fn draw_fullscreen_quad(&mut self) -> Result<()> {
        let mut state = self.state();
        if state.current_program.is_none() {
            return Err(Error::UsageError("draw with no program in use".to_string()));
        }
        state.calls.push(DeviceCall::DrawFullscreenQuad);
        Ok(())
    }

    fn draw_arrays(
        &mut self,
        buffer: BufferHandle,
        vertices: BufferRegion,
        vertex_count: u32,
    ) -> Result<()> {
        let mut state = self.state();
        if !state.region_in_bounds(buffer, vertices) {
            return Err(state.violation(format!("draw from invalid buffer {:?}", buffer)));
        }
        state.calls.push(DeviceCall::DrawArrays { vertex_count });
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        vertex_buffer: BufferHandle,
        vertices: BufferRegion,
        index_buffer: BufferHandle,
        indices: BufferRegion,
        index_count: u32,
    ) -> Result<()> {
        let mut state = self.state();
        for (buffer, region) in [(vertex_buffer, vertices), (index_buffer, indices)] {
            if !state.region_in_bounds(buffer, region) {
                return Err(state.violation(format!("draw from invalid buffer {:?}", buffer)));
            }
        }
        state.calls.push(DeviceCall::DrawIndexed { index_count });
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
