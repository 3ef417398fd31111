/// Render pass contract and the contexts the graph hands to it.
///
/// A pass is one rendering step. It owns at most one render target, may
/// read results published earlier in the same (or a previous) frame, and
/// may publish its own target's color texture under its name.

use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::gui::ControlSink;
use crate::render_graph::render_config::RenderConfig;
use crate::render_graph::result_cache::ResultCache;
use crate::resource::{AssetSource, GeometryArena, RenderTarget};

/// Everything a pass may touch while allocating its resources
pub struct PrepareContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub arena: &'a mut GeometryArena,
    pub assets: &'a mut dyn AssetSource,
    pub controls: &'a mut dyn ControlSink,
    /// Screen width at prepare time
    pub width: u32,
    /// Screen height at prepare time
    pub height: u32,
}

/// Everything a pass may touch while recording one frame
pub struct RenderContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub arena: &'a GeometryArena,
    /// Results published so far; read-only to the pass
    pub results: &'a ResultCache,
    pub camera: &'a Camera,
    /// Seconds since the previous frame
    pub dt: f32,
    pub width: u32,
    pub height: u32,
    /// Fail instead of only logging when a framebuffer the pass binds
    /// itself reports incomplete
    pub fatal_incomplete_framebuffers: bool,
}

/// Input forwarded to every prepared pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { code: KeyCode, pressed: bool },
    /// Fixed-step update outside the render loop
    Tick { dt: f32 },
}

pub trait RenderPass {
    /// Unique name within a graph; also the result cache key
    fn name(&self) -> &str;

    fn render_config(&self) -> RenderConfig;

    /// Allocate targets, resolve assets and register controls.
    ///
    /// On error the graph calls `dispose`, which must release whatever was
    /// allocated before the failure.
    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()>;

    /// Record one frame. The graph has already bound `render_target()`
    /// (or the default framebuffer) and applied `render_config()`.
    fn render(&mut self, ctx: &mut RenderContext) -> Result<()>;

    /// Rebuild size-dependent resources for a `width` x `height` screen
    fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()>;

    fn handle_input(&mut self, _event: &InputEvent) {}

    /// Output target, `None` for the default framebuffer
    fn render_target(&self) -> Option<&RenderTarget>;

    /// Release every device object. Must be idempotent.
    fn dispose(&mut self, device: &mut dyn GraphicsDevice);
}
