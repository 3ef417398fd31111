/// Render graph: an ordered list of passes sharing one device and one
/// result cache.
///
/// Passes run once per frame in insertion order. A pass configured to
/// publish stores its target's color texture under its own name, where any
/// later pass (or an earlier pass on the next frame) can read it. Entries
/// survive across frames, so a read may see the previous frame's texture.
///
/// The graph owns every pass and releases them in reverse order on
/// `shutdown` or drop.

use slotmap::{new_key_type, SlotMap};

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::graphics_device::{FramebufferStatus, GraphicsDevice, Viewport};
use crate::gui::ControlPanel;
use crate::render_graph::pass_state::PassState;
use crate::render_graph::render_config::GraphConfig;
use crate::render_graph::render_pass::{InputEvent, PrepareContext, RenderContext, RenderPass};
use crate::render_graph::result_cache::ResultCache;
use crate::resource::{AssetSource, GeometryArena};
use crate::{engine_bail, engine_debug, engine_error, engine_info, engine_trace, engine_warn};

const SOURCE: &str = "animus::RenderGraph";

new_key_type! {
    /// Stable key of a pass inside one graph
    pub struct PassKey;
}

struct PassSlot {
    pass: Box<dyn RenderPass>,
    state: PassState,
}

/// Counters returned by `RenderGraph::run_frame`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// 1 for the first frame
    pub frame_index: u64,
    pub passes_run: usize,
    pub results_published: usize,
}

pub struct RenderGraph {
    device: Box<dyn GraphicsDevice>,
    assets: Box<dyn AssetSource>,
    arena: GeometryArena,
    controls: ControlPanel,
    passes: SlotMap<PassKey, PassSlot>,
    /// Execution order
    order: Vec<PassKey>,
    results: ResultCache,
    config: GraphConfig,
    frame_index: u64,
    shut_down: bool,
}

/// Labels of controls registered by a pass start with this prefix
pub fn control_prefix(pass_name: &str) -> String {
    format!("{}/", pass_name)
}

impl RenderGraph {
    /// Create an empty graph driving `device`, resolving assets from `assets`
    pub fn new(
        device: Box<dyn GraphicsDevice>,
        assets: Box<dyn AssetSource>,
        config: GraphConfig,
    ) -> Self {
        engine_info!(SOURCE, "render graph created ({}x{})", config.width, config.height);
        Self {
            device,
            assets,
            arena: GeometryArena::new(),
            controls: ControlPanel::new(),
            passes: SlotMap::with_key(),
            order: Vec::new(),
            results: ResultCache::new(),
            config,
            frame_index: 0,
            shut_down: false,
        }
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down {
            return Err(Error::UsageError("render graph has been shut down".to_string()));
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<(usize, PassKey)> {
        self.order.iter().enumerate().find_map(|(index, &key)| {
            self.passes
                .get(key)
                .filter(|slot| slot.pass.name() == name)
                .map(|_| (index, key))
        })
    }

    /// Prepare `pass` and append it to the execution order
    ///
    /// # Errors
    ///
    /// `UsageError` if a pass with the same name is already in the graph.
    /// Any error from `prepare` aborts the push: the pass is disposed, its
    /// controls are dropped and the graph is left as it was.
    pub fn push_pass(&mut self, mut pass: Box<dyn RenderPass>) -> Result<PassKey> {
        self.ensure_running()?;
        let name = pass.name().to_string();
        if self.find(&name).is_some() {
            engine_bail!(SOURCE, Error::UsageError(
                format!("a pass named '{}' is already in the graph", name)));
        }

        let prepared = {
            let mut ctx = PrepareContext {
                device: self.device.as_mut(),
                arena: &mut self.arena,
                assets: self.assets.as_mut(),
                controls: &mut self.controls,
                width: self.config.width,
                height: self.config.height,
            };
            pass.prepare(&mut ctx)
        };

        if let Err(e) = prepared {
            pass.dispose(self.device.as_mut());
            self.controls.remove_prefixed(&control_prefix(&name));
            engine_error!(SOURCE, "pass '{}' failed to prepare: {}", name, e);
            return Err(e);
        }

        let state = PassState::Uninitialized.transition(PassState::Prepared)?;
        let key = self.passes.insert(PassSlot { pass, state });
        self.order.push(key);
        engine_info!(SOURCE, "pass '{}' pushed ({} in graph)", name, self.order.len());
        Ok(key)
    }

    /// Dispose the pass named `name`, drop its controls and its cache entry
    ///
    /// # Errors
    ///
    /// `UsageError` if no pass has that name.
    pub fn remove_pass(&mut self, name: &str) -> Result<()> {
        self.ensure_running()?;
        let Some((index, key)) = self.find(name) else {
            engine_bail!(SOURCE, Error::UsageError(format!("no pass named '{}'", name)));
        };
        self.order.remove(index);
        if let Some(mut slot) = self.passes.remove(key) {
            slot.pass.dispose(self.device.as_mut());
            slot.state = slot.state.transition(PassState::Disposed)?;
        }
        self.results.invalidate(name);
        self.controls.remove_prefixed(&control_prefix(name));
        engine_info!(SOURCE, "pass '{}' removed ({} in graph)", name, self.order.len());
        Ok(())
    }

    /// Run every pass once, in order
    ///
    /// # Errors
    ///
    /// The first error raised by a pass (or by binding its target) aborts
    /// the rest of the frame. The default framebuffer is rebound and
    /// blending is turned off before returning.
    pub fn run_frame(&mut self, camera: &Camera, dt: f32) -> Result<FrameStats> {
        self.ensure_running()?;
        self.frame_index += 1;
        let mut stats = FrameStats {
            frame_index: self.frame_index,
            ..FrameStats::default()
        };
        engine_trace!(SOURCE, "frame {} begin ({} passes)", self.frame_index, self.order.len());

        for index in 0..self.order.len() {
            let key = self.order[index];
            if let Err(e) = self.run_pass(key, camera, dt, &mut stats) {
                self.abort_frame();
                engine_error!(SOURCE, "frame {} aborted at pass #{}: {}", self.frame_index, index, e);
                return Err(e);
            }
        }

        engine_trace!(SOURCE, "frame {} end ({} published)", self.frame_index, stats.results_published);
        Ok(stats)
    }

    fn run_pass(
        &mut self,
        key: PassKey,
        camera: &Camera,
        dt: f32,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let Some(slot) = self.passes.get_mut(key) else {
            return Err(Error::UsageError("pass key no longer in graph".to_string()));
        };
        let name = slot.pass.name().to_string();
        if !slot.state.can_render() {
            return Err(Error::UsageError(
                format!("pass '{}' cannot render while {:?}", name, slot.state)));
        }

        let config = slot.pass.render_config();
        let (framebuffer, viewport) = match slot.pass.render_target() {
            Some(target) => (
                Some(target.framebuffer()?),
                Viewport::sized(target.width(), target.height()),
            ),
            None => (None, Viewport::sized(self.config.width, self.config.height)),
        };

        let device = self.device.as_mut();
        device.bind_framebuffer(framebuffer)?;
        if framebuffer.is_some() {
            if let FramebufferStatus::Incomplete(reason) = device.framebuffer_status() {
                engine_error!(SOURCE, "pass '{}' target is incomplete: {}", name, reason);
                if self.config.fatal_incomplete_framebuffers {
                    return Err(Error::FramebufferIncomplete(format!("{}: {}", name, reason)));
                }
            }
        }

        device.set_viewport(viewport);
        device.set_depth_test(config.depth_test);
        let clear = config.clear_flags();
        if !clear.is_empty() {
            device.set_clear_color(self.config.clear_color);
            device.clear(clear);
        }

        slot.state = slot.state.transition(PassState::Rendering)?;
        let rendered = {
            let mut ctx = RenderContext {
                device,
                arena: &self.arena,
                results: &self.results,
                camera,
                dt,
                width: self.config.width,
                height: self.config.height,
                fatal_incomplete_framebuffers: self.config.fatal_incomplete_framebuffers,
            };
            slot.pass.render(&mut ctx)
        };
        slot.state = slot.state.transition(PassState::Prepared)?;
        rendered?;
        stats.passes_run += 1;

        if config.publish_result {
            let texture = match slot.pass.render_target() {
                Some(target) => target.color_texture()?,
                None => {
                    return Err(Error::UsageError(
                        format!("pass '{}' publishes but has no render target", name)));
                }
            };
            self.results.publish(&name, texture);
            stats.results_published += 1;
        }

        self.device.bind_framebuffer(None)
    }

    fn abort_frame(&mut self) {
        let device = self.device.as_mut();
        device.set_blending(false);
        if let Err(e) = device.use_program(None) {
            engine_warn!(SOURCE, "could not release program after aborted frame: {}", e);
        }
        if let Err(e) = device.bind_framebuffer(None) {
            engine_warn!(SOURCE, "could not unbind target after aborted frame: {}", e);
        }
    }

    /// Rebuild every pass for a `width` x `height` screen
    ///
    /// A zero dimension (minimized window) is ignored. Each pass's cache
    /// entry is invalidated before it rebuilds, so no entry names a
    /// destroyed texture; producers republish on their next run.
    ///
    /// # Errors
    ///
    /// The first pass error aborts the resize. The screen size is restored
    /// and every pass touched so far, the failing one included, is rebuilt
    /// at the previous size before the error is returned. A pass whose
    /// rollback also fails keeps no target and fails the next frame.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.ensure_running()?;
        if width == 0 || height == 0 {
            engine_warn!(SOURCE, "ignoring resize to {}x{}", width, height);
            return Ok(());
        }

        let (old_width, old_height) = (self.config.width, self.config.height);
        engine_info!(SOURCE, "resize {}x{} -> {}x{}", old_width, old_height, width, height);

        for index in 0..self.order.len() {
            if let Err(e) = self.resize_pass(index, width, height) {
                engine_error!(SOURCE, "resize to {}x{} failed, restoring {}x{}: {}",
                    width, height, old_width, old_height, e);
                self.roll_back_resize(index, old_width, old_height);
                return Err(e);
            }
        }
        self.config.width = width;
        self.config.height = height;
        Ok(())
    }

    fn resize_pass(&mut self, index: usize, width: u32, height: u32) -> Result<()> {
        let Some(slot) = self.passes.get_mut(self.order[index]) else {
            return Ok(());
        };
        slot.state = slot.state.transition(PassState::Prepared)?;
        self.results.invalidate(slot.pass.name());
        slot.pass.resize(self.device.as_mut(), width, height)?;
        engine_debug!(SOURCE, "pass '{}' rebuilt at {}x{}", slot.pass.name(), width, height);
        Ok(())
    }

    /// Rebuild passes `0..=failed` at the previous size
    fn roll_back_resize(&mut self, failed: usize, width: u32, height: u32) {
        for index in 0..=failed {
            if let Err(e) = self.resize_pass(index, width, height) {
                engine_error!(SOURCE, "pass #{} could not be restored to {}x{}: {}",
                    index, width, height, e);
            }
        }
    }

    /// Forward `event` to every prepared pass, in order
    pub fn handle_input(&mut self, event: &InputEvent) {
        for &key in &self.order {
            if let Some(slot) = self.passes.get_mut(key) {
                if slot.state == PassState::Prepared {
                    slot.pass.handle_input(event);
                }
            }
        }
    }

    /// Dispose every pass in reverse order and release shared resources.
    ///
    /// Idempotent; also run on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let device = self.device.as_mut();
        for key in self.order.drain(..).rev() {
            if let Some(mut slot) = self.passes.remove(key) {
                slot.pass.dispose(device);
                slot.state = PassState::Disposed;
                engine_debug!(SOURCE, "pass '{}' disposed", slot.pass.name());
            }
        }
        self.results.clear();
        self.controls = ControlPanel::new();
        self.assets.release(device);
        self.arena.destroy(device);
        self.shut_down = true;
        engine_info!(SOURCE, "render graph shut down after {} frames", self.frame_index);
    }

    /// Pass names in execution order
    pub fn pass_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|&key| self.passes.get(key))
            .map(|slot| slot.pass.name())
            .collect()
    }

    pub fn pass_count(&self) -> usize {
        self.order.len()
    }

    pub fn pass(&self, name: &str) -> Option<&dyn RenderPass> {
        let (_, key) = self.find(name)?;
        self.passes.get(key).map(|slot| slot.pass.as_ref())
    }

    pub fn pass_state(&self, name: &str) -> Option<PassState> {
        let (_, key) = self.find(name)?;
        self.passes.get(key).map(|slot| slot.state)
    }

    pub fn results(&self) -> &ResultCache {
        &self.results
    }

    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ControlPanel {
        &mut self.controls
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }
}

impl Drop for RenderGraph {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "render_graph_tests.rs"]
mod tests;
