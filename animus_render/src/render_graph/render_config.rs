/// Per-pass and per-graph configuration

use crate::graphics_device::ClearFlags;

/// Fixed-function setup the graph applies before a pass renders.
///
/// Read-only during a frame; passes may change it between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub depth_test: bool,
    pub clear_color_bit: bool,
    pub clear_depth_bit: bool,
    /// Store the target's color texture in the result cache after rendering
    pub publish_result: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            depth_test: true,
            clear_color_bit: true,
            clear_depth_bit: true,
            publish_result: false,
        }
    }
}

impl RenderConfig {
    /// Buffers to clear before the pass renders
    pub fn clear_flags(&self) -> ClearFlags {
        let mut flags = ClearFlags::empty();
        if self.clear_color_bit {
            flags |= ClearFlags::COLOR;
        }
        if self.clear_depth_bit {
            flags |= ClearFlags::DEPTH;
        }
        flags
    }

    /// Same configuration with `publish_result` set
    pub fn published(mut self) -> Self {
        self.publish_result = true;
        self
    }
}

/// Graph-wide settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphConfig {
    /// Screen width in pixels
    pub width: u32,
    /// Screen height in pixels
    pub height: u32,
    /// Color used by `ClearFlags::COLOR` clears
    pub clear_color: [f32; 4],
    /// Abort the frame when a pass target reports an incomplete framebuffer
    pub fatal_incomplete_framebuffers: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            fatal_incomplete_framebuffers: cfg!(debug_assertions),
        }
    }
}

impl GraphConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
