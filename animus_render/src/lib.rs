/*!
# Animus Render

Multi-pass render pipeline with a bloom post-process.

A `RenderGraph` owns an ordered list of passes. Each frame it binds every
pass's target, applies its fixed-function configuration, lets it render and
optionally publishes its color texture under the pass name so later passes
can sample it. `BloomPass` builds a half-resolution mip chain from a
published texture, downsamples it level by level, then adds the levels back
up with additive blending.

## Architecture

- **GraphicsDevice**: immediate-mode GPU capability the pipeline drives
- **RenderGraph**: pass list, result cache, resize and teardown
- **RenderPass**: prepare / render / resize / input contract
- **Passes**: `ScenePass`, `BloomPass`, `ScreenPass`
- **Resources**: render targets, mip chains, buffer arena, geometry, materials, assets
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod resource;
pub mod render_graph;
pub mod passes;
pub mod camera;
pub mod gui;

// Main animus namespace module
pub mod animus {
    // Error types
    pub use crate::error::{Error, Result};

    // Logger facade
    pub use crate::engine::Engine;

    // Orchestrator
    pub use crate::render_graph::RenderGraph;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod device {
        pub use crate::graphics_device::*;
    }

    pub mod graph {
        pub use crate::render_graph::*;
    }

    pub mod passes {
        pub use crate::passes::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod gui {
        pub use crate::gui::*;
    }

    pub use crate::camera::Camera;
}

// Re-export math and key-code crates at crate root
pub use glam;
pub use winit;
