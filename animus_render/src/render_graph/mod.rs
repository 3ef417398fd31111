//! Render graph module
//!
//! An ordered list of passes sharing a device, an asset source, a control
//! panel and a result cache. Each frame runs the passes in insertion order;
//! passes hand textures to later passes through the result cache.

pub mod render_config;
pub mod pass_state;
pub mod render_pass;
pub mod result_cache;
pub mod render_graph;

pub use render_config::{GraphConfig, RenderConfig};
pub use pass_state::PassState;
pub use render_pass::{InputEvent, PrepareContext, RenderContext, RenderPass};
pub use result_cache::ResultCache;
pub use render_graph::{control_prefix, FrameStats, PassKey, RenderGraph};
