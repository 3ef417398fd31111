/// Resource module - render targets, mip chains, buffers, geometry, materials
/// and the asset collaborator

pub mod render_target;
pub mod mip_chain;
pub mod buffer_arena;
pub mod geometry;
pub mod material;
pub mod asset;

pub use render_target::RenderTarget;
pub use mip_chain::{MipChain, mip_extents};
pub use buffer_arena::{BufferArena, GeometryArena};
pub use geometry::{Geometry, Vertex, VertexAttribute, VertexLayout, DrawCall};
pub use material::{Material, MaterialValue};
pub use asset::{Asset, AssetDesc, AssetLibrary, AssetSource, Drawable, GeometrySource, asset_keys};
