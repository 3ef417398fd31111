/// Asset collaborator: resolves a logical key to a drawable + shader program.
///
/// Shader source loading is the host's business; the library receives
/// ready-made `ProgramDesc`s and compiles each program once, on first use.

use std::sync::Arc;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, ProgramDesc, ProgramHandle};
use crate::resource::buffer_arena::GeometryArena;
use crate::resource::geometry::{Geometry, Vertex};
use crate::{engine_bail, engine_debug};

/// Well-known asset keys
pub mod asset_keys {
    pub const GEO_SQUARE: &str = "GEO_SQUARE";
    pub const GEO_CUBE: &str = "GEO_CUBE";
    pub const MAT_BASIC: &str = "MAT_BASIC";
    pub const MAT_DOWNSAMPLE: &str = "MAT_DOWNSAMPLE";
    pub const MAT_UPSAMPLE: &str = "MAT_UPSAMPLE";
    pub const MAT_BLOOM_COMPOSITE: &str = "MAT_BLOOM_COMPOSITE";
    pub const MAT_HDR: &str = "MAT_HDR";
}

/// What gets drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Device-provided two-triangle quad
    FullscreenQuad,
    /// Geometry uploaded to the graph's arena
    Mesh(Arc<Geometry>),
}

impl Drawable {
    pub fn draw(&self, device: &mut dyn GraphicsDevice, arena: &GeometryArena) -> Result<()> {
        match self {
            Drawable::FullscreenQuad => device.draw_fullscreen_quad(),
            Drawable::Mesh(geometry) => geometry.draw(device, arena),
        }
    }
}

/// A resolved asset
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub drawable: Drawable,
    pub program: ProgramHandle,
}

/// Resolves asset keys during `RenderPass::prepare`
pub trait AssetSource {
    /// Resolve `key`
    ///
    /// # Errors
    ///
    /// `AssetNotFound` for unknown keys; device errors are propagated.
    fn resolve(
        &mut self,
        key: &str,
        device: &mut dyn GraphicsDevice,
        arena: &mut GeometryArena,
    ) -> Result<Asset>;

    /// Release device objects owned by the source
    fn release(&mut self, _device: &mut dyn GraphicsDevice) {}
}

/// Geometry half of an asset description
#[derive(Debug, Clone, PartialEq)]
pub enum GeometrySource {
    FullscreenQuad,
    Square,
    Cube,
    Custom {
        name: String,
        vertices: Vec<Vertex>,
        indices: Option<Vec<u16>>,
    },
}

impl GeometrySource {
    fn cache_key(&self) -> Option<&str> {
        match self {
            GeometrySource::FullscreenQuad => None,
            GeometrySource::Square => Some(asset_keys::GEO_SQUARE),
            GeometrySource::Cube => Some(asset_keys::GEO_CUBE),
            GeometrySource::Custom { name, .. } => Some(name.as_str()),
        }
    }
}

/// Geometry + program pairing registered under a key
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDesc {
    pub geometry: GeometrySource,
    pub program: ProgramDesc,
}

/// In-memory asset registry with lazy, cached compilation and upload
#[derive(Default)]
pub struct AssetLibrary {
    descs: FxHashMap<String, AssetDesc>,
    programs: FxHashMap<String, ProgramHandle>,
    geometries: FxHashMap<String, Arc<Geometry>>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the description behind `key`
    pub fn register(&mut self, key: &str, desc: AssetDesc) {
        self.descs.insert(key.to_string(), desc);
    }

    /// Builder form of `register`
    pub fn with(mut self, key: &str, desc: AssetDesc) -> Self {
        self.register(key, desc);
        self
    }

    /// Register a full-screen post-process program under `key`
    pub fn register_fullscreen(&mut self, key: &str, program: ProgramDesc) {
        self.register(key, AssetDesc { geometry: GeometrySource::FullscreenQuad, program });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.descs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    fn program(&mut self, desc: &ProgramDesc, device: &mut dyn GraphicsDevice) -> Result<ProgramHandle> {
        if let Some(&handle) = self.programs.get(&desc.name) {
            return Ok(handle);
        }
        let handle = device.create_program(desc)?;
        engine_debug!("animus::AssetLibrary", "compiled program '{}'", desc.name);
        self.programs.insert(desc.name.clone(), handle);
        Ok(handle)
    }

    fn drawable(
        &mut self,
        source: &GeometrySource,
        device: &mut dyn GraphicsDevice,
        arena: &mut GeometryArena,
    ) -> Result<Drawable> {
        let Some(cache_key) = source.cache_key() else {
            return Ok(Drawable::FullscreenQuad);
        };
        if let Some(geometry) = self.geometries.get(cache_key) {
            return Ok(Drawable::Mesh(geometry.clone()));
        }
        let geometry = match source {
            GeometrySource::Square => Geometry::square(device, arena)?,
            GeometrySource::Cube => Geometry::cube(device, arena)?,
            GeometrySource::Custom { name, vertices, indices } => {
                Geometry::upload(device, arena, name, vertices, indices.as_deref())?
            }
            GeometrySource::FullscreenQuad => return Ok(Drawable::FullscreenQuad),
        };
        let geometry = Arc::new(geometry);
        self.geometries.insert(cache_key.to_string(), geometry.clone());
        Ok(Drawable::Mesh(geometry))
    }
}

impl AssetSource for AssetLibrary {
    fn resolve(
        &mut self,
        key: &str,
        device: &mut dyn GraphicsDevice,
        arena: &mut GeometryArena,
    ) -> Result<Asset> {
        let Some(desc) = self.descs.get(key).cloned() else {
            engine_bail!("animus::AssetLibrary", Error::AssetNotFound(key.to_string()));
        };
        let program = self.program(&desc.program, device)?;
        let drawable = self.drawable(&desc.geometry, device, arena)?;
        Ok(Asset { drawable, program })
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        for (_, program) in self.programs.drain() {
            device.destroy_program(program);
        }
        // Geometry bytes belong to the arena; only the cache entries go
        self.geometries.clear();
    }
}

/// Library holding every built-in key with placeholder sources
#[cfg(test)]
pub(crate) fn fixture_library() -> AssetLibrary {
    fn desc(name: &str) -> ProgramDesc {
        ProgramDesc {
            name: name.to_string(),
            vertex_source: format!("// {} vertex", name),
            fragment_source: format!("// {} fragment", name),
        }
    }

    let mut library = AssetLibrary::new()
        .with(asset_keys::GEO_SQUARE, AssetDesc {
            geometry: GeometrySource::Square,
            program: desc("SCREEN_QUAD_SHADER"),
        })
        .with(asset_keys::GEO_CUBE, AssetDesc {
            geometry: GeometrySource::Cube,
            program: desc("BASIC_SHADER"),
        })
        .with(asset_keys::MAT_BASIC, AssetDesc {
            geometry: GeometrySource::Cube,
            program: desc("BASIC_SHADER"),
        });
    library.register_fullscreen(asset_keys::MAT_DOWNSAMPLE, desc("DOWNSAMPLE_SHADER"));
    library.register_fullscreen(asset_keys::MAT_UPSAMPLE, desc("UPSAMPLE_SHADER"));
    library.register_fullscreen(asset_keys::MAT_BLOOM_COMPOSITE, desc("BLOOM_COMPOSITE_SHADER"));
    library.register_fullscreen(asset_keys::MAT_HDR, desc("HDR_SHADER"));
    library
}

#[cfg(test)]
#[path = "asset_tests.rs"]
mod tests;
