/// Buffer handles, usage and regions

use slotmap::new_key_type;

new_key_type! {
    /// Device-side vertex or index buffer
    pub struct BufferHandle;
}

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer (u16 indices)
    Index,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
}

/// A byte range inside an arena-owned buffer.
///
/// Regions carry no buffer handle: the arena may move its contents into a
/// larger buffer, and offsets stay valid across that move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferRegion {
    /// Offset in bytes from the start of the buffer
    pub offset: u64,
    /// Size in bytes
    pub size: u64,
}

impl BufferRegion {
    /// One past the last byte of the region
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}
