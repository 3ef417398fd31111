/// GPU buffer arena
///
/// Bump-allocates regions inside a single device buffer. When a request does
/// not fit, a larger buffer is created, the previous contents are copied
/// over from a CPU shadow and the previous buffer is destroyed. Regions are
/// offsets, so they remain valid across growth.

use bytemuck::Pod;

use crate::error::{Error, Result};
use crate::graphics_device::{BufferDesc, BufferHandle, BufferRegion, BufferUsage, GraphicsDevice};
use crate::{engine_debug, engine_err};

/// Regions are aligned to this many bytes
const REGION_ALIGNMENT: u64 = 4;

const MIN_CAPACITY: u64 = 256;

fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

#[derive(Debug)]
pub struct BufferArena {
    usage: BufferUsage,
    buffer: Option<BufferHandle>,
    capacity: u64,
    cursor: u64,
    shadow: Vec<u8>,
}

impl BufferArena {
    /// Create an empty arena. No device buffer exists until the first allocation.
    pub fn new(usage: BufferUsage) -> Self {
        Self {
            usage,
            buffer: None,
            capacity: 0,
            cursor: 0,
            shadow: Vec::new(),
        }
    }

    /// Copy `data` into a fresh region
    pub fn allocate(&mut self, device: &mut dyn GraphicsDevice, data: &[u8]) -> Result<BufferRegion> {
        let offset = align_up(self.cursor, REGION_ALIGNMENT);
        let size = data.len() as u64;
        let end = offset + size;

        if end > self.capacity || self.buffer.is_none() {
            self.grow(device, end)?;
        }
        let buffer = self.buffer()?;

        device.write_buffer(buffer, offset, data)?;
        self.shadow.resize(offset as usize, 0);
        self.shadow.extend_from_slice(data);
        self.cursor = end;

        Ok(BufferRegion { offset, size })
    }

    /// Copy a slice of plain-old-data values into a fresh region
    pub fn allocate_pod<T: Pod>(&mut self, device: &mut dyn GraphicsDevice, items: &[T]) -> Result<BufferRegion> {
        self.allocate(device, bytemuck::cast_slice(items))
    }

    fn grow(&mut self, device: &mut dyn GraphicsDevice, required: u64) -> Result<()> {
        let new_capacity = required.max(self.capacity * 2).max(MIN_CAPACITY);
        let new_buffer = device
            .create_buffer(&BufferDesc { size: new_capacity, usage: self.usage })
            .map_err(|e| engine_err!("animus::BufferArena", Error::DeviceResourceError(
                format!("{:?} arena growth to {} bytes: {}", self.usage, new_capacity, e))))?;

        if !self.shadow.is_empty() {
            if let Err(e) = device.write_buffer(new_buffer, 0, &self.shadow) {
                device.destroy_buffer(new_buffer);
                return Err(e);
            }
        }
        if let Some(old) = self.buffer.replace(new_buffer) {
            device.destroy_buffer(old);
        }

        engine_debug!("animus::BufferArena", "{:?} arena grown {} -> {} bytes",
            self.usage, self.capacity, new_capacity);
        self.capacity = new_capacity;
        Ok(())
    }

    /// Forget every region. The device buffer is kept for reuse.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.shadow.clear();
    }

    /// Release the device buffer. Idempotent.
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(buffer) = self.buffer.take() {
            device.destroy_buffer(buffer);
        }
        self.capacity = 0;
        self.reset();
    }

    /// Current device buffer
    pub fn buffer(&self) -> Result<BufferHandle> {
        self.buffer.ok_or_else(|| Error::UsageError(
            format!("{:?} arena has no buffer", self.usage)))
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn used(&self) -> u64 {
        self.cursor
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

/// Vertex and index arenas shared by every geometry of a graph
#[derive(Debug)]
pub struct GeometryArena {
    pub vertices: BufferArena,
    pub indices: BufferArena,
}

impl GeometryArena {
    pub fn new() -> Self {
        Self {
            vertices: BufferArena::new(BufferUsage::Vertex),
            indices: BufferArena::new(BufferUsage::Index),
        }
    }

    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        self.vertices.destroy(device);
        self.indices.destroy(device);
    }
}

impl Default for GeometryArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "buffer_arena_tests.rs"]
mod tests;
